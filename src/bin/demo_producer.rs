// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Demo driver, creator side.
//
// Usage:
//   demo_producer [count]
//
// Creates the shared endpoint (region + two locks), initializes the queue
// and pushes `count` tagged records (default 1024) with a spin-retry on
// full. Run demo_consumer in another terminal to drain them.

use shmq::{NamedMutex, RingBufferQueue, SharedRegion};

#[derive(Clone, Copy)]
#[repr(C)]
struct Sample {
    tag: usize,
    data: [u8; 64],
}

const CAPACITY: usize = 128;
const MEM_NAME: &str = "shmq_demo_mem";
const W_LOCK_NAME: &str = "shmq_demo_w_idx";
const R_LOCK_NAME: &str = "shmq_demo_r_idx";

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .map(|a| a.parse().expect("count must be a number"))
        .unwrap_or(1024);

    // Clear anything a crashed previous run left behind.
    SharedRegion::clear_storage(MEM_NAME);
    NamedMutex::clear_storage(W_LOCK_NAME);
    NamedMutex::clear_storage(R_LOCK_NAME);

    let size = RingBufferQueue::<Sample>::needed_shared_size(CAPACITY);
    let region = SharedRegion::create(MEM_NAME, size).expect("create region");
    let write_lock = NamedMutex::create(W_LOCK_NAME, 1).expect("create write lock");
    let read_lock = NamedMutex::create(R_LOCK_NAME, 1).expect("create read lock");

    let queue =
        RingBufferQueue::<Sample>::new(CAPACITY, &region, &write_lock, &read_lock).expect("queue");
    queue.init().expect("init");
    println!("producer: endpoint ready, pushing {count} records");

    let mut i = 0;
    while i < count {
        let sample = Sample {
            tag: 1337 + i,
            data: [0; 64],
        };
        if queue.try_push(sample).expect("push") {
            i += 1;
        } else {
            std::thread::yield_now();
        }
    }
    println!("producer: all records pushed, waiting for consumer to drain");

    // Exiting drops the creator handles, which unlinks the names — and the
    // queue destructor drains whatever is left. Wait for the consumer first.
    while queue.len().expect("len") > 0 {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    println!("producer: done");
}
