// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Demo driver, attached side.
//
// Usage:
//   demo_consumer [count]
//
// Opens the endpoint created by demo_producer and pops `count` records
// (default 1024), verifying the tag sequence. Start the producer first.

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

    let size = RingBufferQueue::<Sample>::needed_shared_size(CAPACITY);
    let region = SharedRegion::open(MEM_NAME, size).expect("open region (is the producer running?)");
    let write_lock = NamedMutex::open(W_LOCK_NAME).expect("open write lock");
    let read_lock = NamedMutex::open(R_LOCK_NAME).expect("open read lock");

    let queue =
        RingBufferQueue::<Sample>::new(CAPACITY, &region, &write_lock, &read_lock).expect("queue");
    println!("consumer: endpoint attached, expecting {count} records");

    let mut i = 0;
    while i < count {
        let tag = queue.front().expect("front").map(|s| s.tag);
        match tag {
            Some(tag) => {
                assert_eq!(tag, 1337 + i, "record out of order");
                queue.pop().expect("pop");
                i += 1;
                if i % 256 == 0 {
                    println!("consumer: {i} records so far, last tag {tag}");
                }
            }
            None => std::thread::yield_now(),
        }
    }
    println!("consumer: done, {i} records in order");
}
