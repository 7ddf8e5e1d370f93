// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Bounded SPSC ring buffer queue living inside a shared memory region,
// synchronized by two named mutexes and nothing else — no atomics.
//
// Region layout (byte offsets from the region base):
//   [0, capacity*size_of::<T>())      — slot array
//   [slots_end, +size_of::<usize>())  — write index (next slot to fill)
//   [.., +size_of::<usize>())         — read index (next slot to drain)
//
// Both endpoints must agree on capacity and T; the layout is the wire
// format. The index fields sit directly after the slot array and are not
// naturally aligned for every T, so they are accessed unaligned.
//
// Empty is writeIndex == readIndex; full is (writeIndex+1) % capacity ==
// readIndex. The two predicates would collide at capacity elements, so only
// capacity-1 slots are ever usable. That reduction is deliberate.

use std::marker::PhantomData;
use std::mem;

use tracing::trace;

use crate::{Error, NamedMutex, Result, SharedRegion};

/// Single-producer/single-consumer bounded queue over a [`SharedRegion`],
/// guarded by two [`NamedMutex`] instances (one per index).
///
/// Both endpoints construct a queue over the same region and the same two
/// mutexes (same names, same capacity, same `T`). The creator calls
/// [`init`](Self::init) exactly once before any endpoint pushes or pops;
/// signalling that readiness to the opener is the caller's job. Thereafter
/// exactly one process may push and exactly one may pop — concurrent pushers
/// or concurrent poppers corrupt the index arithmetic and are out of
/// contract.
///
/// `T: Copy` is a hard precondition in a second sense as well: a value pushed
/// here is read in another address space, so it must not contain pointers,
/// references, or handles meaningful only to the producer. The queue cannot
/// detect such payloads. Use `#[repr(C)]` records of plain data.
///
/// # Concurrency discipline
///
/// Every operation first takes a *snapshot*: acquire the write lock, then the
/// read lock, read both indices, release both. The full/empty decision is
/// made on the snapshot; only then is the single lock guarding the index to
/// be mutated reacquired. The cross-side index may move between snapshot and
/// mutation — a `try_push` can fail although a pop completed microseconds
/// earlier. Such false negatives are transient and self-correct on retry;
/// the discipline guarantees they never become lost updates or wraparound
/// past the peer.
#[derive(Debug)]
pub struct RingBufferQueue<'a, T: Copy> {
    region: &'a SharedRegion,
    write_lock: &'a NamedMutex,
    read_lock: &'a NamedMutex,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Copy> RingBufferQueue<'a, T> {
    /// Minimum region size for `capacity` slots of `T`:
    /// the slot array plus the two trailing indices.
    pub const fn needed_shared_size(capacity: usize) -> usize {
        capacity * mem::size_of::<T>() + 2 * mem::size_of::<usize>()
    }

    /// Construct a queue view over `region`, guarded by `write_lock` and
    /// `read_lock`. `capacity` is clamped to at least 1.
    ///
    /// Fails with [`Error::UndersizedRegion`] if the region cannot hold the
    /// layout — a construction-time condition, never a runtime one.
    pub fn new(
        capacity: usize,
        region: &'a SharedRegion,
        write_lock: &'a NamedMutex,
        read_lock: &'a NamedMutex,
    ) -> Result<Self> {
        let capacity = capacity.max(1);
        let needed = Self::needed_shared_size(capacity);
        if region.size() < needed {
            return Err(Error::UndersizedRegion {
                capacity,
                needed,
                actual: region.size(),
            });
        }

        Ok(Self {
            region,
            write_lock,
            read_lock,
            capacity,
            _marker: PhantomData,
        })
    }

    /// One-time layout initialization: zero both indices, each under its own
    /// lock. Call exactly once, on the creator endpoint, before any push or
    /// pop anywhere. Must not run concurrently with any other operation.
    pub fn init(&self) -> Result<()> {
        self.ensure_connected()?;
        {
            let _g = self.write_lock.lock()?;
            unsafe { self.write_index_ptr().write_unaligned(0) };
        }
        {
            let _g = self.read_lock.lock()?;
            unsafe { self.read_index_ptr().write_unaligned(0) };
        }
        trace!(capacity = self.capacity, "queue initialized");
        Ok(())
    }

    /// True iff the region and both locks are usable.
    pub fn is_connected(&self) -> bool {
        self.capacity > 0
            && self.region.is_open()
            && self.write_lock.is_open()
            && self.read_lock.is_open()
    }

    /// Number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True maximum number of live elements: one slot stays unused to keep
    /// the full and empty predicates distinguishable.
    pub fn usable_capacity(&self) -> usize {
        self.capacity - 1
    }

    /// Peek at the oldest element without consuming it.
    ///
    /// Returns `Ok(None)` when the queue is empty. The returned reference is
    /// valid only until the next [`pop`](Self::pop) — on this endpoint *or
    /// the peer process*, which this borrow cannot see. Read it and pop
    /// immediately; holding it is a stale-data hazard by design.
    pub fn front(&self) -> Result<Option<&T>> {
        self.ensure_connected()?;
        let (write_index, read_index) = self.snapshot()?;
        if write_index == read_index {
            return Ok(None);
        }
        Ok(Some(unsafe { &*self.slot_ptr(read_index) }))
    }

    /// Consume the oldest element. No-op when empty.
    ///
    /// Must only ever be called from the single consumer endpoint.
    pub fn pop(&self) -> Result<()> {
        self.ensure_connected()?;
        let (write_index, mut read_index) = self.snapshot()?;
        if write_index == read_index {
            return Ok(());
        }

        // Only the read index moves, so only its lock is reacquired.
        let _g = self.read_lock.lock()?;
        // T is Copy — retiring the slot is just moving the index past it.
        read_index += 1;
        if read_index == self.capacity {
            read_index = 0;
        }
        unsafe { self.read_index_ptr().write_unaligned(read_index) };
        Ok(())
    }

    /// Append a copy of `value`. Returns `Ok(false)` when the queue is full
    /// — an expected, recoverable condition; retry after the consumer pops.
    ///
    /// Must only ever be called from the single producer endpoint.
    pub fn try_push(&self, value: T) -> Result<bool> {
        self.ensure_connected()?;
        let (mut write_index, read_index) = self.snapshot()?;
        if (write_index + 1) % self.capacity == read_index {
            return Ok(false);
        }

        // Only the write index moves, so only its lock is reacquired. The
        // slot at the snapshot write index is outside [read, write) and
        // therefore invisible to the consumer until the index advances.
        let _g = self.write_lock.lock()?;
        unsafe { self.slot_ptr(write_index).write(value) };
        write_index += 1;
        if write_index == self.capacity {
            write_index = 0;
        }
        unsafe { self.write_index_ptr().write_unaligned(write_index) };
        Ok(true)
    }

    /// Logical number of elements, from one index snapshot. A concurrent
    /// push or pop can change it before the caller looks at it; treat it as
    /// a trend, not an exact figure.
    pub fn len(&self) -> Result<usize> {
        self.ensure_connected()?;
        let (write_index, read_index) = self.snapshot()?;
        Ok((write_index + self.capacity - read_index) % self.capacity)
    }

    /// Whether the queue held no elements at the snapshot.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // -- internals ----------------------------------------------------------

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Read both indices under both locks, then release both. Lock order is
    /// write then read on every path, so two endpoints snapshotting at once
    /// cannot deadlock.
    fn snapshot(&self) -> Result<(usize, usize)> {
        let _w = self.write_lock.lock()?;
        let _r = self.read_lock.lock()?;
        let write_index = unsafe { self.write_index_ptr().read_unaligned() };
        let read_index = unsafe { self.read_index_ptr().read_unaligned() };
        Ok((write_index, read_index))
    }

    fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity);
        unsafe { (self.region.as_mut_ptr() as *mut T).add(index) }
    }

    fn write_index_ptr(&self) -> *mut usize {
        unsafe {
            self.region
                .as_mut_ptr()
                .add(self.capacity * mem::size_of::<T>()) as *mut usize
        }
    }

    fn read_index_ptr(&self) -> *mut usize {
        unsafe {
            self.region
                .as_mut_ptr()
                .add(self.capacity * mem::size_of::<T>() + mem::size_of::<usize>())
                as *mut usize
        }
    }
}

impl<T: Copy> Drop for RingBufferQueue<'_, T> {
    /// Drain whatever is still queued, assuming no concurrent writer at
    /// teardown time.
    fn drop(&mut self) {
        let remaining = match self.len() {
            Ok(n) => n,
            Err(_) => return,
        };
        for _ in 0..remaining {
            if self.pop().is_err() {
                break;
            }
        }
    }
}
