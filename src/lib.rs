// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Cross-process SPSC queue primitives: a named shared memory region, a named
// semaphore used as a mutex, and a bounded ring buffer queue built on both.
// Two independently started processes agree on three string names (one region,
// two locks) and hand fixed-layout records from exactly one producer to
// exactly one consumer, without copying through a socket or pipe.

pub mod ipc_name;

mod platform;

mod error;
pub use error::{Error, Result};

mod region;
pub use region::SharedRegion;

mod mutex;
pub use mutex::{MutexGuard, NamedMutex};

mod queue;
pub use queue::RingBufferQueue;

/// Teardown responsibility for a named kernel object.
///
/// Exactly one endpoint creates each named object and unlinks the name when
/// it drops; every other endpoint attaches and only releases its own mapping
/// or handle. The backing storage must outlive all attached endpoints until
/// the creator tears it down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Created the object; removes the kernel-visible name on drop.
    Creator,
    /// Attached to an existing object; never unlinks.
    Attached,
}
