// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Error taxonomy for the IPC primitives.
// Resource-acquisition failures surface here as explicit values; there is no
// silently-invalid handle state. Transient full/empty queue conditions are
// ordinary Ok values, not errors.

use std::io;

use thiserror::Error;

/// Errors produced by the shared region, named mutex and queue layers.
#[derive(Debug, Error)]
pub enum Error {
    /// A named region or semaphore could not be created or opened
    /// (permissions, exclusive create on an existing name, open of a
    /// missing name).
    #[error("ipc resource {name:?} unavailable")]
    ResourceUnavailable {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The shared region is smaller than the queue layout requires for the
    /// requested capacity. A construction-time condition, never a runtime one.
    #[error("shared region holds {actual} bytes, capacity {capacity} needs {needed}")]
    UndersizedRegion {
        capacity: usize,
        needed: usize,
        actual: usize,
    },

    /// Operation on a queue that failed its construction-time checks.
    #[error("queue is not connected")]
    NotConnected,

    /// OS error from a lock operation on an otherwise valid handle.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
