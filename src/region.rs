// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Named shared memory region shared between two endpoints.
// Delegates the mapping mechanics to platform::PlatformShm (POSIX or Windows).

use tracing::debug;

use crate::platform::PlatformShm;
use crate::{Error, Result, Role};

/// A named, fixed-size, byte-addressable memory region shared across
/// processes.
///
/// Exactly one endpoint calls [`SharedRegion::create`], which allocates and
/// zero-initializes the backing storage; any number of other endpoints call
/// [`SharedRegion::open`] with the *same* name and size. The creator unlinks
/// the kernel name on drop; attached handles only unmap.
///
/// This layer hands out raw bytes and nothing else — layout and bounds are
/// owned by whatever structure lives inside the region (see
/// [`RingBufferQueue`](crate::RingBufferQueue)).
#[derive(Debug)]
pub struct SharedRegion {
    inner: PlatformShm,
    role: Role,
}

impl SharedRegion {
    /// Create a new named region of `size` bytes, zero-initialized.
    pub fn create(name: &str, size: usize) -> Result<Self> {
        let inner = PlatformShm::create(name, size).map_err(|source| {
            Error::ResourceUnavailable {
                name: name.to_string(),
                source,
            }
        })?;
        debug!(name, size, "created shared region");
        Ok(Self {
            inner,
            role: Role::Creator,
        })
    }

    /// Attach to an existing named region. `size` must be the size it was
    /// created with; a mismatched size is out of contract.
    pub fn open(name: &str, size: usize) -> Result<Self> {
        let inner =
            PlatformShm::open(name, size).map_err(|source| Error::ResourceUnavailable {
                name: name.to_string(),
                source,
            })?;
        debug!(name, size, "opened shared region");
        Ok(Self {
            inner,
            role: Role::Attached,
        })
    }

    /// Whether the mapping is usable. Construction is fallible, so this is
    /// true for every handle that exists; kept as part of the endpoint
    /// contract so callers can gate on it uniformly.
    pub fn is_open(&self) -> bool {
        !self.inner.as_ptr().is_null() && self.inner.size() > 0
    }

    /// Size of the mapped region in bytes, fixed at construction.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// The platform name of the backing object.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Teardown role of this handle.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Base pointer of the mapped bytes, valid for the lifetime of the
    /// wrapper.
    pub fn as_ptr(&self) -> *const u8 {
        self.inner.as_ptr()
    }

    /// Mutable base pointer of the mapped bytes.
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.inner.as_mut_ptr()
    }

    /// Remove a stale named region left behind by a crashed owner.
    pub fn clear_storage(name: &str) {
        PlatformShm::unlink_by_name(name);
    }
}
