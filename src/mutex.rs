// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Named inter-process mutex backed by a kernel semaphore.
// Delegates to platform::PlatformSem (POSIX sem_open / Win32 CreateSemaphore).

use tracing::debug;

use crate::platform::PlatformSem;
use crate::{Error, Result, Role};

/// A named mutual-exclusion primitive usable from unrelated processes.
///
/// This is a counting semaphore used as a mutex: there is no ownership
/// tracking and no recursion. Calling [`release`](Self::release) without a
/// matching successful acquisition corrupts the count — prefer
/// [`lock`](Self::lock), which ties the release to a guard's drop.
///
/// Created with an initial count of 0 (locked) or 1 (unlocked) by one
/// endpoint; attached by name everywhere else. The creator unlinks the
/// kernel name on drop.
#[derive(Debug)]
pub struct NamedMutex {
    inner: PlatformSem,
    name: String,
    role: Role,
}

impl NamedMutex {
    /// Create a new named mutex. `initial` is the starting count:
    /// 0 = locked, 1 = unlocked. Fails if the name already exists.
    pub fn create(name: &str, initial: u32) -> Result<Self> {
        let inner = PlatformSem::create(name, initial).map_err(|source| {
            Error::ResourceUnavailable {
                name: name.to_string(),
                source,
            }
        })?;
        debug!(name, initial, "created named mutex");
        Ok(Self {
            inner,
            name: name.to_string(),
            role: Role::Creator,
        })
    }

    /// Attach to an existing named mutex.
    pub fn open(name: &str) -> Result<Self> {
        let inner = PlatformSem::open(name).map_err(|source| Error::ResourceUnavailable {
            name: name.to_string(),
            source,
        })?;
        debug!(name, "opened named mutex");
        Ok(Self {
            inner,
            name: name.to_string(),
            role: Role::Attached,
        })
    }

    /// Whether this handle is usable. Construction is fallible, so this is
    /// true for every handle that exists; kept as part of the endpoint
    /// contract.
    pub fn is_open(&self) -> bool {
        true
    }

    /// The name this mutex was created or opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Teardown role of this handle.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Block until the mutex is obtainable, then hold it.
    pub fn acquire(&self) -> Result<()> {
        self.inner.acquire()?;
        Ok(())
    }

    /// Attempt non-blocking acquisition. `Ok(false)` if contended.
    pub fn try_acquire(&self) -> Result<bool> {
        Ok(self.inner.try_acquire()?)
    }

    /// Return the mutex to the available state. Must pair with a successful
    /// acquisition.
    pub fn release(&self) -> Result<()> {
        self.inner.release()?;
        Ok(())
    }

    /// Acquire and return an RAII guard that releases on drop.
    pub fn lock(&self) -> Result<MutexGuard<'_>> {
        self.acquire()?;
        Ok(MutexGuard { mtx: self })
    }

    /// Remove a stale named mutex left behind by a crashed owner.
    /// No-op on platforms where the kernel reclaims the name itself.
    pub fn clear_storage(name: &str) {
        PlatformSem::unlink_by_name(name);
    }
}

/// RAII guard for a held [`NamedMutex`]; releases on drop.
pub struct MutexGuard<'a> {
    mtx: &'a NamedMutex,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        let _ = self.mtx.release();
    }
}
