// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// POSIX implementation of the named shared memory region (shm_open + mmap)
// and the named semaphore (sem_open family).

use std::ffi::CString;
use std::io;

use crate::ipc_name;

fn c_name(posix_name: &str) -> io::Result<CString> {
    CString::new(posix_name.as_bytes()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

// ---------------------------------------------------------------------------
// PlatformShm — POSIX shared memory
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PlatformShm {
    mem: *mut u8,
    size: usize,
    name: String, // POSIX name (with leading '/')
    owner: bool,
}

// Safety: the mapping is process-shared by design; all mutation of its
// contents is serialized by the callers' locking discipline.
unsafe impl Send for PlatformShm {}
unsafe impl Sync for PlatformShm {}

impl PlatformShm {
    /// Create a new named region of `size` bytes.
    ///
    /// Removes any stale object of the same name first, then creates
    /// exclusively and sizes the backing storage with `ftruncate`, which
    /// zero-fills it.
    pub fn create(name: &str, size: usize) -> io::Result<Self> {
        if name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "name is empty"));
        }
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "size is 0"));
        }

        let posix_name = ipc_name::make_ipc_name(name);
        let c_name = c_name(&posix_name)?;

        // A previous owner may have crashed before unlinking.
        let ret = unsafe { libc::shm_unlink(c_name.as_ptr()) };
        if ret < 0 {
            let e = io::Error::last_os_error();
            if e.raw_os_error() != Some(libc::ENOENT) {
                return Err(e);
            }
        }

        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_RDWR | libc::O_CREAT | libc::O_EXCL,
                0o755 as libc::c_uint,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        // Size the backing storage before mapping; new pages read as zero.
        if unsafe { libc::ftruncate(fd, size as libc::off_t) } < 0 {
            let e = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(e);
        }

        Self::mmap_and_finish(fd, size, posix_name, true)
    }

    /// Map an existing named region. `size` must match the creation size;
    /// POSIX cannot be relied on to report it back.
    pub fn open(name: &str, size: usize) -> io::Result<Self> {
        if name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "name is empty"));
        }
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "size is 0"));
        }

        let posix_name = ipc_name::make_ipc_name(name);
        let c_name = c_name(&posix_name)?;

        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o755 as libc::c_uint) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        Self::mmap_and_finish(fd, size, posix_name, false)
    }

    fn mmap_and_finish(fd: i32, size: usize, posix_name: String, owner: bool) -> io::Result<Self> {
        let mem = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        unsafe { libc::close(fd) };

        if mem == libc::MAP_FAILED {
            let e = io::Error::last_os_error();
            if owner {
                Self::unlink_by_posix_name(&posix_name);
            }
            return Err(e);
        }

        Ok(Self {
            mem: mem as *mut u8,
            size,
            name: posix_name,
            owner,
        })
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.mem
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.mem
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// POSIX name (with leading '/').
    pub fn name(&self) -> &str {
        &self.name
    }

    fn unlink_by_posix_name(posix_name: &str) {
        if let Ok(c_name) = CString::new(posix_name.as_bytes()) {
            unsafe { libc::shm_unlink(c_name.as_ptr()) };
        }
    }

    /// Remove a named region by name without an open handle.
    pub fn unlink_by_name(name: &str) {
        Self::unlink_by_posix_name(&ipc_name::make_ipc_name(name));
    }
}

impl Drop for PlatformShm {
    fn drop(&mut self) {
        if self.mem.is_null() {
            return;
        }
        unsafe { libc::munmap(self.mem as *mut libc::c_void, self.size) };
        if self.owner {
            Self::unlink_by_posix_name(&self.name);
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformSem — POSIX named semaphore
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PlatformSem {
    sem: *mut libc::sem_t,
    name: String, // POSIX name (with leading '/')
    owner: bool,
}

// Safety: sem_t operations are inherently process-shared and thread-safe.
unsafe impl Send for PlatformSem {}
unsafe impl Sync for PlatformSem {}

impl PlatformSem {
    /// Create a new named semaphore with `initial` count (exclusive; fails
    /// if the name already exists).
    pub fn create(name: &str, initial: u32) -> io::Result<Self> {
        let posix_name = ipc_name::make_ipc_name(name);
        let c_name = c_name(&posix_name)?;

        let sem = unsafe {
            libc::sem_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL,
                0o700 as libc::c_uint,
                initial as libc::c_uint,
            )
        };
        if sem == libc::SEM_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            sem,
            name: posix_name,
            owner: true,
        })
    }

    /// Attach to an existing named semaphore.
    pub fn open(name: &str) -> io::Result<Self> {
        let posix_name = ipc_name::make_ipc_name(name);
        let c_name = c_name(&posix_name)?;

        let sem = unsafe { libc::sem_open(c_name.as_ptr(), 0) };
        if sem == libc::SEM_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            sem,
            name: posix_name,
            owner: false,
        })
    }

    /// Decrement the count, blocking until it is positive.
    pub fn acquire(&self) -> io::Result<()> {
        loop {
            let ret = unsafe { libc::sem_wait(self.sem) };
            if ret == 0 {
                return Ok(());
            }
            let e = io::Error::last_os_error();
            if e.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(e);
        }
    }

    /// Decrement the count without blocking. `Ok(false)` if it was zero.
    pub fn try_acquire(&self) -> io::Result<bool> {
        loop {
            let ret = unsafe { libc::sem_trywait(self.sem) };
            if ret == 0 {
                return Ok(true);
            }
            let e = io::Error::last_os_error();
            match e.raw_os_error() {
                Some(libc::EAGAIN) => return Ok(false),
                Some(libc::EINTR) => continue,
                _ => return Err(e),
            }
        }
    }

    /// Increment the count, waking one blocked waiter.
    pub fn release(&self) -> io::Result<()> {
        if unsafe { libc::sem_post(self.sem) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Remove a named semaphore by name without an open handle.
    pub fn unlink_by_name(name: &str) {
        let posix_name = ipc_name::make_ipc_name(name);
        if let Ok(c_name) = CString::new(posix_name.as_bytes()) {
            unsafe { libc::sem_unlink(c_name.as_ptr()) };
        }
    }
}

impl Drop for PlatformSem {
    fn drop(&mut self) {
        unsafe { libc::sem_close(self.sem) };
        if self.owner {
            if let Ok(c_name) = CString::new(self.name.as_bytes()) {
                unsafe { libc::sem_unlink(c_name.as_ptr()) };
            }
        }
    }
}
