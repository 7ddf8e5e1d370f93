// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Windows implementation: shared memory via pagefile-backed file mappings,
// named semaphore via kernel semaphore objects. Kernel objects are reference
// counted by the OS, so "unlink" is a no-op — the name disappears when the
// last handle closes.

use std::io;
use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, FALSE, HANDLE, INVALID_HANDLE_VALUE,
    WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, FILE_MAP_ALL_ACCESS,
    MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE, SEC_COMMIT,
};
use windows_sys::Win32::System::Threading::{
    CreateSemaphoreW, OpenSemaphoreW, ReleaseSemaphore, WaitForSingleObject, INFINITE,
    SEMAPHORE_ALL_ACCESS,
};

/// Encode a name as a null-terminated wide string for Win32 APIs.
fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

// ---------------------------------------------------------------------------
// PlatformShm — Windows shared memory via file mapping
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PlatformShm {
    handle: HANDLE,
    mem: *mut u8,
    size: usize,
    name: String,
}

unsafe impl Send for PlatformShm {}
unsafe impl Sync for PlatformShm {}

impl PlatformShm {
    /// Create a new named mapping of `size` bytes (fails if it already
    /// exists). Pagefile-backed mappings are zero-initialized by the kernel.
    pub fn create(name: &str, size: usize) -> io::Result<Self> {
        if name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "name is empty"));
        }
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "size is 0"));
        }

        let wide_name = to_wide(name);
        let handle = unsafe {
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                ptr::null(),
                PAGE_READWRITE | SEC_COMMIT,
                (size as u64 >> 32) as u32,
                size as u32,
                wide_name.as_ptr(),
            )
        };
        let err = unsafe { GetLastError() };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        if err == ERROR_ALREADY_EXISTS {
            unsafe { CloseHandle(handle) };
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "mapping already exists",
            ));
        }

        Self::map_and_finish(handle, size, name)
    }

    /// Open an existing named mapping. `size` must match the creation size.
    pub fn open(name: &str, size: usize) -> io::Result<Self> {
        if name.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "name is empty"));
        }
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "size is 0"));
        }

        let wide_name = to_wide(name);
        let handle = unsafe { OpenFileMappingW(FILE_MAP_ALL_ACCESS, FALSE, wide_name.as_ptr()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }

        Self::map_and_finish(handle, size, name)
    }

    fn map_and_finish(handle: HANDLE, size: usize, name: &str) -> io::Result<Self> {
        let view = unsafe { MapViewOfFile(handle, FILE_MAP_ALL_ACCESS, 0, 0, 0) };
        if view.Value.is_null() {
            let e = io::Error::last_os_error();
            unsafe { CloseHandle(handle) };
            return Err(e);
        }

        Ok(Self {
            handle,
            mem: view.Value as *mut u8,
            size,
            name: name.to_string(),
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

    pub fn name(&self) -> &str {
        &self.name
    }

    /// No-op: the kernel removes the name when the last handle closes.
    pub fn unlink_by_name(_name: &str) {}
}

impl Drop for PlatformShm {
    fn drop(&mut self) {
        if !self.mem.is_null() {
            unsafe {
                UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS {
                    Value: self.mem as *mut _,
                })
            };
        }
        if !self.handle.is_null() {
            unsafe { CloseHandle(self.handle) };
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformSem — Windows named semaphore
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PlatformSem {
    handle: HANDLE,
}

unsafe impl Send for PlatformSem {}
unsafe impl Sync for PlatformSem {}

impl PlatformSem {
    /// Create a new named semaphore with `initial` count (fails if it
    /// already exists).
    pub fn create(name: &str, initial: u32) -> io::Result<Self> {
        let wide_name = to_wide(name);
        let handle = unsafe {
            CreateSemaphoreW(ptr::null(), initial as i32, 0x7fffffff, wide_name.as_ptr())
        };
        let err = unsafe { GetLastError() };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        if err == ERROR_ALREADY_EXISTS {
            unsafe { CloseHandle(handle) };
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "semaphore already exists",
            ));
        }
        Ok(Self { handle })
    }

    /// Attach to an existing named semaphore.
    pub fn open(name: &str) -> io::Result<Self> {
        let wide_name = to_wide(name);
        let handle = unsafe { OpenSemaphoreW(SEMAPHORE_ALL_ACCESS, FALSE, wide_name.as_ptr()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }

    pub fn acquire(&self) -> io::Result<()> {
        match unsafe { WaitForSingleObject(self.handle, INFINITE) } {
            WAIT_OBJECT_0 => Ok(()),
            WAIT_FAILED => Err(io::Error::last_os_error()),
            other => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("unexpected wait result {other:#x}"),
            )),
        }
    }

    pub fn try_acquire(&self) -> io::Result<bool> {
        match unsafe { WaitForSingleObject(self.handle, 0) } {
            WAIT_OBJECT_0 => Ok(true),
            WAIT_TIMEOUT => Ok(false),
            WAIT_FAILED => Err(io::Error::last_os_error()),
            other => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("unexpected wait result {other:#x}"),
            )),
        }
    }

    pub fn release(&self) -> io::Result<()> {
        if unsafe { ReleaseSemaphore(self.handle, 1, ptr::null_mut()) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// No-op: the kernel removes the name when the last handle closes.
    pub fn unlink_by_name(_name: &str) {}
}

impl Drop for PlatformSem {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { CloseHandle(self.handle) };
        }
    }
}
