// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Integration tests for the shared region and named mutex wrappers.
// Each test uses its own resource names and clears stale state up front so a
// crashed previous run cannot poison it.

use shmq::{Error, NamedMutex, Role, SharedRegion};

#[test]
fn region_create_write_read() {
    let name = "shmq_test_region_rw";
    SharedRegion::clear_storage(name);

    let region = SharedRegion::create(name, 4096).expect("create region");
    assert!(region.is_open());
    assert_eq!(region.size(), 4096);
    assert_eq!(region.role(), Role::Creator);

    let payload = b"hello from the creator";
    unsafe {
        std::ptr::copy_nonoverlapping(payload.as_ptr(), region.as_mut_ptr(), payload.len());
    }

    let read_back = unsafe { std::slice::from_raw_parts(region.as_ptr(), payload.len()) };
    assert_eq!(read_back, payload);
}

#[test]
fn region_open_sees_creator_bytes() {
    let name = "shmq_test_region_open";
    SharedRegion::clear_storage(name);

    let creator = SharedRegion::create(name, 1024).expect("create region");
    unsafe { creator.as_mut_ptr().write(0xA5) };

    let attached = SharedRegion::open(name, 1024).expect("open region");
    assert_eq!(attached.role(), Role::Attached);
    assert_eq!(unsafe { attached.as_ptr().read() }, 0xA5);

    // Attached drop must not unlink: a second open still works.
    drop(attached);
    let again = SharedRegion::open(name, 1024).expect("open region again");
    assert_eq!(unsafe { again.as_ptr().read() }, 0xA5);
}

#[test]
fn region_create_zero_initializes() {
    let name = "shmq_test_region_zero";
    SharedRegion::clear_storage(name);

    let region = SharedRegion::create(name, 256).expect("create region");
    let bytes = unsafe { std::slice::from_raw_parts(region.as_ptr(), 256) };
    assert!(bytes.iter().all(|&b| b == 0));
}

#[test]
fn region_open_missing_fails() {
    let name = "shmq_test_region_missing";
    SharedRegion::clear_storage(name);

    let err = SharedRegion::open(name, 512).unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable { .. }));
}

#[cfg(unix)]
#[test]
fn region_unlinked_after_creator_drop() {
    let name = "shmq_test_region_unlink";
    SharedRegion::clear_storage(name);

    let creator = SharedRegion::create(name, 512).expect("create region");
    drop(creator);

    // The owner released the name; late openers fail predictably.
    let err = SharedRegion::open(name, 512).unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable { .. }));
}

#[test]
fn mutex_acquire_release() {
    let name = "shmq_test_mtx_basic";
    NamedMutex::clear_storage(name);

    let mtx = NamedMutex::create(name, 1).expect("create mutex");
    assert!(mtx.is_open());
    assert_eq!(mtx.role(), Role::Creator);

    mtx.acquire().expect("acquire");
    assert!(!mtx.try_acquire().expect("try while held"));
    mtx.release().expect("release");
    assert!(mtx.try_acquire().expect("try after release"));
    mtx.release().expect("release again");
}

#[test]
fn mutex_created_locked() {
    let name = "shmq_test_mtx_locked";
    NamedMutex::clear_storage(name);

    let mtx = NamedMutex::create(name, 0).expect("create mutex");
    assert!(!mtx.try_acquire().expect("try on locked"));
    mtx.release().expect("release");
    assert!(mtx.try_acquire().expect("try after release"));
    mtx.release().expect("release");
}

#[test]
fn mutex_guard_releases_on_drop() {
    let name = "shmq_test_mtx_guard";
    NamedMutex::clear_storage(name);

    let mtx = NamedMutex::create(name, 1).expect("create mutex");
    {
        let _guard = mtx.lock().expect("lock");
        assert!(!mtx.try_acquire().expect("try while guarded"));
    }
    assert!(mtx.try_acquire().expect("try after guard drop"));
    mtx.release().expect("release");
}

#[cfg(unix)]
#[test]
fn mutex_create_is_exclusive() {
    let name = "shmq_test_mtx_excl";
    NamedMutex::clear_storage(name);

    let _first = NamedMutex::create(name, 1).expect("create mutex");
    let err = NamedMutex::create(name, 1).unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable { .. }));
}

#[cfg(unix)]
#[test]
fn mutex_open_attaches_to_same_object() {
    let name = "shmq_test_mtx_attach";
    NamedMutex::clear_storage(name);

    let creator = NamedMutex::create(name, 1).expect("create mutex");
    let attached = NamedMutex::open(name).expect("open mutex");
    assert_eq!(attached.role(), Role::Attached);

    creator.acquire().expect("acquire via creator");
    assert!(!attached.try_acquire().expect("contended via attached"));
    creator.release().expect("release via creator");
    assert!(attached.try_acquire().expect("free via attached"));
    attached.release().expect("release via attached");
}
