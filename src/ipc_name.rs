// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Normalization of user-supplied names into POSIX kernel-object names.
// Both shm_open and sem_open require a leading '/', and macOS additionally
// caps name length at 31 bytes (PSHMNAMLEN / PSEMNAMLEN). Names are the
// cross-process addressing protocol, so the mapping must be deterministic:
// two independently built endpoints passing the same string must reach the
// same kernel object.

/// FNV-1a 64-bit hash, used to shorten over-long names deterministically.
pub fn fnv1a_64(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in data {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Maximum length for POSIX object names, including the leading '/'.
/// 0 disables truncation.
#[cfg(target_os = "macos")]
pub const IPC_NAME_MAX: usize = 31;

#[cfg(not(target_os = "macos"))]
pub const IPC_NAME_MAX: usize = 0;

/// Produce a POSIX-safe object name (with leading '/').
///
/// When `IPC_NAME_MAX > 0` and the name would exceed it, the result is
/// `/<prefix>_<16-hex-fnv1a>`: a truncated slice of the original for
/// debuggability, plus a hash of the full name for uniqueness.
pub fn make_ipc_name(name: &str) -> String {
    let full = if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    };

    if IPC_NAME_MAX == 0 || full.len() <= IPC_NAME_MAX {
        return full;
    }

    let hex = format!("{:016x}", fnv1a_64(full.as_bytes()));
    // '/' + prefix + '_' + 16 hex chars
    let prefix_len = IPC_NAME_MAX.saturating_sub(2 + hex.len());
    let body = &full[1..];
    format!("/{}_{hex}", &body[..prefix_len.min(body.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_known_values() {
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn prepends_slash() {
        assert_eq!(make_ipc_name("foo"), "/foo");
    }

    #[test]
    fn keeps_existing_slash() {
        assert_eq!(make_ipc_name("/bar"), "/bar");
    }

    #[test]
    fn same_input_same_output() {
        let long = "a-rather-long-queue-endpoint-name-that-would-not-fit-on-macos";
        assert_eq!(make_ipc_name(long), make_ipc_name(long));
    }
}
