//! Redirection policy for the interposed `dlopen`.
//!
//! Decides, without touching the loader, what an intercepted `dlopen` call
//! should do: refuse up front, or forward to the namespace-scoped open with
//! possibly filtered flags. The actual forwarding (and the readability
//! probe) are supplied by the ABI crate.

use std::ffi::CStr;

/// dlopen mode flags (glibc values).
pub const RTLD_LAZY: i32 = 0x00001;
pub const RTLD_NOW: i32 = 0x00002;
pub const RTLD_GLOBAL: i32 = 0x00100;
pub const RTLD_LOCAL: i32 = 0x00000;

/// Outcome of planning an intercepted `dlopen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPlan {
    /// Report "not found" (null handle) without invoking the real open.
    NotFound,
    /// Forward to `dlmopen(namespace, filename, flags)` with these flags.
    Forward { flags: i32 },
}

/// Strip flags that a namespace-scoped open cannot honor.
///
/// `dlmopen` does not support `RTLD_GLOBAL`; the bit is silently dropped
/// rather than rejected, matching the reference downgrade behavior.
#[must_use]
pub const fn filter_flags(flags: i32) -> i32 {
    flags & !RTLD_GLOBAL
}

/// Whether `path` is absolute (leading `/`).
#[must_use]
pub fn is_absolute(path: &CStr) -> bool {
    path.to_bytes().first() == Some(&b'/')
}

/// Plan an intercepted `dlopen(filename, flags)`.
///
/// `readable` is consulted only for absolute paths: glibc's `dlopen` yields
/// a plain loading error for a nonexistent file, a distinction the
/// namespace-scoped open does not reproduce on its own, so unreadable
/// absolute paths short-circuit to [`OpenPlan::NotFound`] here. Null
/// filenames (main-program handle) and relative names always forward.
pub fn plan_open(
    filename: Option<&CStr>,
    flags: i32,
    readable: impl FnOnce(&CStr) -> bool,
) -> OpenPlan {
    let flags = filter_flags(flags);
    if let Some(path) = filename {
        if is_absolute(path) && !readable(path) {
            return OpenPlan::NotFound;
        }
    }
    OpenPlan::Forward { flags }
}
