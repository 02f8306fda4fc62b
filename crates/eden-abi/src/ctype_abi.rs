//! Utility exports for the hosting runtime.
//!
//! These carry the `eden_` prefix because they are shim-specific additions,
//! not interpositions: the host only sees this module's exports, so platform
//! constants and compatibility calls it needs are re-exposed here.

use std::ffi::c_void;

use crate::forward;

/// Re-trigger glibc's per-thread character-classification setup.
///
/// Intended for the host to call after spawning execution contexts that
/// need ctype tables initialized; glibc releases without the optional
/// reinitializer make this a no-op. Safe to call any number of times.
#[allow(non_snake_case)]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn eden_ctypeInit() {
    trace!("eden_ctypeInit()");
    unsafe { forward::real_ctype_init() };
}

/// The platform's `RTLD_DEFAULT` pseudo-handle.
///
/// Host code that cannot reference the platform constant directly (it only
/// sees this shim's exports) uses this to request default-scope lookups.
#[allow(non_snake_case)]
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn eden_RTLD_DEFAULT() -> *mut c_void {
    trace!("eden_RTLD_DEFAULT()");
    libc::RTLD_DEFAULT
}
