//! Interposed `<dlfcn.h>` entry points.
//!
//! Drop-in replacements for the public loader API, exported with the exact
//! glibc signatures so existing callers bind to them unmodified. `dlopen`
//! applies the namespace-redirection policy from `eden-core`; the other
//! three are pure forwards with trace side effects only.
//!
//! Symbols are only exported in release builds: a debug test binary calling
//! `dlopen` must reach its own libc, not this crate.

use std::ffi::{CStr, c_char, c_int, c_long, c_void};
use std::ptr;

use eden_core::policy::{self, OpenPlan};

use crate::forward;
use crate::registry;
use crate::util::{cstr_display, last_dlerror};

/// Open a shared object inside the shim's namespace.
///
/// `RTLD_GLOBAL` is silently dropped (namespace-scoped opens cannot honor
/// it), unreadable absolute paths report "not found" without forwarding,
/// and everything else becomes `dlmopen(namespace, filename, flags)`.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void {
    trace!("dlopen({}, {})", unsafe { cstr_display(filename) }, flags);

    let name = if filename.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(filename) })
    };
    let plan = policy::plan_open(name, flags, |path| {
        (unsafe { libc::access(path.as_ptr(), libc::R_OK) }) == 0
    });

    match plan {
        OpenPlan::NotFound => {
            trace!(
                "dlopen({}, {}): file not accessible",
                unsafe { cstr_display(filename) },
                flags
            );
            ptr::null_mut()
        }
        OpenPlan::Forward { flags: filtered } => {
            if filtered != flags {
                trace!("dlopen ignoring RTLD_GLOBAL for {}", unsafe {
                    cstr_display(filename)
                });
            }
            trace!("dlopen => dlmopen: {}", unsafe { cstr_display(filename) });
            let lmid = registry::namespace_raw() as c_long;
            let result = unsafe { forward::real_dlmopen(lmid, filename, filtered) };
            if result.is_null() {
                trace!(
                    "dlopen({}, {}) => error: {}",
                    unsafe { cstr_display(filename) },
                    filtered,
                    last_dlerror()
                );
            } else {
                trace!(
                    "dlopen({}, {}) => {:p}",
                    unsafe { cstr_display(filename) },
                    filtered,
                    result
                );
            }
            result
        }
    }
}

/// Open a shared object in an explicitly chosen namespace. Pure forward.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn dlmopen(lmid: c_long, filename: *const c_char, flags: c_int) -> *mut c_void {
    trace!(
        "dlmopen({}, {}, {})",
        lmid,
        unsafe { cstr_display(filename) },
        flags
    );
    let result = unsafe { forward::real_dlmopen(lmid, filename, flags) };
    trace!(
        "dlmopen({}, {}, {}) => {:p}",
        lmid,
        unsafe { cstr_display(filename) },
        flags,
        result
    );
    result
}

/// Close a handle. Pure forward.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn dlclose(handle: *mut c_void) -> c_int {
    trace!("dlclose({handle:p})");
    let result = unsafe { forward::real_dlclose(handle) };
    trace!("dlclose({handle:p}) => {result}");
    result
}

/// Look up a symbol. Pure forward.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    trace!("dlsym({handle:p}, {})", unsafe { cstr_display(symbol) });
    let result = unsafe { forward::real_dlsym(handle, symbol) };
    trace!(
        "dlsym({handle:p}, {}) => {result:p}",
        unsafe { cstr_display(symbol) }
    );
    result
}
