//! Resolved real loader primitives.
//!
//! Each interposed entry point delegates here. The first call for a given
//! primitive resolves the real implementation through the raw capability and
//! caches it for the life of the process; every later call is a plain
//! indirect call. A required primitive that cannot be resolved is a fatal
//! deployment error, surfaced by the raw lookup returning null.
//!
//! The [`RealLoader`] seam exists so the contract tests can substitute a
//! recording fake for the platform loader; release builds compile the
//! delegate hook out entirely.

use std::ffi::{c_char, c_int, c_long, c_void};
use std::ptr;

use crate::raw::{self, LazyFn};
use crate::trace;
use crate::util::cstr_display;

type DlopenFn = unsafe extern "C" fn(*const c_char, c_int) -> *mut c_void;
type DlmopenFn = unsafe extern "C" fn(c_long, *const c_char, c_int) -> *mut c_void;
type DlcloseFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type DlsymFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> *mut c_void;
type CtypeInitFn = unsafe extern "C" fn();

static REAL_DLOPEN: LazyFn<DlopenFn> = LazyFn::new();
static REAL_DLMOPEN: LazyFn<DlmopenFn> = LazyFn::new();
static REAL_DLCLOSE: LazyFn<DlcloseFn> = LazyFn::new();
static REAL_DLSYM: LazyFn<DlsymFn> = LazyFn::new();
static REAL_CTYPE_INIT: LazyFn<CtypeInitFn> = LazyFn::new();

// ---------------------------------------------------------------------------
// Test seam
// ---------------------------------------------------------------------------

/// The underlying loader primitives, as a capability.
///
/// Production uses the platform loader reached through the raw lookup path;
/// tests install a recording fake.
pub trait RealLoader: Sync {
    unsafe fn dlopen(&self, filename: *const c_char, flags: c_int) -> *mut c_void;
    unsafe fn dlmopen(&self, lmid: c_long, filename: *const c_char, flags: c_int) -> *mut c_void;
    unsafe fn dlclose(&self, handle: *mut c_void) -> c_int;
    unsafe fn dlsym(&self, handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    unsafe fn ctype_init(&self);
}

#[cfg(debug_assertions)]
static TEST_LOADER: std::sync::OnceLock<&'static dyn RealLoader> = std::sync::OnceLock::new();

/// Route all forwarded calls to `loader` instead of the platform loader.
/// First installation wins for the rest of the process.
#[cfg(debug_assertions)]
pub fn set_real_loader_for_tests(loader: &'static dyn RealLoader) {
    let _ = TEST_LOADER.set(loader);
}

#[cfg(debug_assertions)]
fn test_loader() -> Option<&'static dyn RealLoader> {
    TEST_LOADER.get().copied()
}

// ---------------------------------------------------------------------------
// Real primitives
// ---------------------------------------------------------------------------

fn resolve_required<T: Copy>(slot: &LazyFn<T>, symbol: &'static std::ffi::CStr) -> T {
    match slot.get_or_resolve(|| raw::lookup_in_libdl(symbol)) {
        Some(f) => f,
        None => trace::fatal(format_args!(
            "could not resolve loader primitive: {}",
            symbol.to_string_lossy()
        )),
    }
}

pub(crate) unsafe fn real_dlopen(filename: *const c_char, flags: c_int) -> *mut c_void {
    #[cfg(debug_assertions)]
    if let Some(fake) = test_loader() {
        return unsafe { fake.dlopen(filename, flags) };
    }
    trace!("real_dlopen({}, {})", unsafe { cstr_display(filename) }, flags);
    let f = resolve_required(&REAL_DLOPEN, c"dlopen");
    let result = unsafe { f(filename, flags) };
    trace!(
        "real_dlopen({}, {}) => {:p}",
        unsafe { cstr_display(filename) },
        flags,
        result
    );
    result
}

pub(crate) unsafe fn real_dlmopen(
    lmid: c_long,
    filename: *const c_char,
    flags: c_int,
) -> *mut c_void {
    #[cfg(debug_assertions)]
    if let Some(fake) = test_loader() {
        return unsafe { fake.dlmopen(lmid, filename, flags) };
    }
    trace!(
        "real_dlmopen({}, {}, {})",
        lmid,
        unsafe { cstr_display(filename) },
        flags
    );
    let f = resolve_required(&REAL_DLMOPEN, c"dlmopen");
    let result = unsafe { f(lmid, filename, flags) };
    trace!(
        "real_dlmopen({}, {}, {}) => {:p}",
        lmid,
        unsafe { cstr_display(filename) },
        flags,
        result
    );
    result
}

pub(crate) unsafe fn real_dlclose(handle: *mut c_void) -> c_int {
    #[cfg(debug_assertions)]
    if let Some(fake) = test_loader() {
        return unsafe { fake.dlclose(handle) };
    }
    trace!("real_dlclose({handle:p})");
    let f = resolve_required(&REAL_DLCLOSE, c"dlclose");
    let result = unsafe { f(handle) };
    trace!("real_dlclose({handle:p}) => {result}");
    result
}

pub(crate) unsafe fn real_dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    #[cfg(debug_assertions)]
    if let Some(fake) = test_loader() {
        return unsafe { fake.dlsym(handle, symbol) };
    }
    trace!("real_dlsym({handle:p}, {})", unsafe { cstr_display(symbol) });
    let f = resolve_required(&REAL_DLSYM, c"dlsym");
    let result = unsafe { f(handle, symbol) };
    trace!(
        "real_dlsym({handle:p}, {}) => {result:p}",
        unsafe { cstr_display(symbol) }
    );
    result
}

/// Invoke glibc's per-thread ctype table setup, if this release has it.
///
/// Resolution goes through `__libc_dlsym` against the raw `libc.so.6`
/// handle; the interposed `dlsym` must not be used here (it corrupts
/// thread-local state on glibc 2.17). Older releases have no
/// `__ctype_init` at all, which is not an error: the call is a no-op.
pub(crate) unsafe fn real_ctype_init() {
    #[cfg(debug_assertions)]
    if let Some(fake) = test_loader() {
        return unsafe { fake.ctype_init() };
    }
    let resolved = REAL_CTYPE_INIT.get_or_resolve(|| {
        trace!("__libc_dlsym(get_libc(), __ctype_init)");
        match raw::libc_handle() {
            Some(handle) => unsafe { raw::lookup(handle, c"__ctype_init".as_ptr()) },
            None => ptr::null_mut(),
        }
    });
    if let Some(f) = resolved {
        trace!("calling __ctype_init()");
        unsafe { f() };
    }
}
