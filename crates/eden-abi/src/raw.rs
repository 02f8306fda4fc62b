//! Raw, non-interposable loader capability.
//!
//! The shim overrides `dlopen` and `dlsym`, yet it needs those very
//! primitives to locate their own real implementations. The cycle is broken
//! here: `__libc_dlopen_mode` and `__libc_dlsym` are glibc-private entry
//! points that no one interposes, so lookups through this module can never
//! re-enter the exported surface. Everything above this module is
//! implemented in terms of it, never the reverse.
//!
//! Also hosts [`LazyFn`], the once-resolved atomic cache used for every real
//! primitive. Redundant racing resolutions are benign: all writers store the
//! same value, and no caller observes an ordering between them.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

#[cfg(not(debug_assertions))]
unsafe extern "C" {
    fn __libc_dlopen_mode(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn __libc_dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
}

/// Raw library open, bypassing the interposed `dlopen`.
///
/// Debug builds never run as an interposer; inert stubs keep test binaries
/// free of GLIBC_PRIVATE link dependencies, and tests drive the forwarding
/// seam in `forward` instead.
#[cfg(not(debug_assertions))]
pub(crate) unsafe fn open_mode(filename: *const c_char, flags: c_int) -> *mut c_void {
    unsafe { __libc_dlopen_mode(filename, flags) }
}

#[cfg(debug_assertions)]
pub(crate) unsafe fn open_mode(_filename: *const c_char, _flags: c_int) -> *mut c_void {
    ptr::null_mut()
}

/// Raw symbol lookup, bypassing the interposed `dlsym`.
#[cfg(not(debug_assertions))]
pub(crate) unsafe fn lookup(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    unsafe { __libc_dlsym(handle, symbol) }
}

#[cfg(debug_assertions)]
pub(crate) unsafe fn lookup(_handle: *mut c_void, _symbol: *const c_char) -> *mut c_void {
    ptr::null_mut()
}

// ---------------------------------------------------------------------------
// Once-resolved pointer cache
// ---------------------------------------------------------------------------

/// Sentinel distinguishing "resolved to absent" from "not yet resolved".
///
/// Absence must be cached too: `__ctype_init` legitimately does not exist on
/// older glibc, and re-probing it on every call would defeat the cache.
const ABSENT: *mut c_void = ptr::without_provenance_mut(usize::MAX);

/// A lazily-resolved, permanently-cached function pointer.
///
/// Null means unresolved; [`ABSENT`] means the resolver came back empty. A
/// resolved pointer is never invalidated or re-resolved for the life of the
/// process. Multiple threads may race through the resolver; every winner
/// stores an equal value, so callers see an "already resolved" cache no
/// matter which write lands.
pub(crate) struct LazyFn<T> {
    slot: AtomicPtr<c_void>,
    _marker: PhantomData<T>,
}

// SAFETY: only an AtomicPtr plus a marker; a resolved function pointer is
// valid on every thread.
unsafe impl<T> Sync for LazyFn<T> {}

impl<T: Copy> LazyFn<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }

    /// Return the cached pointer, running `resolve` on first use.
    ///
    /// `None` means the symbol does not exist; that outcome is cached as
    /// well. `T` must be a pointer-sized function-pointer type matching the
    /// resolved symbol's signature.
    pub(crate) fn get_or_resolve(&self, resolve: impl FnOnce() -> *mut c_void) -> Option<T> {
        debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<*mut c_void>());
        let mut current = self.slot.load(Ordering::Acquire);
        if current.is_null() {
            let found = resolve();
            current = if found.is_null() { ABSENT } else { found };
            self.slot.store(current, Ordering::Release);
        }
        if current == ABSENT {
            None
        } else {
            // SAFETY: `current` came from a resolver for a symbol of
            // signature `T`, and T is pointer-sized (asserted above).
            Some(unsafe { mem::transmute_copy(&current) })
        }
    }
}

// ---------------------------------------------------------------------------
// Helper-library handles
// ---------------------------------------------------------------------------

static LIBDL: LazyFn<*mut c_void> = LazyFn::new();
static LIBC: LazyFn<*mut c_void> = LazyFn::new();

/// Raw handle to `libdl.so`, home of the real `dl*` entry points.
pub(crate) fn libdl() -> Option<*mut c_void> {
    let handle = LIBDL.get_or_resolve(|| {
        trace!("__libc_dlopen_mode(libdl.so, RTLD_LAZY)");
        unsafe { open_mode(c"libdl.so".as_ptr(), libc::RTLD_LAZY) }
    });
    trace!("get_libdl(libdl.so) => {:?}", handle);
    handle
}

/// Raw handle to `libc.so.6`, used only for the ctype reinitializer lookup.
pub(crate) fn libc_handle() -> Option<*mut c_void> {
    let handle = LIBC.get_or_resolve(|| {
        trace!("__libc_dlopen_mode(libc.so.6, RTLD_LAZY)");
        unsafe { open_mode(c"libc.so.6".as_ptr(), libc::RTLD_LAZY) }
    });
    trace!("get_libc(libc.so.6) => {:?}", handle);
    handle
}

/// Raw lookup of `symbol` inside `libdl.so`, for the real `dl*` primitives.
pub(crate) fn lookup_in_libdl(symbol: &CStr) -> *mut c_void {
    trace!("__libc_dlsym(get_libdl(), {})", symbol.to_string_lossy());
    let Some(handle) = libdl() else {
        return ptr::null_mut();
    };
    let found = unsafe { lookup(handle, symbol.as_ptr()) };
    trace!(
        "__libc_dlsym(get_libdl(), {}) => {:p}",
        symbol.to_string_lossy(),
        found
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;

    unsafe extern "C" fn probe() -> c_int {
        7
    }

    #[test]
    fn test_racing_resolution_converges() {
        static SLOT: LazyFn<unsafe extern "C" fn() -> c_int> = LazyFn::new();
        let resolutions = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        SLOT.get_or_resolve(|| {
                            resolutions.fetch_add(1, Ordering::SeqCst);
                            probe as usize as *mut c_void
                        })
                    })
                })
                .collect();
            for handle in handles {
                let f = handle.join().unwrap().expect("resolved");
                assert_eq!(f as usize, probe as usize);
                assert_eq!(unsafe { f() }, 7);
            }
        });
        // Redundant racing resolutions are allowed, zero is not.
        assert!(resolutions.load(Ordering::SeqCst) >= 1);
        // Later callers hit the cache.
        let f = SLOT
            .get_or_resolve(|| panic!("cached slot must not re-resolve"))
            .expect("still resolved");
        assert_eq!(unsafe { f() }, 7);
    }

    #[test]
    fn test_absence_is_cached() {
        static SLOT: LazyFn<unsafe extern "C" fn()> = LazyFn::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let got = SLOT.get_or_resolve(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                ptr::null_mut()
            });
            assert!(got.is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
