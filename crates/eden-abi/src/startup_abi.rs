//! Module initialization.
//!
//! Runs once when the host loads `libeden.so`, before any exported function
//! is called (the loader's init-array contract, not internal locking,
//! guarantees the ordering). Establishes the debug switch, verifies the
//! glibc release, probes the namespace the shim itself was loaded into, and
//! publishes it to the registry.
//!
//! [`initialize`] reports misconfiguration as a [`ConfigError`] instead of
//! terminating; only the constructor binding below turns that into process
//! exit, which keeps the sequence testable.

use std::borrow::Cow;
use std::ffi::{CStr, c_char, c_long, c_void};
use std::ptr;

use eden_core::config;
use eden_core::{ConfigError, NamespaceId, OpenStrategy, PlatformVersion};

use crate::util::last_dlerror;
use crate::{forward, raw, registry, trace};

/// The shim's own library name, reopened as an introspection anchor.
const ANCHOR_LIBRARY: &CStr = c"libeden.so";

unsafe extern "C" {
    fn gnu_get_libc_version() -> *const c_char;
}

/// The host C library's release string.
pub fn libc_version() -> Cow<'static, str> {
    unsafe { CStr::from_ptr(gnu_get_libc_version()) }.to_string_lossy()
}

/// Reopen the anchor library using the strategy the glibc release requires.
///
/// Pre-2.17 releases mishandle the raw open path for already-loaded
/// namespace members, so they go through the forwarded real `dlopen`.
fn open_anchor(strategy: OpenStrategy) -> *mut c_void {
    match strategy {
        OpenStrategy::ForwardedDlopen => {
            trace!("real_dlopen(libeden.so, RTLD_LAZY)");
            unsafe { forward::real_dlopen(ANCHOR_LIBRARY.as_ptr(), libc::RTLD_LAZY) }
        }
        OpenStrategy::RawOpenMode => {
            trace!("__libc_dlopen_mode(libeden.so, RTLD_NOW)");
            unsafe { raw::open_mode(ANCHOR_LIBRARY.as_ptr(), libc::RTLD_NOW) }
        }
    }
}

/// Ask the loader which namespace `anchor` (and therefore this shim) lives
/// in.
fn probe_namespace(anchor: *mut c_void) -> Result<i64, ConfigError> {
    let mut lmid: c_long = 0;
    let rc = unsafe { libc::dlinfo(anchor, libc::RTLD_DI_LMID, (&raw mut lmid).cast()) };
    if rc != 0 {
        return Err(ConfigError::NamespaceProbe {
            detail: last_dlerror().into_owned(),
        });
    }
    Ok(lmid as i64)
}

fn current_locale() -> Cow<'static, str> {
    let locale = unsafe { libc::setlocale(libc::LC_ALL, ptr::null()) };
    unsafe { crate::util::cstr_display(locale) }
}

/// The load-time initialization sequence.
pub fn initialize() -> Result<(), ConfigError> {
    let debug = std::env::var(config::DEBUG_ENV).ok();
    trace::set_enabled(config::debug_enabled(debug.as_deref()));

    let raw_version = libc_version();
    trace!("initialize() GNU libc version {raw_version}");
    let version = PlatformVersion::parse(&raw_version);
    trace!("glibc version parsed as {}.{}", version.major, version.minor);
    let strategy = version.anchor_strategy()?;

    let anchor = open_anchor(strategy);
    let lmid = probe_namespace(anchor)?;
    let namespace = NamespaceId::from_probe(lmid)?;
    registry::publish(namespace);

    trace!("Current locale: {}", current_locale());
    Ok(())
}

#[cfg(not(debug_assertions))]
unsafe extern "C" fn module_init() {
    if let Err(err) = initialize() {
        trace::fatal(err);
    }
}

#[cfg(not(debug_assertions))]
#[unsafe(link_section = ".init_array")]
#[used]
static EDEN_MODULE_INIT: unsafe extern "C" fn() = module_init;
