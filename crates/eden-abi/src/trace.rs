//! Diagnostic tracing and fatal-error reporting.
//!
//! Tracing goes to stderr with a `[eden #<namespace>]` prefix and is gated
//! on the `EDEN_DEBUG` switch read once at initialization. No logging
//! framework is pulled into the interposed cdylib: trace emission must not
//! allocate global logger state or re-enter the loader.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Set once during initialization from `EDEN_DEBUG`.
pub(crate) fn set_enabled(on: bool) {
    ENABLED.store(on, Ordering::Release);
}

pub(crate) fn enabled() -> bool {
    ENABLED.load(Ordering::Acquire)
}

/// Emit one trace line when tracing is enabled. Arguments are not evaluated
/// when tracing is off.
macro_rules! trace {
    ($($arg:tt)*) => {
        if $crate::trace::enabled() {
            eprintln!(
                "[eden #{}] {}",
                $crate::registry::namespace_raw(),
                format_args!($($arg)*)
            );
        }
    };
}

/// Report a fatal misconfiguration and terminate the process.
///
/// Only load-time configuration errors and missing required loader
/// primitives come through here; forwarded loader failures never do.
pub(crate) fn fatal(message: impl Display) -> ! {
    eprintln!(
        "[eden #{}] FATAL ERROR {message}",
        crate::registry::namespace_raw()
    );
    std::process::exit(-1);
}
