//! Shared internal helpers for trace formatting.

use std::borrow::Cow;
use std::ffi::{CStr, c_char};

/// Render a possibly-null C string for a trace line.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn cstr_display(ptr: *const c_char) -> Cow<'static, str> {
    if ptr.is_null() {
        Cow::Borrowed("(null)")
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
    }
}

/// Fetch and clear the loader's pending diagnostic string.
///
/// Consumes the `dlerror` state, so this is only called from trace paths
/// that fire when the result is already known to be a failure.
pub(crate) fn last_dlerror() -> Cow<'static, str> {
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        Cow::Borrowed("(no dlerror)")
    } else {
        unsafe { CStr::from_ptr(msg) }.to_string_lossy()
    }
}
