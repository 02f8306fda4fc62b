//! Environment-driven configuration.
//!
//! One switch: `EDEN_DEBUG` turns on stderr tracing. The match is exact and
//! case-sensitive (`"true"` or `"1"`); anything else, including unset, is
//! off. Read once at initialization, never re-read.

/// Environment variable enabling diagnostic tracing.
pub const DEBUG_ENV: &str = "EDEN_DEBUG";

/// Interpret the raw value of [`DEBUG_ENV`].
#[must_use]
pub fn debug_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("1"))
}
