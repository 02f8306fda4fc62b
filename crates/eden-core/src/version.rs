//! glibc version probing and version-conditional strategy selection.
//!
//! The shim supports exactly one glibc major version (2). Within it, one
//! behavior differs by minor version: how the anchor library (`libeden.so`
//! itself) is reopened for the namespace probe. Older releases (< 2.17)
//! must go through the forwarded public `dlopen`; newer ones use the raw
//! `__libc_dlopen_mode` path with eager binding.

use crate::error::ConfigError;

/// Supported glibc major version.
pub const SUPPORTED_MAJOR: u32 = 2;

/// First minor version where the raw open path is safe for the anchor.
pub const RAW_ANCHOR_MINOR: u32 = 17;

/// Parsed `(major, minor)` of the host C library release string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
}

/// How to open the anchor library used for namespace introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStrategy {
    /// Reopen through the forwarded real `dlopen` with lazy binding.
    ForwardedDlopen,
    /// Reopen through the raw `__libc_dlopen_mode` with `RTLD_NOW`.
    RawOpenMode,
}

impl PlatformVersion {
    /// Parse two leading dot-separated integers from a glibc version string
    /// such as `"2.31"` or `"2.17-2.el7"`.
    ///
    /// Unrecognized input degrades to `(0, 0)`, which then fails the
    /// major-version check in [`PlatformVersion::anchor_strategy`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('.');
        let major = parse_leading_uint(parts.next().unwrap_or(""));
        let minor = parse_leading_uint(parts.next().unwrap_or(""));
        Self { major, minor }
    }

    /// Select the anchor-open strategy for this release, or report the
    /// release as unsupported.
    pub fn anchor_strategy(self) -> Result<OpenStrategy, ConfigError> {
        if self.major != SUPPORTED_MAJOR {
            return Err(ConfigError::UnsupportedLibc {
                major: self.major,
                minor: self.minor,
            });
        }
        if self.minor < RAW_ANCHOR_MINOR {
            Ok(OpenStrategy::ForwardedDlopen)
        } else {
            Ok(OpenStrategy::RawOpenMode)
        }
    }
}

/// Parse the leading decimal digits of `s`, ignoring any trailing suffix
/// (release strings may carry vendor decorations like `"17-2.el7"`).
fn parse_leading_uint(s: &str) -> u32 {
    let digits: &str = s
        .split_once(|c: char| !c.is_ascii_digit())
        .map_or(s, |(head, _)| head);
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(
            PlatformVersion::parse("2.31"),
            PlatformVersion {
                major: 2,
                minor: 31
            }
        );
    }

    #[test]
    fn test_parse_vendor_suffix() {
        assert_eq!(
            PlatformVersion::parse("2.17-2.el7"),
            PlatformVersion {
                major: 2,
                minor: 17
            }
        );
    }

    #[test]
    fn test_parse_garbage_degrades_to_zero() {
        assert_eq!(
            PlatformVersion::parse("glibc"),
            PlatformVersion { major: 0, minor: 0 }
        );
        assert_eq!(
            PlatformVersion::parse(""),
            PlatformVersion { major: 0, minor: 0 }
        );
    }

    #[test]
    fn test_strategy_new_glibc_uses_raw_open() {
        let v = PlatformVersion {
            major: 2,
            minor: 31,
        };
        assert_eq!(v.anchor_strategy(), Ok(OpenStrategy::RawOpenMode));
        let v = PlatformVersion {
            major: 2,
            minor: 17,
        };
        assert_eq!(v.anchor_strategy(), Ok(OpenStrategy::RawOpenMode));
    }

    #[test]
    fn test_strategy_old_glibc_uses_forwarded_dlopen() {
        let v = PlatformVersion {
            major: 2,
            minor: 16,
        };
        assert_eq!(v.anchor_strategy(), Ok(OpenStrategy::ForwardedDlopen));
    }

    #[test]
    fn test_strategy_rejects_wrong_major() {
        for major in [0, 1, 3] {
            let v = PlatformVersion { major, minor: 5 };
            assert_eq!(
                v.anchor_strategy(),
                Err(ConfigError::UnsupportedLibc { major, minor: 5 })
            );
        }
    }
}
