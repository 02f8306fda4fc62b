//! Fatal configuration errors.
//!
//! These are the misconfigurations the shim cannot continue past: running
//! with namespace isolation silently broken is worse than dying. Ordinary
//! loader failures (library not found, unresolved symbol) are *not* errors
//! at this level; they pass through to callers exactly as the underlying
//! primitive reports them.
//!
//! This crate only describes the error; the ABI crate's load-time
//! constructor decides that it terminates the process.

use thiserror::Error;

/// Host misconfiguration detected during shim initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The glibc major version is not one this shim knows how to drive.
    #[error("incorrect glibc major version: {major}.{minor}")]
    UnsupportedLibc { major: u32, minor: u32 },

    /// `dlinfo(RTLD_DI_LMID)` on the shim's own handle failed.
    #[error("error obtaining namespace (dlinfo): {detail}")]
    NamespaceProbe { detail: String },

    /// The shim was loaded into the default namespace. Its entire purpose
    /// requires isolation, so this is a host bug, not a recoverable state.
    #[error("libeden.so shouldn't be loaded in the default namespace")]
    DefaultNamespace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_diagnostics() {
        let err = ConfigError::UnsupportedLibc { major: 3, minor: 1 };
        assert_eq!(err.to_string(), "incorrect glibc major version: 3.1");

        let err = ConfigError::NamespaceProbe {
            detail: "handle is corrupt".to_string(),
        };
        assert!(err.to_string().contains("dlinfo"));
        assert!(err.to_string().contains("handle is corrupt"));
    }
}
