//! Linking-namespace identity.
//!
//! glibc identifies a link-map list with an `Lmid_t` (a long). The default
//! namespace is id 0; the shim must only ever run in a non-default one,
//! so id 0 coming out of the load-time probe is a fatal misconfiguration.

use crate::error::ConfigError;

/// Opaque identifier of a dynamic-linking namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(i64);

impl NamespaceId {
    /// The process's default namespace (`LM_ID_BASE`).
    pub const DEFAULT: Self = Self(0);

    /// Validate a raw id probed from the loader. The default namespace is
    /// rejected: it means the host loaded the shim without isolation.
    pub fn from_probe(raw: i64) -> Result<Self, ConfigError> {
        if raw == 0 {
            return Err(ConfigError::DefaultNamespace);
        }
        Ok(Self(raw))
    }

    /// Raw id for forwarding to `dlmopen` and for trace prefixes.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace_is_rejected() {
        assert_eq!(NamespaceId::from_probe(0), Err(ConfigError::DefaultNamespace));
    }

    #[test]
    fn test_non_default_accepted() {
        let ns = NamespaceId::from_probe(42).unwrap();
        assert_eq!(ns.raw(), 42);
        assert!(!ns.is_default());
        // Negative ids are not produced by glibc, but the probe does not
        // second-guess the loader beyond the default-namespace check.
        assert_eq!(NamespaceId::from_probe(-3).unwrap().raw(), -3);
    }
}
