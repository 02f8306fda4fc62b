//! Process-wide namespace registry.
//!
//! Holds the id of the linking namespace this shim was loaded into. Written
//! once during initialization, read by every interposed call and by the
//! trace prefix. Before initialization completes the value reads as the
//! default namespace (0); the host's load-time contract guarantees no
//! exported function runs that early.

use std::sync::atomic::{AtomicI64, Ordering};

use eden_core::NamespaceId;

static NAMESPACE: AtomicI64 = AtomicI64::new(0);

/// Publish the namespace probed at initialization.
pub(crate) fn publish(ns: NamespaceId) {
    NAMESPACE.store(ns.raw(), Ordering::Release);
}

/// Raw namespace id, as passed to `dlmopen` and shown in trace prefixes.
#[must_use]
pub fn namespace_raw() -> i64 {
    NAMESPACE.load(Ordering::Acquire)
}

/// Install a namespace id without probing the loader.
#[cfg(debug_assertions)]
pub fn set_namespace_for_tests(raw: i64) {
    NAMESPACE.store(raw, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_read() {
        publish(NamespaceId::from_probe(7).unwrap());
        assert_eq!(namespace_raw(), 7);
        set_namespace_for_tests(42);
        assert_eq!(namespace_raw(), 42);
    }
}
