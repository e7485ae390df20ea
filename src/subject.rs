//! Request subject construction and the process-wide key cache.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Fully-formed request subject for one service method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionKey {
    subject: String,
}

impl SubscriptionKey {
    fn new(service: &str, method: &str) -> Self {
        Self {
            subject: format!("rpc.{service}.{method}"),
        }
    }

    /// The broker subject requests for this method are published on.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

static KEY_CACHE: Mutex<BTreeMap<String, Arc<SubscriptionKey>>> = Mutex::new(BTreeMap::new());

/// Returns the memoized subscription key for a service method.
///
/// The first call per process constructs the key; later calls hand back the
/// identical `Arc` (pointer equality, not just value equality) until
/// [`clear_subscription_key_cache`] empties the cache.
pub fn cached_subscription_key(service: &str, method: &str) -> Arc<SubscriptionKey> {
    let key = SubscriptionKey::new(service, method);
    let mut cache = KEY_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        cache
            .entry(key.subject.clone())
            .or_insert_with(|| Arc::new(key)),
    )
}

/// Empties the cache so the next lookup rebuilds its key. Intended for test
/// isolation.
pub fn clear_subscription_key_cache() {
    KEY_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_identity_is_stable_until_cleared() {
        clear_subscription_key_cache();
        let first = cached_subscription_key("warehouse", "create");
        assert!(Arc::ptr_eq(
            &first,
            &cached_subscription_key("warehouse", "create")
        ));

        clear_subscription_key_cache();
        let rebuilt = cached_subscription_key("warehouse", "create");
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert!(Arc::ptr_eq(
            &rebuilt,
            &cached_subscription_key("warehouse", "create")
        ));
        // Rebuilding yields a new identity but the same value.
        assert_eq!(*first, *rebuilt);
    }

    #[test]
    fn distinct_methods_get_distinct_subjects() {
        let created = cached_subscription_key("inventory", "create");
        let destroyed = cached_subscription_key("inventory", "destroy");
        assert_eq!(created.subject(), "rpc.inventory.create");
        assert_eq!(destroyed.subject(), "rpc.inventory.destroy");
        assert!(!Arc::ptr_eq(&created, &destroyed));
    }
}
