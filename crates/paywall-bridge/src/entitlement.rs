//! Entitlement Cache
//!
//! Answers "does this visitor hold a paid subscription" at most once per
//! page lifetime. Meter telemetry is suppressed for paying users, and the
//! lookup behind it is a network call, so the first answer is cached.
//!
//! Invalidation policy: the cache lives for the page context and is cleared
//! only by [`EntitlementCache::invalidate`], which the host calls before
//! executing a navigation. Entitlement changes mid-pageview are not
//! observed.

use std::sync::RwLock;

use crate::error::Result;
use crate::sdk::SdkClient;

/// Page-lifetime cache of the paid-subscription check
pub struct EntitlementCache {
    has_sub: RwLock<Option<bool>>,
}

impl Default for EntitlementCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitlementCache {
    pub fn new() -> Self {
        Self {
            has_sub: RwLock::new(None),
        }
    }

    /// Whether the user holds any of the paid resource IDs
    ///
    /// Resolves through the SDK's access list on first call and caches the
    /// answer. Concurrent first calls may both hit the SDK; the result is
    /// idempotent, so last write wins without further coordination.
    pub async fn has_paid_access(&self, sdk: &dyn SdkClient, paid_rids: &[String]) -> Result<bool> {
        if let Some(cached) = *self.has_sub.read().unwrap() {
            return Ok(cached);
        }

        let grants = sdk.access_list(None).await?;
        let has_sub = grants
            .iter()
            .any(|grant| paid_rids.contains(&grant.resource.rid));

        *self.has_sub.write().unwrap() = Some(has_sub);
        Ok(has_sub)
    }

    /// Cached answer, when one exists
    pub fn cached(&self) -> Option<bool> {
        *self.has_sub.read().unwrap()
    }

    /// Clear the cache; called at the page-navigation boundary
    pub fn invalidate(&self) {
        *self.has_sub.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::MockSdkClient;

    fn paid_rids() -> Vec<String> {
        vec!["DIGITAL".into(), "DIGPRINT".into(), "UNLMTD".into()]
    }

    #[tokio::test]
    async fn test_paid_rid_matches() {
        let sdk = MockSdkClient::new().with_grant("DIGPRINT", None);
        let cache = EntitlementCache::new();

        assert!(cache.has_paid_access(&sdk, &paid_rids()).await.unwrap());
        assert_eq!(cache.cached(), Some(true));
    }

    #[tokio::test]
    async fn test_unrelated_grant_does_not_count() {
        let sdk = MockSdkClient::new().with_grant("NEWSLETTER", None);
        let cache = EntitlementCache::new();

        assert!(!cache.has_paid_access(&sdk, &paid_rids()).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_happens_once() {
        let sdk = MockSdkClient::new().with_grant("DIGITAL", None);
        let cache = EntitlementCache::new();

        cache.has_paid_access(&sdk, &paid_rids()).await.unwrap();
        cache.has_paid_access(&sdk, &paid_rids()).await.unwrap();
        assert_eq!(sdk.access_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_lookup() {
        let sdk = MockSdkClient::new();
        let cache = EntitlementCache::new();

        cache.has_paid_access(&sdk, &paid_rids()).await.unwrap();
        cache.invalidate();
        assert_eq!(cache.cached(), None);

        cache.has_paid_access(&sdk, &paid_rids()).await.unwrap();
        assert_eq!(sdk.access_calls(), 2);
    }
}
