//! SDK Client Seam
//!
//! The slice of the external paywall SDK the bridge actually talks to.
//! Network-backed calls are async; the bridge never assumes they resolve
//! before the next SDK event arrives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;

/// Logged-in user detail exposed by the SDK's identity service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkUser {
    /// SDK-assigned user identifier
    pub uid: String,

    /// Whether the user still has to confirm their email address
    #[serde(default)]
    pub email_confirmation_required: bool,
}

/// A purchased resource grant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub resource: ResourceRef,
}

/// Resource attached to a grant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource ID (e.g. "DIGITAL")
    pub rid: String,

    /// Display name of the resource
    pub name: Option<String>,
}

/// Interface to the loaded SDK
#[async_trait]
pub trait SdkClient: Send + Sync {
    /// Currently logged-in user, if any
    fn current_user(&self) -> Option<SdkUser>;

    /// Whether a valid user session exists
    fn is_user_valid(&self) -> bool {
        self.current_user().is_some()
    }

    /// Whether the SDK already has consent recorded
    fn has_consent(&self) -> bool;

    /// Force a logout of the current session
    fn logout(&self);

    /// Open the SDK's login screen
    fn show_login(&self);

    /// List the user's resource grants, optionally scoped to an application
    async fn access_list(&self, aid: Option<&str>) -> Result<Vec<AccessGrant>>;
}

/// Scriptable SDK client (for development/testing)
pub struct MockSdkClient {
    user: RwLock<Option<SdkUser>>,
    consent_recorded: RwLock<bool>,
    grants: RwLock<Vec<AccessGrant>>,
    logout_calls: AtomicUsize,
    login_shows: AtomicUsize,
    access_calls: AtomicUsize,
}

impl Default for MockSdkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSdkClient {
    pub fn new() -> Self {
        Self {
            user: RwLock::new(None),
            consent_recorded: RwLock::new(false),
            grants: RwLock::new(Vec::new()),
            logout_calls: AtomicUsize::new(0),
            login_shows: AtomicUsize::new(0),
            access_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_user(self, uid: impl Into<String>) -> Self {
        *self.user.write().unwrap() = Some(SdkUser {
            uid: uid.into(),
            email_confirmation_required: false,
        });
        self
    }

    #[must_use]
    pub fn with_grant(self, rid: impl Into<String>, name: Option<&str>) -> Self {
        self.grants.write().unwrap().push(AccessGrant {
            resource: ResourceRef {
                rid: rid.into(),
                name: name.map(String::from),
            },
        });
        self
    }

    #[must_use]
    pub fn with_consent_recorded(self) -> Self {
        *self.consent_recorded.write().unwrap() = true;
        self
    }

    pub fn set_email_confirmation_required(&self, required: bool) {
        if let Some(user) = self.user.write().unwrap().as_mut() {
            user.email_confirmation_required = required;
        }
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn login_shows(&self) -> usize {
        self.login_shows.load(Ordering::SeqCst)
    }

    pub fn access_calls(&self) -> usize {
        self.access_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SdkClient for MockSdkClient {
    fn current_user(&self) -> Option<SdkUser> {
        self.user.read().unwrap().clone()
    }

    fn has_consent(&self) -> bool {
        *self.consent_recorded.read().unwrap()
    }

    fn logout(&self) {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        *self.user.write().unwrap() = None;
    }

    fn show_login(&self) {
        self.login_shows.fetch_add(1, Ordering::SeqCst);
    }

    async fn access_list(&self, _aid: Option<&str>) -> Result<Vec<AccessGrant>> {
        self.access_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.grants.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_scripting() {
        let sdk = MockSdkClient::new()
            .with_user("usr_1")
            .with_grant("DIGITAL", Some("Digital Subscription"));

        assert!(sdk.is_user_valid());
        assert_eq!(sdk.access_list(None).await.unwrap().len(), 1);

        sdk.logout();
        assert!(!sdk.is_user_valid());
        assert_eq!(sdk.logout_calls(), 1);
    }
}
