//! Bridge Configuration
//!
//! Every field has a working default, so `from_env` cannot fail; environment
//! variables override individual values for non-standard deployments.

use serde::{Deserialize, Serialize};

/// Configuration for the paywall bridge
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// SDK application ID for the production instance
    pub production_aid: String,

    /// SDK application ID for the sandbox instance
    pub sandbox_aid: String,

    /// Experience loader host for production
    pub production_experience_host: String,

    /// Experience loader host for sandbox
    pub sandbox_experience_host: String,

    /// Canonical production hostname (host-override feature flag applies here only)
    pub primary_hostname: String,

    /// First-party composer host override
    pub composer_host_url: String,

    /// First-party identity service override
    pub piano_id_url: String,

    /// First-party commerce endpoint override
    pub endpoint_url: String,

    /// Currency code stamped on ecommerce events
    pub currency: String,

    /// Post-checkout fallback path
    pub home_path: String,

    /// Account page path
    pub account_path: String,

    /// Path where external account linking happens
    pub account_link_path: String,

    /// Referrers containing this fragment are not returned to after checkout
    pub checkout_referrer_exclude: String,

    /// Resource IDs that count as a paid subscription
    pub paid_resource_ids: Vec<String>,

    /// Cookie holding the identity token
    pub identity_cookie: String,

    /// Cookie holding the institutional-access flag ("0"/"1")
    pub institutional_access_cookie: String,

    /// Cookie persisting the feature-flag group
    pub feature_flag_cookie: String,

    /// Storage key for the debug-mode override
    pub debug_storage_key: String,

    /// Storage key for the checkout accumulator snapshot
    pub ecomm_storage_key: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            production_aid: "FU52w9tupu".into(),
            sandbox_aid: "I2n3TREbsu".into(),
            production_experience_host: "experience.tinypass.com".into(),
            sandbox_experience_host: "sandbox.tinypass.com".into(),
            primary_hostname: "www.scientificamerican.com".into(),
            composer_host_url: "https://c2.tp.scientificamerican.com".into(),
            piano_id_url: "https://id.tp.scientificamerican.com".into(),
            endpoint_url: "https://vx.tp.scientificamerican.com".into(),
            currency: "USD".into(),
            home_path: "/".into(),
            account_path: "/account/".into(),
            account_link_path: "/account/link/".into(),
            checkout_referrer_exclude: "/getsciam".into(),
            paid_resource_ids: vec!["DIGITAL".into(), "DIGPRINT".into(), "UNLMTD".into()],
            identity_cookie: "__utp".into(),
            institutional_access_cookie: "_pc_instaccess".into(),
            feature_flag_cookie: "featflag".into(),
            debug_storage_key: "piano-debug".into(),
            ecomm_storage_key: "_ecommStateTrackerData".into(),
        }
    }
}

impl BridgeConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(aid) = std::env::var("PIANO_PROD_AID") {
            config.production_aid = aid;
        }
        if let Ok(aid) = std::env::var("PIANO_SANDBOX_AID") {
            config.sandbox_aid = aid;
        }
        if let Ok(host) = std::env::var("PIANO_PRIMARY_HOSTNAME") {
            config.primary_hostname = host;
        }
        if let Ok(currency) = std::env::var("PIANO_CURRENCY") {
            config.currency = currency;
        }
        if let Ok(rids) = std::env::var("PIANO_PAID_RIDS") {
            config.paid_resource_ids = rids
                .split(',')
                .map(|rid| rid.trim().to_string())
                .filter(|rid| !rid.is_empty())
                .collect();
        }

        config
    }

    /// Experience host for an environment choice
    pub fn experience_host(&self, production: bool) -> &str {
        if production {
            &self.production_experience_host
        } else {
            &self.sandbox_experience_host
        }
    }
}
