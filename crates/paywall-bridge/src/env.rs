//! Environment Resolution
//!
//! Decides whether the page talks to the production or sandbox SDK
//! instance, from the hostname plus an optional debug override. The
//! override is set via a `debug=piano[-variant]` query directive and
//! persisted so it survives later page loads without the query string.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use bridge_core::{KeyValueStore, PageContext};

use crate::config::BridgeConfig;

static DEBUG_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"debug=piano(?:-(prod|sandbox|log|reset))?").unwrap());

static PROD_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:www|blogs)\.").unwrap());

static PRIMARY_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^main-www\.").unwrap());

/// Debug-mode override
///
/// - `Log`: verbose SDK logging only
/// - `Prod`: verbose logging + force the production environment
/// - `Sandbox`: verbose logging + force the sandbox environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugMode {
    Log,
    Prod,
    Sandbox,
}

impl DebugMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Prod => "prod",
            Self::Sandbox => "sandbox",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "log" => Some(Self::Log),
            "prod" => Some(Self::Prod),
            "sandbox" => Some(Self::Sandbox),
            _ => None,
        }
    }
}

/// A recognized `debug=piano[-variant]` query directive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DebugDirective {
    /// Persist and apply an override
    Set(DebugMode),
    /// Clear any persisted override
    Reset,
}

fn debug_directive(query: &str) -> Option<DebugDirective> {
    let captures = DEBUG_DIRECTIVE.captures(query)?;
    match captures.get(1).map(|m| m.as_str()) {
        Some("reset") => Some(DebugDirective::Reset),
        Some(variant) => DebugMode::parse(variant).map(DebugDirective::Set),
        // Bare `debug=piano` defaults to verbose logging
        None => Some(DebugDirective::Set(DebugMode::Log)),
    }
}

/// Resolve the debug override, syncing any query directive to storage
///
/// A `reset` directive removes the stored override and yields no override;
/// other directives persist their variant. Without a directive, the stored
/// value is returned (absent or unrecognized values mean no override).
pub fn debug_mode(page: &PageContext, store: &dyn KeyValueStore, key: &str) -> Option<DebugMode> {
    match debug_directive(&page.query) {
        Some(DebugDirective::Reset) => {
            store.remove(key);
            None
        }
        Some(DebugDirective::Set(mode)) => {
            store.set(key, mode.as_str());
            Some(mode)
        }
        None => store.get(key).as_deref().and_then(DebugMode::parse),
    }
}

/// Whether the host is a recognized production subdomain
pub fn is_prod_subdomain(hostname: &str) -> bool {
    PROD_SUBDOMAIN.is_match(hostname)
}

/// Which SDK instance the page talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Sandbox,
}

/// Resolved environment plus the identifiers bound to it
#[derive(Clone, Debug, PartialEq)]
pub struct EnvResolution {
    pub environment: Environment,

    /// Application ID for the chosen environment
    pub aid: String,

    /// Experience loader script URL
    pub experience_url: String,

    /// Debug override in effect, if any
    pub debug: Option<DebugMode>,
}

impl EnvResolution {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Resolve the environment for this page load
///
/// Production is selected when the hostname is a production subdomain, the
/// override forces production, or (absent a sandbox override) the hostname
/// matches the primary staging pattern. Identical (hostname, stored
/// override, query directive) inputs always resolve identically.
pub fn resolve(
    page: &PageContext,
    store: &dyn KeyValueStore,
    config: &BridgeConfig,
) -> EnvResolution {
    let debug = debug_mode(page, store, &config.debug_storage_key);

    let production = is_prod_subdomain(&page.hostname)
        || debug == Some(DebugMode::Prod)
        || (debug != Some(DebugMode::Sandbox) && PRIMARY_SUBDOMAIN.is_match(&page.hostname));

    let environment = if production {
        Environment::Production
    } else {
        Environment::Sandbox
    };
    let aid = if production {
        config.production_aid.clone()
    } else {
        config.sandbox_aid.clone()
    };
    let experience_url = format!(
        "https://{}/xbuilder/experience/load?aid={}",
        config.experience_host(production),
        aid
    );

    EnvResolution {
        environment,
        aid,
        experience_url,
        debug,
    }
}
