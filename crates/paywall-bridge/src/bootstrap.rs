//! Page Bootstrap
//!
//! One-shot assembly of a page's bridge: resolve the environment, run the
//! session-consistency guard, queue the SDK setup commands in their required
//! order, install the consent bridge, and hand back the event dispatcher
//! plus the experience loader URL the host injects as a script tag.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use bridge_core::{
    AnalyticsSink, CommandQueue, ConsentQueue, CookieJar, KeyValueStore, PageContext, SdkCommand,
};

use crate::config::BridgeConfig;
use crate::consent;
use crate::env::{self, EnvResolution};
use crate::error::Result;
use crate::handlers::{Navigation, PaywallBridge};
use crate::identity;
use crate::sdk::SdkClient;

static FEATURE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|&)debug=feature:(\w+)").unwrap());

/// Feature-flag group gating the first-party host overrides
const SUBDOMAIN_FLAG: &str = "pianosubdomain";

/// Composer experience tag marking paywall-exempt content
const PAYWALL_EXEMPT_TAG: &str = "paywall-exempt";

const FEATURE_FLAG_TTL_DAYS: u32 = 365;

/// Resolve the feature-flag group, syncing any query directive to its cookie
///
/// A `debug=feature:<group>` directive persists the group for a year; the
/// effective group is always read back from the cookie.
pub fn feature_flag(
    page: &PageContext,
    cookies: &dyn CookieJar,
    cookie_name: &str,
) -> Option<String> {
    if let Some(captures) = FEATURE_DIRECTIVE.captures(&page.query) {
        cookies.set(cookie_name, &captures[1], Some(FEATURE_FLAG_TTL_DAYS));
    }
    cookies.get(cookie_name)
}

/// Host-override commands, applied only for the flagged group on the
/// canonical production hostname
pub fn subdomain_host_commands(
    flag: Option<&str>,
    page: &PageContext,
    config: &BridgeConfig,
) -> Vec<SdkCommand> {
    if flag != Some(SUBDOMAIN_FLAG) || page.hostname != config.primary_hostname {
        return Vec::new();
    }

    vec![
        SdkCommand::SetComposerHost {
            url: config.composer_host_url.clone(),
        },
        SdkCommand::SetPianoIdUrl {
            url: config.piano_id_url.clone(),
        },
        SdkCommand::SetEndpoint {
            url: config.endpoint_url.clone(),
        },
    ]
}

/// Page-content fields forwarded to the SDK as custom variables for
/// composer experience targeting
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentMetadata {
    /// Publishing platform identifier
    pub platform: String,

    /// Content language; absent defaults to "en"
    pub language: Option<String>,

    pub primary_category: String,
    pub sub_category: String,
    pub content_type: String,
    pub content_subtype: String,
    pub content_id: String,
    pub collection_id: String,
    pub collection_name: String,

    pub published_at: String,
    pub published_at_date: String,
    pub published_at_time: String,
    pub updated_at: String,

    pub brand: String,
    pub authors: Vec<String>,
    pub title: String,
    pub keywords: String,
    pub template: String,

    pub syndicated: bool,
    pub partner: bool,
    pub sponsored: bool,
    pub resalable: bool,

    pub article_doi: String,
    pub journal_issue_name: String,

    pub word_count: Option<u32>,

    /// Editorially exempted from the paywall
    pub paywall_exempt: bool,
}

fn var(name: &str, value: impl Into<String>) -> SdkCommand {
    SdkCommand::SetCustomVariable {
        name: name.into(),
        value: value.into(),
    }
}

impl ContentMetadata {
    /// The custom-variable commands for this content, in their fixed order
    pub fn custom_variables(&self) -> Vec<SdkCommand> {
        vec![
            var("platform", &self.platform),
            var("language", self.language.as_deref().unwrap_or("en")),
            var("primaryCategory", &self.primary_category),
            var("subCategory", &self.sub_category),
            var("subtype", &self.content_subtype),
            var("type", &self.content_type),
            var("contentId", &self.content_id),
            var("collectionId", &self.collection_id),
            var("collectionName", &self.collection_name),
            var("publishedAtDateTime", &self.published_at),
            var("publishedAtDate", &self.published_at_date),
            var("publishedAtTime", &self.published_at_time),
            var("brand", &self.brand),
            var("authors", self.authors.join(",")),
            var("title", &self.title),
            var("tags", &self.keywords),
            var("template", &self.template),
            var("isSyndicated", self.syndicated.to_string()),
            var("isPartner", self.partner.to_string()),
            var("isSponsored", self.sponsored.to_string()),
            var("isResalable", self.resalable.to_string()),
            // Always empty; kept for experience targeting compatibility
            var("containsMedia", ""),
            var("articleDoi", &self.article_doi),
            var("journalIssueName", &self.journal_issue_name),
            var("updatedAtDateTime", &self.updated_at),
            var(
                "wordCount",
                self.word_count.map(|n| n.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

/// Host-side seams the bridge is wired through
pub struct HostSeams {
    pub sink: Arc<dyn AnalyticsSink>,
    pub sdk: Arc<dyn SdkClient>,
    pub cookies: Arc<dyn CookieJar>,
    pub store: Arc<dyn KeyValueStore>,
    pub commands: Arc<CommandQueue>,
}

/// What the host gets back from a bootstrap
pub struct BootstrapOutcome {
    pub resolution: EnvResolution,

    /// Experience loader URL to inject as an async script tag
    pub script_src: String,

    /// Navigation the session guard demands, if any; the host must perform
    /// it before handing events to the bridge
    pub navigation: Option<Navigation>,

    pub bridge: PaywallBridge,
}

/// Assemble the bridge for one page load
pub fn bootstrap(
    config: BridgeConfig,
    page: PageContext,
    content: &ContentMetadata,
    seams: HostSeams,
    consent_queue: &ConsentQueue,
    granted_categories: impl Fn() -> String + Send + 'static,
) -> Result<BootstrapOutcome> {
    let resolution = env::resolve(&page, seams.store.as_ref(), &config);
    tracing::info!(
        environment = ?resolution.environment,
        aid = %resolution.aid,
        debug = ?resolution.debug,
        "Bootstrapping paywall bridge"
    );

    // A session minted by the other environment must be purged, but prod
    // subdomains are trusted as-is.
    let navigation = if env::is_prod_subdomain(&page.hostname) {
        None
    } else {
        identity::verify_or_purge(
            seams.cookies.as_ref(),
            &config.identity_cookie,
            &resolution.aid,
            seams.sdk.as_ref(),
        )
    };

    seams
        .commands
        .push(SdkCommand::SetRequireConsent { required: true });

    let flag = feature_flag(&page, seams.cookies.as_ref(), &config.feature_flag_cookie);
    for command in subdomain_host_commands(flag.as_deref(), &page, &config) {
        seams.commands.push(command);
    }

    if content.paywall_exempt {
        seams.commands.push(SdkCommand::SetTags {
            tags: vec![PAYWALL_EXEMPT_TAG.into()],
        });
    }
    for command in content.custom_variables() {
        seams.commands.push(command);
    }

    seams
        .commands
        .push(SdkCommand::SetUsePianoIdUserProvider { enabled: true });
    seams.commands.push(SdkCommand::SetDebug {
        enabled: resolution.debug.is_some(),
    });

    consent::install(
        consent_queue,
        seams.sdk.clone(),
        seams.commands.clone(),
        granted_categories,
    );

    let script_src = resolution.experience_url.clone();
    let bridge = PaywallBridge::new(
        config,
        page,
        resolution.aid.clone(),
        seams.sink,
        seams.sdk,
        seams.cookies,
        seams.store,
    );

    Ok(BootstrapOutcome {
        resolution,
        script_src,
        navigation,
        bridge,
    })
}
