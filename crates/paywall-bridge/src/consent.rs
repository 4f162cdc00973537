//! Consent Bridge
//!
//! Maps the consent-management platform's granted category codes onto the
//! SDK's per-product consent grants. The mapping is a fixed policy table:
//! identity processing is always opted in (no opt-out path for
//! authentication); the remaining products get full processing only when
//! both the performance and functional categories are granted, and minimal
//! ("essential") processing otherwise.

use std::sync::Arc;

use bridge_core::{CommandQueue, ConsentMode, ConsentPurpose, ConsentQueue, SdkCommand};

use crate::sdk::SdkClient;

/// Category code granting performance processing
const PERFORMANCE_CATEGORY: &str = "C0002";

/// Category code granting functional processing
const FUNCTIONAL_CATEGORY: &str = "C0003";

/// Booleans derived from the granted category list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsentFlags {
    pub performance: bool,
    pub functional: bool,
}

impl ConsentFlags {
    /// Full processing requires both categories
    pub fn has_full_consent(self) -> bool {
        self.performance && self.functional
    }
}

/// Parse a comma-separated granted category list
pub fn consent_flags(categories: &str) -> ConsentFlags {
    let mut flags = ConsentFlags {
        performance: false,
        functional: false,
    };
    for code in categories.split(',').map(str::trim) {
        match code {
            PERFORMANCE_CATEGORY => flags.performance = true,
            FUNCTIONAL_CATEGORY => flags.functional = true,
            _ => {}
        }
    }
    flags
}

/// The consent grants to record for a granted category list
pub fn consent_commands(categories: &str) -> Vec<SdkCommand> {
    let product_mode = if consent_flags(categories).has_full_consent() {
        ConsentMode::OptIn
    } else {
        ConsentMode::Essential
    };

    vec![
        SdkCommand::SetConsent {
            purpose: ConsentPurpose::Id,
            mode: ConsentMode::OptIn,
        },
        SdkCommand::SetConsent {
            purpose: ConsentPurpose::Composer,
            mode: product_mode,
        },
        SdkCommand::SetConsent {
            purpose: ConsentPurpose::Pa,
            mode: product_mode,
        },
        SdkCommand::SetConsent {
            purpose: ConsentPurpose::Vx,
            mode: product_mode,
        },
    ]
}

/// Install the consent bridge: one deferred callback that applies the
/// policy table once the consent library is ready, then starts composer
/// experience evaluation.
///
/// Grants are only written when the SDK has no consent recorded yet.
pub fn install(
    consent_queue: &ConsentQueue,
    sdk: Arc<dyn SdkClient>,
    commands: Arc<CommandQueue>,
    granted_categories: impl Fn() -> String + Send + 'static,
) {
    consent_queue.defer(move || {
        let categories = granted_categories();

        if !sdk.has_consent() {
            for command in consent_commands(&categories) {
                commands.push(command);
            }
        }

        commands.push(SdkCommand::ExperienceInit);
    });
}
