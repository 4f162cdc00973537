//! # paywall-bridge
//!
//! Wires a third-party subscription/paywall SDK into a publisher page:
//! environment resolution, session consistency, consent bridging, checkout
//! funnel accumulation, and typed translation of SDK callbacks into
//! analytics data layer events.
//!
//! [`bootstrap::bootstrap`] assembles the whole thing for one page load and
//! returns the [`handlers::PaywallBridge`] dispatcher the host feeds SDK
//! events into.

pub mod bootstrap;
pub mod config;
pub mod consent;
pub mod ecomm;
pub mod entitlement;
pub mod env;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod payloads;
pub mod sdk;

pub use bootstrap::{BootstrapOutcome, ContentMetadata, HostSeams, bootstrap};
pub use config::BridgeConfig;
pub use ecomm::{CheckoutState, EcommEventKind, EcommStateTracker};
pub use entitlement::EntitlementCache;
pub use env::{DebugMode, EnvResolution, Environment};
pub use error::{PaywallError, Result};
pub use handlers::{Navigation, PaywallBridge, SigninSurface};
pub use payloads::SdkEvent;
pub use sdk::{AccessGrant, MockSdkClient, SdkClient, SdkUser};
