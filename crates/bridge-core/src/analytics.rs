//! Analytics Data Layer Model
//!
//! Typed event shapes for the publisher's analytics data layer, plus the
//! sink trait the bridge appends to. The data layer is append-only: the
//! bridge pushes events and never reads them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Paywall meter snapshot attached to meter telemetry events
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterSnapshot {
    /// Name of the meter that fired
    pub meter_name: String,

    /// Meter type reported by the SDK
    pub meter_type: String,

    /// Whether this pageview incremented the meter
    pub incremented: bool,

    /// Number of metered articles viewed so far
    pub metered_paywall_article_num: u32,

    /// Maximum free views granted by the meter
    pub max_views: u32,

    /// Free views remaining
    pub views_left: u32,
}

/// User fields attached to the login event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    /// Whether the user has IP-based institutional access
    pub is_site_license_customer: bool,

    /// SDK-assigned user identifier (empty when unknown)
    pub user_id: String,

    /// Where the login UI was triggered from
    pub login_source: Option<String>,

    /// "login" or "registration"
    pub login_method: String,
}

/// User fields attached to the sign-up event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpUser {
    pub user_id: String,
}

/// Minimal user reference attached to checkout funnel events
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutUser {
    /// SDK-assigned user identifier (empty when not logged in)
    pub user_id: String,
}

/// GA4-style line item (keys stay snake_case on the wire)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EcommerceItem {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: u32,
}

/// GA4-style ecommerce object (keys stay snake_case on the wire)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ecommerce {
    pub currency: String,
    pub value: Option<f64>,
    pub coupon: Option<String>,
    pub items: Vec<EcommerceItem>,
}

/// Denormalized checkout mirror carried next to the ecommerce object,
/// used as labels/values on downstream analytics events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub amount: Option<f64>,
    pub subscription_type: Option<String>,
    pub subscription_name: Option<String>,
}

/// Body shared by all accumulator-flushed ecommerce events
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EcommercePayload {
    pub ecommerce: Ecommerce,
    pub checkout: CheckoutSummary,
}

/// Conversion detail attached to the checkout completion event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCompleteSummary {
    /// Amount the user was charged
    pub amount: Option<f64>,

    /// Currency the charge was made in (e.g. "USD")
    pub currency_code: Option<String>,

    /// Access expiration, UNIX timestamp
    pub expiration_time: Option<i64>,

    /// Promotion ID when a promo code was used
    pub promotion_id: Option<String>,

    /// Purchased resource ID
    pub resource_id: Option<String>,

    /// When access started
    pub start_time: Option<DateTime<Utc>>,

    /// Term ID of the purchased subscription
    pub subscription_type: Option<String>,

    /// SDK-assigned user identifier
    pub uid: Option<String>,
}

/// Term detail attached to the term selection event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTermSummary {
    pub subscription_type: Option<String>,
    pub subscription_name: Option<String>,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
}

/// Checkout detail attached to the checkout start event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutSummary {
    pub subscription_type: Option<String>,
    pub offer_id: Option<String>,
}

/// Full term detail attached to the payment submission event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentSummary {
    pub offer_id: Option<String>,
    pub currency_code: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub subscription_type: Option<String>,
    pub subscription_name: Option<String>,
    pub total_amount: Option<f64>,
    pub sku: Option<String>,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub resource_description: Option<String>,
    pub term_type: Option<String>,
    pub tax_rate: Option<f64>,
    pub tax_amount: Option<f64>,
}

/// Per-pageview user snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoSnapshot {
    /// SDK-assigned user identifier (empty when not logged in)
    pub user_id: String,

    /// Name of the subscription resource, when one exists
    pub subscription_name: Option<String>,

    /// Resource ID of the subscription, when one exists
    pub subscription_type: Option<String>,

    pub is_logged_in: bool,
    pub is_registered: bool,
    pub is_subscriber: bool,

    /// Whether the user has IP-based institutional access
    pub is_site_license_customer: bool,
}

/// A structured analytics data layer event
///
/// Serializes with the event name under the `event` key and the remaining
/// fields flattened beside it, matching the data layer's wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DataLayerEvent {
    /// Meter incremented for a non-paying visitor
    #[serde(rename = "meter_updated")]
    MeterUpdated { user: MeterSnapshot },

    /// Meter exhausted, paywall overlay invoked
    #[serde(rename = "meter_expired")]
    MeterExpired { user: MeterSnapshot },

    /// User logged out (downstream analytics reset on this)
    #[serde(rename = "logout")]
    Logout,

    #[serde(rename = "login")]
    Login { user: LoginUser },

    #[serde(rename = "sign_up")]
    SignUp { user: SignUpUser },

    /// Accumulator flush: user selected a term
    #[serde(rename = "select_item")]
    SelectItem(EcommercePayload),

    /// Accumulator flush: user reached the payment details step
    #[serde(rename = "begin_checkout")]
    BeginCheckout(EcommercePayload),

    /// Accumulator flush: user submitted payment
    #[serde(rename = "add_payment_info")]
    AddPaymentInfo(EcommercePayload),

    /// Accumulator flush: purchase confirmed
    #[serde(rename = "purchase")]
    Purchase(EcommercePayload),

    /// Conversion detail for downstream (non-GA) consumers
    #[serde(rename = "checkoutComplete")]
    CheckoutComplete { checkout: CheckoutCompleteSummary },

    #[serde(rename = "checkoutModalClosed_checkoutCompleted")]
    CheckoutModalClosedCheckoutCompleted,

    #[serde(rename = "checkoutModalClosed_userAlreadyHasAccess")]
    CheckoutModalClosedUserAlreadyHasAccess,

    #[serde(rename = "checkoutModalClosed_voucherRedemptionCompleted")]
    CheckoutModalClosedVoucherRedemptionCompleted,

    #[serde(rename = "checkoutModalClosed_userClosedModal")]
    CheckoutModalClosedUserClosedModal,

    #[serde(rename = "checkoutUserSelectTerm")]
    CheckoutUserSelectTerm {
        user: CheckoutUser,
        checkout: SelectTermSummary,
    },

    #[serde(rename = "checkoutStartCheckout")]
    CheckoutStartCheckout {
        user: CheckoutUser,
        checkout: StartCheckoutSummary,
    },

    #[serde(rename = "checkoutSubmitPayment")]
    CheckoutSubmitPayment {
        user: CheckoutUser,
        checkout: SubmitPaymentSummary,
    },

    /// External account link submitted (CDS lookup receipt)
    #[serde(rename = "cds_account_registration")]
    CdsAccountRegistration { user: CheckoutUser },

    #[serde(rename = "userInfo")]
    UserInfo { user: UserInfoSnapshot },
}

impl DataLayerEvent {
    /// Event name as it appears under the `event` key
    pub fn name(&self) -> &'static str {
        match self {
            Self::MeterUpdated { .. } => "meter_updated",
            Self::MeterExpired { .. } => "meter_expired",
            Self::Logout => "logout",
            Self::Login { .. } => "login",
            Self::SignUp { .. } => "sign_up",
            Self::SelectItem(_) => "select_item",
            Self::BeginCheckout(_) => "begin_checkout",
            Self::AddPaymentInfo(_) => "add_payment_info",
            Self::Purchase(_) => "purchase",
            Self::CheckoutComplete { .. } => "checkoutComplete",
            Self::CheckoutModalClosedCheckoutCompleted => "checkoutModalClosed_checkoutCompleted",
            Self::CheckoutModalClosedUserAlreadyHasAccess => {
                "checkoutModalClosed_userAlreadyHasAccess"
            }
            Self::CheckoutModalClosedVoucherRedemptionCompleted => {
                "checkoutModalClosed_voucherRedemptionCompleted"
            }
            Self::CheckoutModalClosedUserClosedModal => "checkoutModalClosed_userClosedModal",
            Self::CheckoutUserSelectTerm { .. } => "checkoutUserSelectTerm",
            Self::CheckoutStartCheckout { .. } => "checkoutStartCheckout",
            Self::CheckoutSubmitPayment { .. } => "checkoutSubmitPayment",
            Self::CdsAccountRegistration { .. } => "cds_account_registration",
            Self::UserInfo { .. } => "userInfo",
        }
    }
}

/// Sink for analytics events
///
/// Append-only and infallible: a data layer accepts whatever is pushed.
pub trait AnalyticsSink: Send + Sync {
    fn push(&self, event: DataLayerEvent);
}

/// In-memory sink (for development/testing)
pub struct MemoryAnalyticsSink {
    events: RwLock<Vec<DataLayerEvent>>,
}

impl Default for MemoryAnalyticsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAnalyticsSink {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of everything pushed so far, in order
    pub fn events(&self) -> Vec<DataLayerEvent> {
        self.events.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalyticsSink for MemoryAnalyticsSink {
    fn push(&self, event: DataLayerEvent) {
        self.events.write().unwrap().push(event);
    }
}
