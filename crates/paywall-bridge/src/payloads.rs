//! SDK Callback Payloads
//!
//! Each SDK callback payload is an explicit tagged record with named fields
//! and documented optionality, rather than ad hoc property access into
//! whatever the SDK handed over. `SdkEvent` deserializes from the SDK's
//! JSON with the callback name under the `event` key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Meter state delivered with meter telemetry callbacks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterPayload {
    pub meter_name: String,

    /// Meter type ("metered", "locked", ...)
    #[serde(rename = "type")]
    pub meter_type: String,

    /// Whether this pageview incremented the meter
    pub incremented: bool,

    /// Metered views consumed so far
    pub views: u32,

    pub max_views: u32,

    pub views_left: u32,
}

/// Identity params delivered with a successful login
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[serde(default)]
    pub params: LoginParams,

    /// Where the login UI was triggered from
    #[serde(default)]
    pub source: Option<String>,

    /// True when the login was a fresh registration
    #[serde(default)]
    pub registration: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// Subject identifier of the new account
    #[serde(default)]
    pub sub: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    #[serde(default)]
    pub user: RegisteredUser,
}

/// Term chosen from an offer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermPayload {
    pub term_id: String,

    pub term_name: String,

    #[serde(default)]
    pub resource_id: Option<String>,

    #[serde(default)]
    pub resource_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutPayload {
    #[serde(default)]
    pub term_id: Option<String>,

    #[serde(default)]
    pub offer_id: Option<String>,
}

/// Resource attached to a term in the payment payload
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TermResource {
    #[serde(default)]
    pub rid: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Full term detail delivered with payment submission
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDetail {
    /// Amount the user will be charged
    pub charge_amount: f64,

    #[serde(default)]
    pub charge_currency: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub term_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub resource: Option<TermResource>,

    /// Term type ("payment", "subscription", ...)
    #[serde(default, rename = "type")]
    pub term_type: Option<String>,

    #[serde(default)]
    pub tax_rate: Option<f64>,

    #[serde(default)]
    pub tax_amount: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[serde(default)]
    pub offer_id: Option<String>,

    pub term: TermDetail,
}

/// Term fields observed on checkout state transitions
///
/// The charge amount is not a documented property of this callback; if the
/// price stops being reported, check whether the SDK still sends it here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTerm {
    #[serde(default)]
    pub charge_amount: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangePayload {
    /// Named checkout state ("state2" is the payment details page)
    pub state_name: String,

    #[serde(default)]
    pub term: Option<StateTerm>,
}

/// Conversion detail delivered on checkout completion
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPayload {
    /// Amount the user was charged
    #[serde(default)]
    pub charge_amount: Option<f64>,

    #[serde(default)]
    pub charge_currency: Option<String>,

    /// Access expiration, UNIX timestamp
    #[serde(default)]
    pub expires: Option<i64>,

    /// Promotion ID when a promo code was used
    #[serde(default)]
    pub promotion_id: Option<String>,

    /// Purchased resource ID
    #[serde(default)]
    pub rid: Option<String>,

    /// When access started
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub term_id: Option<String>,

    #[serde(default)]
    pub uid: Option<String>,
}

/// Why the checkout modal closed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseState {
    /// Purchase completed; user now has access
    CheckoutCompleted,

    /// User already had access to the resource
    AlreadyHasAccess,

    /// Gift voucher redeemed
    VoucherRedemptionCompleted,

    /// User dismissed the modal without purchasing
    Close,

    /// Close reason this bridge does not recognize
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosePayload {
    pub state: CloseState,
}

/// A callback event from the external SDK
///
/// The funnel happy path runs `CheckoutSelectTerm → StartCheckout →
/// SubmitPayment → CheckoutStateChange(state2) → CheckoutComplete →
/// CheckoutClose`; login, registration, logout, and meter events arrive
/// independently of it, in an order the SDK controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SdkEvent {
    MeterActive(MeterPayload),
    MeterExpired(MeterPayload),
    Logout,
    LoginSuccess(LoginPayload),
    RegistrationSuccess(RegistrationPayload),
    CheckoutSelectTerm(TermPayload),
    StartCheckout(StartCheckoutPayload),
    SubmitPayment(PaymentPayload),
    CheckoutStateChange(StateChangePayload),
    CheckoutComplete(ConversionPayload),
    CheckoutClose(ClosePayload),
}
