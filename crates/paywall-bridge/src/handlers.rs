//! SDK Event Handlers
//!
//! One handler per SDK callback, each a translation from the typed payload
//! (plus, for the funnel checkpoints, accumulator state) into data layer
//! events. Handlers return navigation decisions instead of executing them;
//! once the host performs a navigation the page context ends.

use std::sync::Arc;

use bridge_core::analytics::{
    AnalyticsSink, CheckoutCompleteSummary, CheckoutUser, DataLayerEvent, LoginUser, MeterSnapshot,
    SelectTermSummary, SignUpUser, StartCheckoutSummary, SubmitPaymentSummary, UserInfoSnapshot,
};
use bridge_core::{CookieJar, KeyValueStore, PageContext};

use crate::config::BridgeConfig;
use crate::ecomm::{EcommEventKind, EcommStateTracker};
use crate::entitlement::EntitlementCache;
use crate::error::Result;
use crate::payloads::{
    ClosePayload, CloseState, ConversionPayload, LoginPayload, MeterPayload, PaymentPayload,
    RegistrationPayload, SdkEvent, StartCheckoutPayload, StateChangePayload, TermPayload,
};
use crate::sdk::SdkClient;

/// Checkout state name for the payment details page
const PAYMENT_DETAILS_STATE: &str = "state2";

/// Checkout state name for the external-account-link receipt
const RECEIPT_STATE: &str = "receipt";

/// A navigation the host must perform
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Change the path, keeping the rest of the location
    Path(String),

    /// Replace the location wholesale (drops query parameters)
    Url(String),

    /// Reload the current page
    Reload,
}

/// Sign-in link surface on the hosting page
///
/// An implementation that finds none of its elements is a no-op.
pub trait SigninSurface: Send + Sync {
    /// Rewrite sign-in links into account links for a signed-in user
    fn show_account_links(&self);

    /// Wire sign-in links to open the login screen
    fn attach_login_trigger(&self);
}

/// Translates SDK events into data layer events
pub struct PaywallBridge {
    config: BridgeConfig,
    page: PageContext,
    aid: String,
    sink: Arc<dyn AnalyticsSink>,
    sdk: Arc<dyn SdkClient>,
    cookies: Arc<dyn CookieJar>,
    tracker: EcommStateTracker,
    entitlements: EntitlementCache,
}

impl PaywallBridge {
    pub fn new(
        config: BridgeConfig,
        page: PageContext,
        aid: impl Into<String>,
        sink: Arc<dyn AnalyticsSink>,
        sdk: Arc<dyn SdkClient>,
        cookies: Arc<dyn CookieJar>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let tracker = EcommStateTracker::new(
            store,
            sink.clone(),
            config.ecomm_storage_key.clone(),
            config.currency.clone(),
        );

        Self {
            config,
            page,
            aid: aid.into(),
            sink,
            sdk,
            cookies,
            tracker,
            entitlements: EntitlementCache::new(),
        }
    }

    pub fn tracker(&self) -> &EcommStateTracker {
        &self.tracker
    }

    pub fn entitlements(&self) -> &EntitlementCache {
        &self.entitlements
    }

    /// Route an SDK event to its handler
    pub async fn dispatch(&self, event: SdkEvent) -> Result<Option<Navigation>> {
        tracing::debug!(event = ?event, "Dispatching SDK event");

        match event {
            SdkEvent::MeterActive(payload) => {
                self.on_meter(payload, false).await?;
                Ok(None)
            }
            SdkEvent::MeterExpired(payload) => {
                self.on_meter(payload, true).await?;
                Ok(None)
            }
            SdkEvent::Logout => {
                self.sink.push(DataLayerEvent::Logout);
                Ok(None)
            }
            SdkEvent::LoginSuccess(payload) => Ok(self.on_login(&payload)),
            SdkEvent::RegistrationSuccess(payload) => {
                self.on_registration(payload);
                Ok(None)
            }
            SdkEvent::CheckoutSelectTerm(payload) => {
                self.on_select_term(payload);
                Ok(None)
            }
            SdkEvent::StartCheckout(payload) => {
                self.on_start_checkout(payload);
                Ok(None)
            }
            SdkEvent::SubmitPayment(payload) => {
                self.on_submit_payment(payload);
                Ok(None)
            }
            SdkEvent::CheckoutStateChange(payload) => {
                self.on_state_change(&payload);
                Ok(None)
            }
            SdkEvent::CheckoutComplete(payload) => {
                self.on_checkout_complete(payload);
                Ok(None)
            }
            SdkEvent::CheckoutClose(payload) => Ok(self.on_checkout_close(&payload)),
        }
    }

    /// Meter telemetry, suppressed for users holding a paid entitlement
    async fn on_meter(&self, payload: MeterPayload, expired: bool) -> Result<()> {
        let has_sub = self
            .entitlements
            .has_paid_access(self.sdk.as_ref(), &self.config.paid_resource_ids)
            .await?;
        if has_sub {
            return Ok(());
        }

        let user = MeterSnapshot {
            meter_name: payload.meter_name,
            meter_type: payload.meter_type,
            incremented: payload.incremented,
            metered_paywall_article_num: payload.views,
            max_views: payload.max_views,
            views_left: payload.views_left,
        };
        self.sink.push(if expired {
            DataLayerEvent::MeterExpired { user }
        } else {
            DataLayerEvent::MeterUpdated { user }
        });
        Ok(())
    }

    fn on_login(&self, payload: &LoginPayload) -> Option<Navigation> {
        self.sink.push(DataLayerEvent::Login {
            user: LoginUser {
                is_site_license_customer: self.institutional_access(),
                user_id: payload.params.uid.clone().unwrap_or_default(),
                login_source: payload.source.clone(),
                login_method: if payload.registration {
                    "registration".into()
                } else {
                    "login".into()
                },
            },
        });

        // Reload to reduce side effects, unless the SDK is about to show
        // its email-confirmation overlay.
        let confirmation_pending = self
            .sdk
            .current_user()
            .is_some_and(|user| user.email_confirmation_required);
        if confirmation_pending {
            None
        } else {
            Some(Navigation::Reload)
        }
    }

    fn on_registration(&self, payload: RegistrationPayload) {
        self.sink.push(DataLayerEvent::SignUp {
            user: SignUpUser {
                user_id: payload.user.sub.unwrap_or_default(),
            },
        });
    }

    fn on_select_term(&self, payload: TermPayload) {
        self.tracker.set_term(&payload.term_id, &payload.term_name);
        self.tracker.flush(EcommEventKind::SelectItem);

        self.sink.push(DataLayerEvent::CheckoutUserSelectTerm {
            user: self.checkout_user(),
            checkout: SelectTermSummary {
                subscription_type: Some(payload.term_id),
                subscription_name: Some(payload.term_name),
                resource_id: payload.resource_id,
                resource_name: payload.resource_name,
            },
        });
    }

    fn on_start_checkout(&self, payload: StartCheckoutPayload) {
        self.sink.push(DataLayerEvent::CheckoutStartCheckout {
            user: self.checkout_user(),
            checkout: StartCheckoutSummary {
                subscription_type: payload.term_id,
                offer_id: payload.offer_id,
            },
        });
    }

    fn on_submit_payment(&self, payload: PaymentPayload) {
        let term = payload.term;
        self.tracker.set_price(term.charge_amount);
        self.tracker.flush(EcommEventKind::AddPaymentInfo);

        let resource = term.resource.unwrap_or_default();
        self.sink.push(DataLayerEvent::CheckoutSubmitPayment {
            user: self.checkout_user(),
            checkout: SubmitPaymentSummary {
                offer_id: payload.offer_id,
                currency_code: term.charge_currency,
                description: term.description,
                amount: Some(term.charge_amount),
                subscription_type: term.term_id,
                subscription_name: term.name,
                total_amount: term.total_amount,
                sku: term.sku,
                resource_id: resource.rid,
                resource_name: resource.name,
                resource_description: resource.description,
                term_type: term.term_type,
                tax_rate: term.tax_rate,
                tax_amount: term.tax_amount,
            },
        });
    }

    fn on_state_change(&self, payload: &StateChangePayload) {
        // External account link submitted on the linking page
        if self.page.path == self.config.account_link_path
            && payload.state_name == RECEIPT_STATE
        {
            self.sink.push(DataLayerEvent::CdsAccountRegistration {
                user: self.checkout_user(),
            });
        }

        if payload.state_name == PAYMENT_DETAILS_STATE {
            if let Some(amount) = payload.term.as_ref().and_then(|term| term.charge_amount) {
                self.tracker.set_price(amount);
            }
            self.tracker.flush(EcommEventKind::BeginCheckout);
        }
    }

    fn on_checkout_complete(&self, payload: ConversionPayload) {
        if let Some(promotion) = payload.promotion_id.clone() {
            self.tracker.set_coupon(promotion);
        }
        self.tracker.flush(EcommEventKind::Purchase);

        self.sink.push(DataLayerEvent::CheckoutComplete {
            checkout: CheckoutCompleteSummary {
                amount: payload.charge_amount,
                currency_code: payload.charge_currency,
                expiration_time: payload.expires,
                promotion_id: payload.promotion_id,
                resource_id: payload.rid,
                start_time: payload.start_at,
                subscription_type: payload.term_id,
                uid: payload.uid,
            },
        });

        // Clear state only after the purchase made it out
        self.tracker.reset();
    }

    fn on_checkout_close(&self, payload: &ClosePayload) -> Option<Navigation> {
        match payload.state {
            CloseState::CheckoutCompleted => {
                self.sink
                    .push(DataLayerEvent::CheckoutModalClosedCheckoutCompleted);
                Some(self.post_checkout_navigation())
            }
            CloseState::AlreadyHasAccess => {
                self.sink
                    .push(DataLayerEvent::CheckoutModalClosedUserAlreadyHasAccess);
                Some(Navigation::Path(self.config.account_path.clone()))
            }
            CloseState::VoucherRedemptionCompleted => {
                self.sink
                    .push(DataLayerEvent::CheckoutModalClosedVoucherRedemptionCompleted);
                // Full href replacement, dropping gifting params
                Some(Navigation::Url(self.config.account_path.clone()))
            }
            CloseState::Close => {
                self.sink
                    .push(DataLayerEvent::CheckoutModalClosedUserClosedModal);
                None
            }
            CloseState::Unknown => {
                tracing::debug!("Unrecognized checkout close state");
                None
            }
        }
    }

    /// Where to send the user after a completed purchase
    ///
    /// Precedence: explicit `redirect` query parameter, then the same-origin
    /// referrer (unless its path is the excluded acquisition page), then the
    /// home path.
    fn post_checkout_navigation(&self) -> Navigation {
        if let Some(redirect) = self.page.query_param("redirect") {
            let path = if redirect.is_empty() {
                self.config.home_path.clone()
            } else {
                redirect
            };
            return Navigation::Path(path);
        }

        if self.page.referrer_is_same_host() {
            if let Some(referrer) = &self.page.referrer {
                if !referrer.path().contains(&self.config.checkout_referrer_exclude) {
                    return Navigation::Url(referrer.to_string());
                }
            }
        }

        Navigation::Path(self.config.home_path.clone())
    }

    /// Point the sign-in surface at the right flow for the current session
    pub fn init_signin(&self, surface: &dyn SigninSurface) {
        if self.sdk.is_user_valid() {
            surface.show_account_links();
        } else {
            surface.attach_login_trigger();
        }
    }

    /// A sign-in link was activated
    pub fn on_signin_click(&self) {
        self.sdk.show_login();
    }

    /// Emit the per-pageview user snapshot
    ///
    /// Logged-in users get their subscription resolved through the access
    /// list first; everyone else is reported with what is already known.
    pub async fn push_user_info(&self) -> Result<()> {
        let current = self.sdk.current_user();
        let is_logged_in = current.is_some();

        let mut user = UserInfoSnapshot {
            user_id: current.map(|user| user.uid).unwrap_or_default(),
            subscription_name: None,
            subscription_type: None,
            is_logged_in,
            is_registered: false,
            is_subscriber: false,
            is_site_license_customer: self.institutional_access(),
        };

        if is_logged_in {
            // Logged in implies registered
            user.is_registered = true;

            let grants = self.sdk.access_list(Some(&self.aid)).await?;
            if let Some(grant) = grants.first() {
                user.is_subscriber = true;
                user.subscription_type = Some(grant.resource.rid.clone());
                user.subscription_name = grant.resource.name.clone();
            }
        }

        self.sink.push(DataLayerEvent::UserInfo { user });
        Ok(())
    }

    fn checkout_user(&self) -> CheckoutUser {
        CheckoutUser {
            user_id: self
                .sdk
                .current_user()
                .map(|user| user.uid)
                .unwrap_or_default(),
        }
    }

    /// Institutional (IP-based) access flag, read fresh from its cookie
    fn institutional_access(&self) -> bool {
        self.cookies
            .get(&self.config.institutional_access_cookie)
            .is_some_and(|value| matches!(value.trim().parse::<i32>(), Ok(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::{LoginParams, RegisteredUser, StateTerm, TermDetail};
    use crate::sdk::MockSdkClient;
    use bridge_core::{MemoryAnalyticsSink, MemoryCookieJar, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingSurface {
        account_links: AtomicUsize,
        login_triggers: AtomicUsize,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                account_links: AtomicUsize::new(0),
                login_triggers: AtomicUsize::new(0),
            }
        }
    }

    impl SigninSurface for RecordingSurface {
        fn show_account_links(&self) {
            self.account_links.fetch_add(1, Ordering::SeqCst);
        }

        fn attach_login_trigger(&self) {
            self.login_triggers.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        sink: Arc<MemoryAnalyticsSink>,
        sdk: Arc<MockSdkClient>,
        cookies: Arc<MemoryCookieJar>,
        bridge: PaywallBridge,
    }

    fn harness(page: PageContext, sdk: MockSdkClient) -> Harness {
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let sdk = Arc::new(sdk);
        let cookies = Arc::new(MemoryCookieJar::new());
        let bridge = PaywallBridge::new(
            BridgeConfig::default(),
            page,
            "FU52w9tupu",
            sink.clone(),
            sdk.clone(),
            cookies.clone(),
            Arc::new(MemoryStore::new()),
        );
        Harness {
            sink,
            sdk,
            cookies,
            bridge,
        }
    }

    fn meter_payload() -> MeterPayload {
        MeterPayload {
            meter_name: "DefaultMeter".into(),
            meter_type: "metered".into(),
            incremented: true,
            views: 2,
            max_views: 5,
            views_left: 3,
        }
    }

    #[tokio::test]
    async fn test_meter_events_suppressed_for_subscribers() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new().with_user("usr_1").with_grant("DIGITAL", None),
        );

        h.bridge
            .dispatch(SdkEvent::MeterActive(meter_payload()))
            .await
            .unwrap();
        h.bridge
            .dispatch(SdkEvent::MeterExpired(meter_payload()))
            .await
            .unwrap();

        assert!(h.sink.is_empty());
        // Entitlement resolved once, then cached
        assert_eq!(h.sdk.access_calls(), 1);
    }

    #[tokio::test]
    async fn test_meter_events_emitted_for_non_subscribers() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );

        h.bridge
            .dispatch(SdkEvent::MeterActive(meter_payload()))
            .await
            .unwrap();

        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        let DataLayerEvent::MeterUpdated { user } = &events[0] else {
            panic!("expected meter_updated");
        };
        assert_eq!(user.metered_paywall_article_num, 2);
        assert_eq!(user.views_left, 3);
    }

    #[tokio::test]
    async fn test_login_emits_and_reloads() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new().with_user("usr_1"),
        );
        h.cookies.set("_pc_instaccess", "1", None);

        let nav = h
            .bridge
            .dispatch(SdkEvent::LoginSuccess(LoginPayload {
                params: LoginParams {
                    uid: Some("usr_1".into()),
                },
                source: Some("PIANOID".into()),
                registration: false,
            }))
            .await
            .unwrap();

        assert_eq!(nav, Some(Navigation::Reload));
        let DataLayerEvent::Login { user } = &h.sink.events()[0] else {
            panic!("expected login");
        };
        assert_eq!(user.login_method, "login");
        assert!(user.is_site_license_customer);
    }

    #[tokio::test]
    async fn test_login_skips_reload_pending_email_confirmation() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new().with_user("usr_1"),
        );
        h.sdk.set_email_confirmation_required(true);

        let nav = h
            .bridge
            .dispatch(SdkEvent::LoginSuccess(LoginPayload::default()))
            .await
            .unwrap();
        assert_eq!(nav, None);
    }

    #[tokio::test]
    async fn test_logout_emits_event() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );

        let nav = h.bridge.dispatch(SdkEvent::Logout).await.unwrap();

        assert_eq!(nav, None);
        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], DataLayerEvent::Logout);
    }

    #[tokio::test]
    async fn test_registration_emits_sign_up() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );

        h.bridge
            .dispatch(SdkEvent::RegistrationSuccess(RegistrationPayload {
                user: RegisteredUser {
                    sub: Some("usr_new".into()),
                },
            }))
            .await
            .unwrap();

        let DataLayerEvent::SignUp { user } = &h.sink.events()[0] else {
            panic!("expected sign_up");
        };
        assert_eq!(user.user_id, "usr_new");
    }

    #[tokio::test]
    async fn test_happy_path_funnel() {
        let h = harness(
            PageContext::new("www.scientificamerican.com").with_query("redirect=/article/42"),
            MockSdkClient::new().with_user("usr_1"),
        );

        h.bridge
            .dispatch(SdkEvent::CheckoutSelectTerm(TermPayload {
                term_id: "TERM1".into(),
                term_name: "Digital Annual".into(),
                resource_id: Some("DIGITAL".into()),
                resource_name: Some("Digital Subscription".into()),
            }))
            .await
            .unwrap();

        h.bridge
            .dispatch(SdkEvent::StartCheckout(StartCheckoutPayload {
                term_id: Some("TERM1".into()),
                offer_id: Some("OFFER1".into()),
            }))
            .await
            .unwrap();

        h.bridge
            .dispatch(SdkEvent::CheckoutStateChange(StateChangePayload {
                state_name: "state2".into(),
                term: Some(StateTerm {
                    charge_amount: Some(49.99),
                }),
            }))
            .await
            .unwrap();

        h.bridge
            .dispatch(SdkEvent::SubmitPayment(PaymentPayload {
                offer_id: Some("OFFER1".into()),
                term: TermDetail {
                    charge_amount: 49.99,
                    charge_currency: Some("USD".into()),
                    term_id: Some("TERM1".into()),
                    name: Some("Digital Annual".into()),
                    ..TermDetail::default()
                },
            }))
            .await
            .unwrap();

        h.bridge
            .dispatch(SdkEvent::CheckoutComplete(ConversionPayload {
                charge_amount: Some(49.99),
                charge_currency: Some("USD".into()),
                promotion_id: Some("SAVE10".into()),
                term_id: Some("TERM1".into()),
                uid: Some("usr_1".into()),
                ..ConversionPayload::default()
            }))
            .await
            .unwrap();

        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::CheckoutCompleted,
            }))
            .await
            .unwrap();
        assert_eq!(nav, Some(Navigation::Path("/article/42".into())));

        let names: Vec<_> = h.sink.events().iter().map(DataLayerEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "select_item",
                "checkoutUserSelectTerm",
                "checkoutStartCheckout",
                "begin_checkout",
                "add_payment_info",
                "checkoutSubmitPayment",
                "purchase",
                "checkoutComplete",
                "checkoutModalClosed_checkoutCompleted",
            ]
        );

        // Purchase flush carried the accumulated facts
        let DataLayerEvent::Purchase(payload) = &h.sink.events()[6] else {
            panic!("expected purchase");
        };
        assert_eq!(payload.ecommerce.value, Some(49.99));
        assert_eq!(payload.ecommerce.coupon.as_deref(), Some("SAVE10"));
        assert_eq!(payload.ecommerce.items[0].item_id.as_deref(), Some("TERM1"));

        // Accumulator cleared after purchase
        assert_eq!(h.bridge.tracker().state(), crate::ecomm::CheckoutState::default());
    }

    #[tokio::test]
    async fn test_close_redirect_precedence() {
        // Same-origin referrer wins when no redirect param exists
        let page = PageContext::new("www.scientificamerican.com")
            .with_referrer("https://www.scientificamerican.com/article/energy/");
        let h = harness(page, MockSdkClient::new());
        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::CheckoutCompleted,
            }))
            .await
            .unwrap();
        assert_eq!(
            nav,
            Some(Navigation::Url(
                "https://www.scientificamerican.com/article/energy/".into()
            ))
        );

        // Excluded acquisition-page referrer falls back to home
        let page = PageContext::new("www.scientificamerican.com")
            .with_referrer("https://www.scientificamerican.com/getsciam/");
        let h = harness(page, MockSdkClient::new());
        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::CheckoutCompleted,
            }))
            .await
            .unwrap();
        assert_eq!(nav, Some(Navigation::Path("/".into())));

        // Cross-origin referrer falls back to home
        let page = PageContext::new("www.scientificamerican.com")
            .with_referrer("https://news.example.com/story");
        let h = harness(page, MockSdkClient::new());
        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::CheckoutCompleted,
            }))
            .await
            .unwrap();
        assert_eq!(nav, Some(Navigation::Path("/".into())));
    }

    #[tokio::test]
    async fn test_close_variants() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );

        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::AlreadyHasAccess,
            }))
            .await
            .unwrap();
        assert_eq!(nav, Some(Navigation::Path("/account/".into())));

        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::VoucherRedemptionCompleted,
            }))
            .await
            .unwrap();
        assert_eq!(nav, Some(Navigation::Url("/account/".into())));

        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::Close,
            }))
            .await
            .unwrap();
        assert_eq!(nav, None);

        let nav = h
            .bridge
            .dispatch(SdkEvent::CheckoutClose(ClosePayload {
                state: CloseState::Unknown,
            }))
            .await
            .unwrap();
        assert_eq!(nav, None);

        let names: Vec<_> = h.sink.events().iter().map(DataLayerEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "checkoutModalClosed_userAlreadyHasAccess",
                "checkoutModalClosed_voucherRedemptionCompleted",
                "checkoutModalClosed_userClosedModal",
            ]
        );
    }

    #[tokio::test]
    async fn test_cds_registration_only_on_link_page_receipt() {
        let h = harness(
            PageContext::new("www.scientificamerican.com").with_path("/account/link/"),
            MockSdkClient::new().with_user("usr_1"),
        );
        h.bridge
            .dispatch(SdkEvent::CheckoutStateChange(StateChangePayload {
                state_name: "receipt".into(),
                term: None,
            }))
            .await
            .unwrap();

        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "cds_account_registration");

        // Off the link page the same state emits nothing
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );
        h.bridge
            .dispatch(SdkEvent::CheckoutStateChange(StateChangePayload {
                state_name: "receipt".into(),
                term: None,
            }))
            .await
            .unwrap();
        assert!(h.sink.is_empty());
    }

    #[tokio::test]
    async fn test_user_info_for_subscriber() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new()
                .with_user("usr_1")
                .with_grant("DIGITAL", Some("Digital Subscription")),
        );

        h.bridge.push_user_info().await.unwrap();

        let DataLayerEvent::UserInfo { user } = &h.sink.events()[0] else {
            panic!("expected userInfo");
        };
        assert!(user.is_logged_in);
        assert!(user.is_registered);
        assert!(user.is_subscriber);
        assert_eq!(user.subscription_type.as_deref(), Some("DIGITAL"));
        assert_eq!(user.subscription_name.as_deref(), Some("Digital Subscription"));
    }

    #[tokio::test]
    async fn test_user_info_for_anonymous_visitor() {
        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );

        h.bridge.push_user_info().await.unwrap();

        let DataLayerEvent::UserInfo { user } = &h.sink.events()[0] else {
            panic!("expected userInfo");
        };
        assert!(!user.is_logged_in);
        assert!(!user.is_registered);
        assert!(!user.is_subscriber);
        assert_eq!(user.user_id, "");
        // No access lookup for anonymous visitors
        assert_eq!(h.sdk.access_calls(), 0);
    }

    #[tokio::test]
    async fn test_signin_surface_wiring() {
        let surface = RecordingSurface::new();

        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new().with_user("usr_1"),
        );
        h.bridge.init_signin(&surface);
        assert_eq!(surface.account_links.load(Ordering::SeqCst), 1);

        let h = harness(
            PageContext::new("www.scientificamerican.com"),
            MockSdkClient::new(),
        );
        h.bridge.init_signin(&surface);
        assert_eq!(surface.login_triggers.load(Ordering::SeqCst), 1);

        h.bridge.on_signin_click();
        assert_eq!(h.sdk.login_shows(), 1);
    }
}
