//! E-commerce State Accumulator
//!
//! Checkout facts arrive piecemeal across independent SDK callbacks (term
//! here, price there, coupon at the end), so they are collected as they
//! appear and flushed as one consolidated ecommerce event when a funnel
//! checkpoint needs it. The record is persisted after every mutation so a
//! page reload resumes a purchase flow in progress.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use bridge_core::KeyValueStore;
use bridge_core::analytics::{
    AnalyticsSink, CheckoutSummary, DataLayerEvent, Ecommerce, EcommerceItem, EcommercePayload,
};

/// Partially-known checkout facts
///
/// Fields are set independently and overwritten without merging; any field
/// may still be absent at flush time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

/// Funnel checkpoint an accumulator flush is emitted for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcommEventKind {
    SelectItem,
    BeginCheckout,
    AddPaymentInfo,
    Purchase,
}

/// Accumulates checkout facts and emits consolidated ecommerce events
pub struct EcommStateTracker {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn AnalyticsSink>,
    key: String,
    currency: String,
    state: Mutex<CheckoutState>,
}

impl EcommStateTracker {
    /// Restore from the persisted snapshot; absent or unparseable data
    /// yields an empty record.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn AnalyticsSink>,
        key: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let state = store
            .get(&key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Self {
            store,
            sink,
            key,
            currency: currency.into(),
            state: Mutex::new(state),
        }
    }

    fn persist(&self, state: &CheckoutState) {
        if let Ok(raw) = serde_json::to_string(state) {
            self.store.set(&self.key, &raw);
        }
    }

    pub fn set_term(&self, term_id: impl Into<String>, term_name: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.term_id = Some(term_id.into());
        state.term_name = Some(term_name.into());
        self.persist(&state);
    }

    pub fn set_price(&self, value: f64) {
        let mut state = self.state.lock().unwrap();
        state.value = Some(value);
        self.persist(&state);
    }

    pub fn set_coupon(&self, coupon: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.coupon = Some(coupon.into());
        self.persist(&state);
    }

    /// Replace the record with an empty one; reserved for the
    /// purchase-completion path.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        *state = CheckoutState::default();
        self.persist(&state);
    }

    /// Current record snapshot
    pub fn state(&self) -> CheckoutState {
        self.state.lock().unwrap().clone()
    }

    /// Emit the collected facts as one ecommerce event
    ///
    /// Never fails on an empty record, and never clears state; clearing is
    /// an explicit, separate step.
    pub fn flush(&self, kind: EcommEventKind) {
        let state = self.state.lock().unwrap().clone();

        let payload = EcommercePayload {
            ecommerce: Ecommerce {
                currency: self.currency.clone(),
                value: state.value,
                coupon: state.coupon,
                items: vec![EcommerceItem {
                    item_id: state.term_id.clone(),
                    item_name: state.term_name.clone(),
                    price: state.value,
                    quantity: 1,
                }],
            },
            checkout: CheckoutSummary {
                amount: state.value,
                subscription_type: state.term_id,
                subscription_name: state.term_name,
            },
        };

        let event = match kind {
            EcommEventKind::SelectItem => DataLayerEvent::SelectItem(payload),
            EcommEventKind::BeginCheckout => DataLayerEvent::BeginCheckout(payload),
            EcommEventKind::AddPaymentInfo => DataLayerEvent::AddPaymentInfo(payload),
            EcommEventKind::Purchase => DataLayerEvent::Purchase(payload),
        };
        self.sink.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::{MemoryAnalyticsSink, MemoryStore};

    const KEY: &str = "_ecommStateTrackerData";

    fn tracker(
        store: &Arc<MemoryStore>,
        sink: &Arc<MemoryAnalyticsSink>,
    ) -> EcommStateTracker {
        EcommStateTracker::new(store.clone(), sink.clone(), KEY, "USD")
    }

    #[test]
    fn test_setters_are_last_writer_wins() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let tracker = tracker(&store, &sink);

        tracker.set_price(19.99);
        tracker.set_term("TERM1", "Digital Monthly");
        tracker.set_coupon("SAVE10");
        tracker.set_term("TERM2", "Digital Annual");
        tracker.set_price(49.99);

        let state = tracker.state();
        assert_eq!(state.term_id.as_deref(), Some("TERM2"));
        assert_eq!(state.term_name.as_deref(), Some("Digital Annual"));
        assert_eq!(state.value, Some(49.99));
        assert_eq!(state.coupon.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_every_mutation_persists() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let tracker = tracker(&store, &sink);

        tracker.set_term("TERM1", "Digital Monthly");
        tracker.set_price(19.99);

        // A fresh tracker over the same store resumes the flow
        let resumed = EcommStateTracker::new(store.clone(), sink.clone(), KEY, "USD");
        assert_eq!(resumed.state(), tracker.state());
    }

    #[test]
    fn test_unparseable_snapshot_yields_empty_record() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "{not json");
        let sink = Arc::new(MemoryAnalyticsSink::new());

        let tracker = tracker(&store, &sink);
        assert_eq!(tracker.state(), CheckoutState::default());
    }

    #[test]
    fn test_flush_on_empty_record_never_fails() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let tracker = tracker(&store, &sink);

        tracker.reset();
        tracker.flush(EcommEventKind::SelectItem);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let DataLayerEvent::SelectItem(payload) = &events[0] else {
            panic!("expected select_item, got {}", events[0].name());
        };
        assert_eq!(payload.ecommerce.value, None);
        assert_eq!(payload.ecommerce.coupon, None);
        assert_eq!(payload.ecommerce.items[0].item_id, None);
        assert_eq!(payload.ecommerce.items[0].quantity, 1);
    }

    #[test]
    fn test_flush_does_not_clear_state() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let tracker = tracker(&store, &sink);

        tracker.set_term("TERM1", "Digital Monthly");
        tracker.flush(EcommEventKind::SelectItem);
        tracker.flush(EcommEventKind::BeginCheckout);

        assert_eq!(tracker.state().term_id.as_deref(), Some("TERM1"));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_reset_clears_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAnalyticsSink::new());
        let tracker = tracker(&store, &sink);

        tracker.set_coupon("SAVE10");
        tracker.reset();

        let resumed = EcommStateTracker::new(store.clone(), sink, KEY, "USD");
        assert_eq!(resumed.state(), CheckoutState::default());
    }
}
