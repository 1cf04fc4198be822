use std::sync::Arc;

use crate::log_debug;
use crate::prefs::{PreferenceStore, PREF_KEYBOARD_NOTIFICATION};
use crate::signal::{Action, ActionFilter, Signal, SignalBus, SignalReceiver, SubscriptionId};

/// Persists the permission decision. Registered one-shot: the bus disposes it
/// after the first GRANTED or DENIED it sees.
pub struct PermissionOutcomeListener {
    prefs: Arc<dyn PreferenceStore>,
}

impl PermissionOutcomeListener {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    pub fn register(self, bus: &SignalBus) -> SubscriptionId {
        bus.subscribe_once(ActionFilter::permission_outcomes(), self)
    }
}

impl SignalReceiver for PermissionOutcomeListener {
    fn on_receive(&mut self, signal: &Signal) {
        let granted = match signal.action() {
            Some(Action::NotificationGranted) => true,
            Some(Action::NotificationDenied) => false,
            _ => return,
        };
        log_debug(&format!("permission outcome received, granted={granted}"));
        if let Err(err) = self.prefs.put_bool(PREF_KEYBOARD_NOTIFICATION, granted) {
            log_debug(&format!("failed to persist permission decision: {err:#}"));
        }
    }
}
