//! Named, payload-less signals and the process-wide bus that delivers them.
//!
//! Emitters never hold references to receivers. A permission screen and the
//! keyboard service only share action identifiers, which is what lets them
//! live in different process contexts.

mod bus;

pub use bus::{SignalBus, SignalReceiver, SignalSender, Subscription, SubscriptionId};

use serde::{Deserialize, Serialize};

pub const ACTION_NOTIFICATION_GRANTED: &str =
    "org.pocketworkstation.pckeyboard.NOTIFICATION_GRANTED";
pub const ACTION_NOTIFICATION_DENIED: &str =
    "org.pocketworkstation.pckeyboard.NOTIFICATION_DENIED";
pub const ACTION_SHOW: &str = "org.pocketworkstation.pckeyboard.SHOW";
pub const ACTION_SETTINGS: &str = "org.pocketworkstation.pckeyboard.SETTINGS";

/// The closed set of action identifiers this crate emits or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NotificationGranted,
    NotificationDenied,
    Show,
    Settings,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::NotificationGranted => ACTION_NOTIFICATION_GRANTED,
            Action::NotificationDenied => ACTION_NOTIFICATION_DENIED,
            Action::Show => ACTION_SHOW,
            Action::Settings => ACTION_SETTINGS,
        }
    }

    /// Exact match only; identifiers are compared byte for byte across components.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            ACTION_NOTIFICATION_GRANTED => Some(Action::NotificationGranted),
            ACTION_NOTIFICATION_DENIED => Some(Action::NotificationDenied),
            ACTION_SHOW => Some(Action::Show),
            ACTION_SETTINGS => Some(Action::Settings),
            _ => None,
        }
    }
}

/// An immutable signal. The identifier is kept verbatim so that signals from
/// newer emitters survive the trip and are ignored by receivers, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    action: String,
}

impl Signal {
    pub fn new(action: Action) -> Self {
        Self {
            action: action.as_str().to_string(),
        }
    }

    pub fn from_identifier(identifier: impl Into<String>) -> Self {
        Self {
            action: identifier.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.action
    }

    pub fn action(&self) -> Option<Action> {
        Action::from_identifier(&self.action)
    }
}

impl From<Action> for Signal {
    fn from(action: Action) -> Self {
        Signal::new(action)
    }
}

/// Set of actions a registration listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFilter {
    actions: Vec<Action>,
}

impl ActionFilter {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut filter = Self {
            actions: Vec::new(),
        };
        for action in actions {
            if !filter.actions.contains(&action) {
                filter.actions.push(action);
            }
        }
        filter
    }

    /// GRANTED and DENIED, the two outcomes of a notification permission request.
    pub fn permission_outcomes() -> Self {
        Self::new([Action::NotificationGranted, Action::NotificationDenied])
    }

    /// SHOW and SETTINGS, delivered by taps on the keyboard notification.
    pub fn keyboard_actions() -> Self {
        Self::new([Action::Show, Action::Settings])
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        signal
            .action()
            .is_some_and(|action| self.actions.contains(&action))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}
