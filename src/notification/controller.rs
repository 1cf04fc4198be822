use std::sync::Arc;

use super::{KeyboardNotification, NotificationChannel, NotificationPoster, NOTIFICATION_ONGOING_ID};
use crate::capability::HostCapabilities;
use crate::ime::{ActionSignalListener, ImeService, KeyboardPresenter, SettingsLauncher};
use crate::log_debug;
use crate::permission::{Permission, PermissionLauncher, PermissionOutcomeListener};
use crate::prefs::{PreferenceStore, PREF_KEYBOARD_NOTIFICATION};
use crate::signal::{SignalBus, Subscription, SubscriptionId};

/// Collaborators the controller needs from the IME service and the host.
pub struct NotificationDeps {
    pub bus: SignalBus,
    pub prefs: Arc<dyn PreferenceStore>,
    pub permissions: Arc<dyn PermissionLauncher>,
    pub poster: Arc<dyn NotificationPoster>,
    pub ime: Arc<dyn ImeService>,
    pub presenter: KeyboardPresenter,
    pub settings: Arc<dyn SettingsLauncher>,
}

/// What a call to [`NotificationController::set_notification`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChange {
    /// Outcome listener registered and the permission screen launched.
    PermissionRequested,
    /// A permission request is already in flight.
    AwaitingPermission,
    Posted,
    Cancelled,
    Unchanged,
}

/// IME-service side of the keyboard notification: permission gating,
/// posting and cancelling, and the action-listener registration.
pub struct NotificationController {
    caps: HostCapabilities,
    deps: NotificationDeps,
    default_enabled: bool,
    action_subscription: Option<Subscription>,
    pending_outcome: Option<SubscriptionId>,
}

impl NotificationController {
    pub fn new(caps: HostCapabilities, deps: NotificationDeps, default_enabled: bool) -> Self {
        Self {
            caps,
            deps,
            default_enabled,
            action_subscription: None,
            pending_outcome: None,
        }
    }

    /// Stored decision, or the configured default when none is stored yet.
    pub fn keyboard_notification_enabled(&self) -> bool {
        self.deps
            .prefs
            .get_bool(PREF_KEYBOARD_NOTIFICATION)
            .unwrap_or(self.default_enabled)
    }

    pub fn on_create(&mut self) -> NotificationChange {
        let enabled = self.keyboard_notification_enabled();
        self.set_notification(enabled)
    }

    pub fn on_preference_changed(&mut self, key: &str) -> NotificationChange {
        if key != PREF_KEYBOARD_NOTIFICATION {
            return NotificationChange::Unchanged;
        }
        let enabled = self.keyboard_notification_enabled();
        self.set_notification(enabled)
    }

    pub fn set_notification(&mut self, visible: bool) -> NotificationChange {
        if visible
            && self.caps.requires_notification_permission()
            && !self.deps.permissions.is_granted(Permission::PostNotifications)
        {
            return self.request_permission();
        }

        if visible {
            if self.action_subscription.is_some() {
                return NotificationChange::Unchanged;
            }
            if self.caps.supports_notification_channels() {
                self.deps.poster.create_channel(&NotificationChannel::keyboard());
            }
            let listener = ActionSignalListener::new(
                Arc::clone(&self.deps.ime),
                self.deps.presenter.clone(),
                Arc::clone(&self.deps.settings),
            );
            self.action_subscription = Some(listener.register(&self.deps.bus));
            self.deps.poster.post(&KeyboardNotification::ongoing());
            log_debug("keyboard notification posted");
            NotificationChange::Posted
        } else if let Some(subscription) = self.action_subscription.take() {
            self.deps.poster.cancel(NOTIFICATION_ONGOING_ID);
            subscription.dispose();
            log_debug("keyboard notification cancelled");
            NotificationChange::Cancelled
        } else {
            NotificationChange::Unchanged
        }
    }

    fn request_permission(&mut self) -> NotificationChange {
        if self.awaiting_permission() {
            return NotificationChange::AwaitingPermission;
        }
        let listener = PermissionOutcomeListener::new(Arc::clone(&self.deps.prefs));
        self.pending_outcome = Some(listener.register(&self.deps.bus));
        self.deps.permissions.launch_request();
        log_debug("notification permission missing; request launched");
        NotificationChange::PermissionRequested
    }

    /// True while an outcome listener registered by this controller is still live.
    pub fn awaiting_permission(&self) -> bool {
        self.pending_outcome
            .is_some_and(|id| self.deps.bus.is_registered(id))
    }

    pub fn is_showing(&self) -> bool {
        self.action_subscription.is_some()
    }

    /// The service is going away: stop reacting to notification taps.
    pub fn on_destroy(&mut self) {
        if let Some(subscription) = self.action_subscription.take() {
            subscription.dispose();
            log_debug("action listener disposed on destroy");
        }
    }
}
