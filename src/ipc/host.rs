use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::protocol::HostEvent;
use super::session::EventSink;
use crate::ime::{
    ContextId, ImeService, InputMethodManager, LaunchFlags, SettingsLauncher, ShowFlags,
    WindowToken, WindowTokenSlot,
};
use crate::log_debug;
use crate::notification::{KeyboardNotification, NotificationChannel, NotificationPoster};
use crate::permission::{GrantResult, Permission, PermissionHost, PermissionLauncher};

pub(super) struct HostIme {
    context: ContextId,
    token: WindowTokenSlot,
    events: EventSink,
}

impl HostIme {
    pub(super) fn new(session_id: &str, events: EventSink) -> Self {
        Self {
            context: ContextId::new(format!("ime:{session_id}")),
            token: WindowTokenSlot::new(),
            events,
        }
    }

    pub(super) fn attach_token(&self, token: WindowToken) -> bool {
        self.token.attach(token)
    }
}

impl ImeService for HostIme {
    fn request_show_self(&self, flags: ShowFlags) {
        self.events.send_event(HostEvent::ShowSelf {
            flags: flags.bits(),
        });
    }

    fn window_token(&self) -> Option<WindowToken> {
        self.token.get()
    }

    fn context(&self) -> ContextId {
        self.context.clone()
    }
}

pub(super) struct HostInputMethodManager {
    pub(super) events: EventSink,
}

impl InputMethodManager for HostInputMethodManager {
    fn show_soft_input_from_input_method(&self, token: Option<&WindowToken>, flags: ShowFlags) {
        self.events.send_event(HostEvent::ShowSoftInput {
            token: token.map(|t| t.as_str().to_string()),
            flags: flags.bits(),
        });
    }
}

pub(super) struct HostSettings {
    pub(super) events: EventSink,
}

impl SettingsLauncher for HostSettings {
    fn launch_settings(&self, origin: &ContextId, flags: LaunchFlags) {
        self.events.send_event(HostEvent::SettingsLaunched {
            origin: origin.to_string(),
            new_task: flags.is_new_task(),
        });
    }
}

pub(super) struct HostNotifications {
    pub(super) events: EventSink,
}

impl NotificationPoster for HostNotifications {
    fn create_channel(&self, channel: &NotificationChannel) {
        self.events.send_event(HostEvent::NotificationChannelCreated {
            channel: channel.clone(),
        });
    }

    fn post(&self, notification: &KeyboardNotification) {
        self.events.send_event(HostEvent::NotificationPosted {
            notification: notification.clone(),
        });
    }

    fn cancel(&self, id: i32) {
        self.events.send_event(HostEvent::NotificationCancelled { id });
    }
}

/// Host permission state plus the launcher for the permission screen. The
/// screen itself is started by the main loop.
pub(super) struct HostPermissions {
    granted: Arc<AtomicBool>,
    launch_tx: Sender<()>,
}

impl HostPermissions {
    pub(super) fn new(granted: Arc<AtomicBool>, launch_tx: Sender<()>) -> Self {
        Self { granted, launch_tx }
    }
}

impl PermissionLauncher for HostPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        match permission {
            Permission::PostNotifications => self.granted.load(Ordering::SeqCst),
        }
    }

    fn launch_request(&self) {
        if self.launch_tx.send(()).is_err() {
            log_debug("permission screen launch dropped; host loop gone");
        }
    }
}

/// The permission screen's window on the host.
pub(super) struct PermissionScreen {
    pub(super) events: EventSink,
}

impl PermissionHost for PermissionScreen {
    fn request_permissions(&mut self, permissions: &[Permission], request_code: i32) {
        self.events.send_event(HostEvent::PermissionRequested {
            permissions: permissions.to_vec(),
            request_code,
        });
    }

    fn default_permissions_result(
        &mut self,
        request_code: i32,
        _permissions: &[Permission],
        _grant_results: &[GrantResult],
    ) {
        self.events
            .send_event(HostEvent::PermissionDefaultHandler { request_code });
    }

    fn finish(&mut self) {
        self.events.send_event(HostEvent::RequesterFinished);
    }
}
