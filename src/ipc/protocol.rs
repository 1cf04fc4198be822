//! Messages exchanged between the headless host and its driver.
//!
//! Messages are newline-delimited JSON.

use serde::{Deserialize, Serialize};

use crate::capability::Locale;
use crate::notification::{KeyboardNotification, NotificationChannel};
use crate::permission::{GrantResult, Permission};

// ============================================================================
// Host Events (host → driver)
// ============================================================================

/// Serialized as JSON with an `"event"` tag field for type discrimination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum HostEvent {
    /// Sent once on startup with the probed capabilities
    #[serde(rename = "ready")]
    Ready {
        version: String,
        sdk_level: u32,
        show_path: String,
        locale_accessor: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prefs_path: Option<String>,
        keyboard_notification: bool,
    },

    /// The permission screen asked the user
    #[serde(rename = "permission_requested")]
    PermissionRequested {
        permissions: Vec<Permission>,
        request_code: i32,
    },

    /// A result the permission screen did not ask for went to the default handler
    #[serde(rename = "permission_default_handler")]
    PermissionDefaultHandler { request_code: i32 },

    /// The permission screen closed itself
    #[serde(rename = "requester_finished")]
    RequesterFinished,

    /// A signal was put on the bus by a host command (`broadcast` or an
    /// answered permission screen). Signals posted from inside the service are
    /// not echoed; only their effects appear as other events.
    #[serde(rename = "signal_emitted")]
    SignalEmitted { action: String },

    #[serde(rename = "preference_written")]
    PreferenceWritten { key: String, value: Option<bool> },

    /// The IME asked to show its own window
    #[serde(rename = "show_self")]
    ShowSelf { flags: u32 },

    /// Legacy show through the input-method manager
    #[serde(rename = "show_soft_input")]
    ShowSoftInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        flags: u32,
    },

    #[serde(rename = "settings_launched")]
    SettingsLaunched { origin: String, new_task: bool },

    #[serde(rename = "notification_channel_created")]
    NotificationChannelCreated { channel: NotificationChannel },

    #[serde(rename = "notification_posted")]
    NotificationPosted { notification: KeyboardNotification },

    #[serde(rename = "notification_cancelled")]
    NotificationCancelled { id: i32 },

    #[serde(rename = "locale")]
    CurrentLocale { locale: Locale, accessor: String },

    /// Snapshot requested with `get_state`
    #[serde(rename = "state")]
    State {
        keyboard_notification: Option<bool>,
        notification_visible: bool,
        permission_granted: bool,
        awaiting_permission: bool,
        token_attached: bool,
        registrations: usize,
    },

    /// Error (recoverable or fatal)
    #[serde(rename = "error")]
    Error { message: String, recoverable: bool },
}

// ============================================================================
// Host Commands (driver → host)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd")]
pub enum HostCommand {
    /// Deliver a system-wide signal, e.g. a notification tap
    #[serde(rename = "broadcast")]
    Broadcast { action: String },

    /// The user answered the permission dialog
    #[serde(rename = "permission_result")]
    PermissionResult {
        request_code: i32,
        #[serde(default)]
        permissions: Vec<Permission>,
        #[serde(default)]
        grant_results: Vec<GrantResult>,
    },

    /// Settings surface changed a boolean preference
    #[serde(rename = "set_preference")]
    SetPreference { key: String, value: bool },

    /// Host attached the IME window token
    #[serde(rename = "attach_token")]
    AttachToken { token: String },

    #[serde(rename = "get_locale")]
    GetLocale,

    #[serde(rename = "set_locale")]
    SetLocale { locale: String },

    #[serde(rename = "get_state")]
    GetState,

    /// Destroy the IME service and exit
    #[serde(rename = "shutdown")]
    Shutdown,
}
