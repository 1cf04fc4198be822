//! The ongoing "show keyboard" notification and the controller that owns it.

mod controller;

pub use controller::{NotificationChange, NotificationController, NotificationDeps};

use serde::Serialize;

use crate::signal::{ACTION_SETTINGS, ACTION_SHOW};

pub const NOTIFICATION_CHANNEL_ID: &str = "PCKeyboard";
pub const NOTIFICATION_ONGOING_ID: i32 = 1001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationChannel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub importance: Importance,
}

impl NotificationChannel {
    pub fn keyboard() -> Self {
        Self {
            id: NOTIFICATION_CHANNEL_ID,
            name: "Keyboard notification",
            description: "Persistent notification for opening the keyboard",
            importance: Importance::Low,
        }
    }
}

/// Content of the ongoing notification. Taps broadcast SHOW, the action
/// button broadcasts SETTINGS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardNotification {
    pub id: i32,
    pub channel_id: &'static str,
    pub ticker: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub content_action: &'static str,
    pub settings_action: &'static str,
    pub settings_label: &'static str,
    pub ongoing: bool,
    pub auto_cancel: bool,
    pub priority: Importance,
}

impl KeyboardNotification {
    pub fn ongoing() -> Self {
        Self {
            id: NOTIFICATION_ONGOING_ID,
            channel_id: NOTIFICATION_CHANNEL_ID,
            ticker: "Keyboard notification enabled.",
            title: "Show Hacker's Keyboard",
            text: "Select this to open the keyboard. Disable in settings.",
            content_action: ACTION_SHOW,
            settings_action: ACTION_SETTINGS,
            settings_label: "Settings",
            ongoing: true,
            auto_cancel: false,
            priority: Importance::Default,
        }
    }
}

/// Host notification manager.
pub trait NotificationPoster: Send + Sync {
    fn create_channel(&self, channel: &NotificationChannel);
    fn post(&self, notification: &KeyboardNotification);
    fn cancel(&self, id: i32);
}
