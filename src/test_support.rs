//! Recording fakes for the host collaborators.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ime::{
    ContextId, ImeService, InputMethodManager, LaunchFlags, SettingsLauncher, ShowFlags,
    WindowToken,
};
use crate::notification::{KeyboardNotification, NotificationChannel, NotificationPoster};
use crate::permission::{Permission, PermissionLauncher};
use crate::prefs::PreferenceStore;

#[derive(Default)]
pub(crate) struct RecordingStore {
    values: Mutex<HashMap<String, bool>>,
    pub(crate) writes: Mutex<Vec<(String, bool)>>,
    pub(crate) fail_writes: AtomicBool,
}

impl RecordingStore {
    pub(crate) fn write_log(&self) -> Vec<(String, bool)> {
        self.writes.lock().unwrap().clone()
    }
}

impl PreferenceStore for RecordingStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().unwrap().get(key).copied()
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.writes.lock().unwrap().push((key.to_string(), value));
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

pub(crate) struct RecordingIme {
    pub(crate) show_self: Mutex<Vec<ShowFlags>>,
    pub(crate) token: Option<WindowToken>,
}

impl RecordingIme {
    pub(crate) fn with_token(token: &str) -> Self {
        Self {
            show_self: Mutex::new(Vec::new()),
            token: Some(WindowToken::new(token)),
        }
    }
}

impl ImeService for RecordingIme {
    fn request_show_self(&self, flags: ShowFlags) {
        self.show_self.lock().unwrap().push(flags);
    }

    fn window_token(&self) -> Option<WindowToken> {
        self.token.clone()
    }

    fn context(&self) -> ContextId {
        ContextId::new("ime:test")
    }
}

#[derive(Default)]
pub(crate) struct RecordingImm {
    pub(crate) calls: Mutex<Vec<(Option<WindowToken>, ShowFlags)>>,
}

impl InputMethodManager for RecordingImm {
    fn show_soft_input_from_input_method(&self, token: Option<&WindowToken>, flags: ShowFlags) {
        self.calls.lock().unwrap().push((token.cloned(), flags));
    }
}

#[derive(Default)]
pub(crate) struct RecordingSettings {
    pub(crate) launches: Mutex<Vec<(ContextId, LaunchFlags)>>,
}

impl SettingsLauncher for RecordingSettings {
    fn launch_settings(&self, origin: &ContextId, flags: LaunchFlags) {
        self.launches.lock().unwrap().push((origin.clone(), flags));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PosterCall {
    Channel(&'static str),
    Post(i32),
    Cancel(i32),
}

#[derive(Default)]
pub(crate) struct RecordingPoster {
    pub(crate) calls: Mutex<Vec<PosterCall>>,
}

impl RecordingPoster {
    pub(crate) fn calls(&self) -> Vec<PosterCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl NotificationPoster for RecordingPoster {
    fn create_channel(&self, channel: &NotificationChannel) {
        self.calls.lock().unwrap().push(PosterCall::Channel(channel.id));
    }

    fn post(&self, notification: &KeyboardNotification) {
        self.calls.lock().unwrap().push(PosterCall::Post(notification.id));
    }

    fn cancel(&self, id: i32) {
        self.calls.lock().unwrap().push(PosterCall::Cancel(id));
    }
}

#[derive(Default)]
pub(crate) struct FakePermissions {
    pub(crate) granted: AtomicBool,
    pub(crate) launches: AtomicUsize,
}

impl FakePermissions {
    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl PermissionLauncher for FakePermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        matches!(permission, Permission::PostNotifications) && self.granted.load(Ordering::SeqCst)
    }

    fn launch_request(&self) {
        self.launches.fetch_add(1, Ordering::SeqCst);
    }
}
