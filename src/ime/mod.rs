//! IME-service collaborators and the listener that acts on notification taps.

mod listener;
#[cfg(test)]
mod tests;

pub use listener::ActionSignalListener;

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::capability::HostCapabilities;
use crate::{lock_or_recover, log_debug};

/// Identity token the input-method manager uses to address the IME window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WindowToken(String);

impl WindowToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Launch origin for activities started on behalf of the IME service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Soft-input show flags, bit-compatible with the host values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShowFlags(u32);

impl ShowFlags {
    pub const IMPLICIT: ShowFlags = ShowFlags(0x1);
    /// Show even if the user dismissed the keyboard.
    pub const FORCED: ShowFlags = ShowFlags(0x2);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_forced(self) -> bool {
        self.0 & Self::FORCED.0 != 0
    }
}

/// Activity launch flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaunchFlags(u32);

impl LaunchFlags {
    pub const NEW_TASK: LaunchFlags = LaunchFlags(0x1000_0000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_new_task(self) -> bool {
        self.0 & Self::NEW_TASK.0 != 0
    }
}

pub trait ImeService: Send + Sync {
    /// Ask the host to show this IME's own window (capable hosts only).
    fn request_show_self(&self, flags: ShowFlags);

    /// Token attached by the host; `None` until the window exists.
    fn window_token(&self) -> Option<WindowToken>;

    fn context(&self) -> ContextId;
}

/// System input-method manager used by the legacy show path.
pub trait InputMethodManager: Send + Sync {
    fn show_soft_input_from_input_method(&self, token: Option<&WindowToken>, flags: ShowFlags);
}

/// Entry point of the settings surface.
pub trait SettingsLauncher: Send + Sync {
    fn launch_settings(&self, origin: &ContextId, flags: LaunchFlags);
}

/// How SHOW reaches the screen, chosen once from [`HostCapabilities`].
#[derive(Clone)]
pub enum KeyboardPresenter {
    SelfShow,
    InputMethodManager(Arc<dyn InputMethodManager>),
}

impl KeyboardPresenter {
    pub fn select(caps: HostCapabilities, imm: Arc<dyn InputMethodManager>) -> Self {
        if caps.supports_show_self() {
            KeyboardPresenter::SelfShow
        } else {
            KeyboardPresenter::InputMethodManager(imm)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeyboardPresenter::SelfShow => "self",
            KeyboardPresenter::InputMethodManager(_) => "input_method_manager",
        }
    }

    /// Present the keyboard, overriding a user-initiated hide.
    pub fn force_show(&self, ime: &dyn ImeService) {
        match self {
            KeyboardPresenter::SelfShow => ime.request_show_self(ShowFlags::FORCED),
            KeyboardPresenter::InputMethodManager(imm) => {
                let token = ime.window_token();
                if token.is_none() {
                    log_debug("legacy show without a window token");
                }
                imm.show_soft_input_from_input_method(token.as_ref(), ShowFlags::FORCED);
            }
        }
    }
}

impl fmt::Debug for KeyboardPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Holds the first token the host attaches; later attachments are ignored.
#[derive(Debug, Default)]
pub struct WindowTokenSlot {
    token: Mutex<Option<WindowToken>>,
}

impl WindowTokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this call stored the token.
    pub fn attach(&self, token: WindowToken) -> bool {
        let mut slot = lock_or_recover(&self.token, "window token");
        if slot.is_some() {
            return false;
        }
        log_debug(&format!("window token attached: {}", token.as_str()));
        *slot = Some(token);
        true
    }

    pub fn get(&self) -> Option<WindowToken> {
        lock_or_recover(&self.token, "window token").clone()
    }
}
