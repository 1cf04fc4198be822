//! Runtime-permission request and the persisted outcome.

mod outcome;
mod requester;

pub use outcome::PermissionOutcomeListener;
pub use requester::{outcome_for, PermissionHost, PermissionRequester, NOTIFICATION_REQUEST_CODE};

use serde::{Deserialize, Serialize};

/// Runtime permissions this crate asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "android.permission.POST_NOTIFICATIONS")]
    PostNotifications,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::PostNotifications => "android.permission.POST_NOTIFICATIONS",
        }
    }
}

/// Per-permission answer reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantResult {
    Granted,
    Denied,
}

impl GrantResult {
    /// Host result codes: `0` is granted, anything else counts as denied.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            GrantResult::Granted
        } else {
            GrantResult::Denied
        }
    }
}

/// Entry point the IME service uses to check for and ask for a permission.
pub trait PermissionLauncher: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Start a [`PermissionRequester`] in its own task.
    fn launch_request(&self);
}
