//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    default_prefs_path, DEFAULT_LOCALE, DEFAULT_SDK_LEVEL, MAX_SDK_LEVEL, MIN_SDK_LEVEL,
};

/// CLI options for the keybridge host. Validated values keep the capability probe honest.
#[derive(Debug, Parser, Clone)]
#[command(about = "keybridge keyboard notification host", author, version)]
pub struct AppConfig {
    /// Preference file holding persisted keyboard decisions
    #[arg(long = "prefs-path", env = "KEYBRIDGE_PREFS", default_value_os_t = default_prefs_path())]
    pub prefs_path: PathBuf,

    /// Keep preferences in memory only (nothing is written to disk)
    #[arg(long = "ephemeral-prefs", default_value_t = false)]
    pub ephemeral_prefs: bool,

    /// Host SDK level used to pick show-path and locale-accessor variants
    #[arg(long = "sdk-level", env = "KEYBRIDGE_SDK_LEVEL", default_value_t = DEFAULT_SDK_LEVEL)]
    pub sdk_level: u32,

    /// Value assumed for keyboard_notification before any decision is stored
    #[arg(long = "notification-default", default_value_t = false)]
    pub notification_default: bool,

    /// Initial locale of the host configuration (e.g. en_US, pt-BR)
    #[arg(long, default_value = DEFAULT_LOCALE)]
    pub locale: String,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "KEYBRIDGE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "KEYBRIDGE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging raw host commands and locale tags (debug log only)
    #[arg(
        long = "log-content",
        env = "KEYBRIDGE_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}
