//! Host capability probe.
//!
//! Every host-generation branch in the crate goes through [`HostCapabilities`],
//! which is probed once at startup. Callers ask for the variant they need
//! (show path, locale accessor) instead of comparing SDK levels themselves.

mod locale;

pub use locale::{Configuration, Locale, LocaleAccessor, LocaleParseError};

use crate::config::AppConfig;

/// First host generation with the locale-list configuration API.
pub const SDK_LOCALE_LIST: u32 = 24;
/// First host generation with notification channels.
pub const SDK_NOTIFICATION_CHANNELS: u32 = 26;
/// First host generation where the IME can ask to show its own window.
pub const SDK_SHOW_SELF: u32 = 28;
/// First host generation that gates notification posting behind a runtime permission.
pub const SDK_NOTIFICATION_PERMISSION: u32 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    sdk_level: u32,
}

impl HostCapabilities {
    pub fn new(sdk_level: u32) -> Self {
        Self { sdk_level }
    }

    /// Probe from validated configuration.
    pub fn probe(config: &AppConfig) -> Self {
        let caps = Self::new(config.sdk_level);
        crate::log_debug(&format!(
            "capability probe: sdk={} show_self={} locale_list={} runtime_permission={}",
            caps.sdk_level,
            caps.supports_show_self(),
            caps.supports_locale_list(),
            caps.requires_notification_permission()
        ));
        caps
    }

    pub fn sdk_level(self) -> u32 {
        self.sdk_level
    }

    pub fn supports_show_self(self) -> bool {
        self.sdk_level >= SDK_SHOW_SELF
    }

    pub fn supports_locale_list(self) -> bool {
        self.sdk_level >= SDK_LOCALE_LIST
    }

    pub fn supports_notification_channels(self) -> bool {
        self.sdk_level >= SDK_NOTIFICATION_CHANNELS
    }

    pub fn requires_notification_permission(self) -> bool {
        self.sdk_level >= SDK_NOTIFICATION_PERMISSION
    }

    /// Locale accessor variant for this host.
    pub fn locale_accessor(self) -> LocaleAccessor {
        if self.supports_locale_list() {
            LocaleAccessor::LocaleList
        } else {
            LocaleAccessor::Legacy
        }
    }
}
