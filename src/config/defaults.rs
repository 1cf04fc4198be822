use std::env;
use std::path::PathBuf;

/// Newest host generation we model by default (notification permission enforced).
pub const DEFAULT_SDK_LEVEL: u32 = 34;
/// Oldest host generation the keyboard ever shipped for.
pub const MIN_SDK_LEVEL: u32 = 9;
pub const MAX_SDK_LEVEL: u32 = 99;
pub const DEFAULT_LOCALE: &str = "en_US";

const PREFS_FILE_NAME: &str = "keybridge_prefs.json";

/// `$XDG_CONFIG_HOME/keybridge`, then `~/.config/keybridge`, then the temp dir.
pub fn default_prefs_path() -> PathBuf {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir).join("keybridge").join(PREFS_FILE_NAME);
    }
    if let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home)
            .join(".config")
            .join("keybridge")
            .join(PREFS_FILE_NAME);
    }
    env::temp_dir().join(PREFS_FILE_NAME)
}
