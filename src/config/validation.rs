use super::defaults::{MAX_SDK_LEVEL, MIN_SDK_LEVEL};
use super::AppConfig;
use crate::capability::Locale;
use anyhow::{bail, Context, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the locale tag.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_SDK_LEVEL..=MAX_SDK_LEVEL).contains(&self.sdk_level) {
            bail!(
                "--sdk-level must be between {MIN_SDK_LEVEL} and {MAX_SDK_LEVEL}, got {}",
                self.sdk_level
            );
        }

        let locale: Locale = self
            .locale
            .parse()
            .with_context(|| format!("--locale '{}' is not a valid locale tag", self.locale))?;
        self.locale = locale.to_string();

        if !self.ephemeral_prefs {
            if self.prefs_path.as_os_str().is_empty() {
                bail!("--prefs-path cannot be empty");
            }
            if self.prefs_path.is_dir() {
                bail!(
                    "--prefs-path must name a file, {} is a directory",
                    self.prefs_path.display()
                );
            }
        }

        Ok(())
    }

    /// Initial locale after validation; falls back to the default tag if called early.
    pub fn initial_locale(&self) -> Locale {
        self.locale
            .parse()
            .unwrap_or_else(|_| Locale::new("en", Some("US")))
    }
}
