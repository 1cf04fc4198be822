use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Language plus optional region, rendered the host way (`en_US`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    pub fn new(language: &str, country: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: country.map(str::to_ascii_uppercase),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleParseError(String);

impl fmt::Display for LocaleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid locale tag '{}'", self.0)
    }
}

impl std::error::Error for LocaleParseError {}

fn locale_tag_regex() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"^([A-Za-z]{2,3})(?:[_-]([A-Za-z]{2}|[0-9]{3}))?$").ok())
        .as_ref()
}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let trimmed = tag.trim();
        let caps = locale_tag_regex()
            .and_then(|re| re.captures(trimmed))
            .ok_or_else(|| LocaleParseError(tag.to_string()))?;
        let language = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let country = caps.get(2).map(|m| m.as_str());
        Ok(Self::new(language, country))
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

/// Host configuration carrying both locale representations: the single
/// `locale` field of older hosts and the ordered locale list of newer ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    locales: Vec<Locale>,
    locale: Locale,
}

impl Configuration {
    pub fn new(locale: Locale) -> Self {
        Self {
            locales: vec![locale.clone()],
            locale,
        }
    }
}

/// Stable get/set over the two locale API generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleAccessor {
    /// Newer hosts: the primary entry of the locale list.
    LocaleList,
    /// Older hosts: the single locale field.
    Legacy,
}

impl LocaleAccessor {
    pub fn label(self) -> &'static str {
        match self {
            LocaleAccessor::LocaleList => "locale_list",
            LocaleAccessor::Legacy => "legacy",
        }
    }

    pub fn get(self, config: &Configuration) -> Locale {
        match self {
            LocaleAccessor::LocaleList => config
                .locales
                .first()
                .unwrap_or(&config.locale)
                .clone(),
            LocaleAccessor::Legacy => config.locale.clone(),
        }
    }

    pub fn set(self, config: &mut Configuration, locale: Locale) {
        match self {
            LocaleAccessor::LocaleList => {
                // Setting the list also updates the compatibility field.
                config.locales = vec![locale.clone()];
                config.locale = locale;
            }
            LocaleAccessor::Legacy => config.locale = locale,
        }
    }
}
