//! Persistent key-value preferences shared by the whole process.
//!
//! The store is a single JSON object on disk. Keys this crate does not know
//! about are kept as-is so the settings surface can share the file.


use anyhow::{bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{lock_or_recover, log_debug};

/// Persisted notification-permission decision.
pub const PREF_KEYBOARD_NOTIFICATION: &str = "keyboard_notification";

/// Boolean view of the preference store used by listeners and the controller.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Synchronous write; when it returns `Ok` the value is durable.
    fn put_bool(&self, key: &str, value: bool) -> Result<()>;
}

struct PrefsState {
    values: Map<String, Value>,
    observers: Vec<Sender<String>>,
}

/// File-backed (or in-memory) preferences with change notification.
pub struct Preferences {
    path: Option<PathBuf>,
    state: Mutex<PrefsState>,
}

impl Preferences {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(PrefsState {
                values: Map::new(),
                observers: Vec::new(),
            }),
        }
    }

    /// Open the preference file, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = load_values(&path)?;
        log_debug(&format!(
            "preferences loaded from {} ({} keys)",
            path.display(),
            values.len()
        ));
        Ok(Self {
            path: Some(path),
            state: Mutex::new(PrefsState {
                values,
                observers: Vec::new(),
            }),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Receive the key of every successful write from now on.
    pub fn subscribe_changes(&self) -> Receiver<String> {
        let (tx, rx) = unbounded();
        lock_or_recover(&self.state, "preferences").observers.push(tx);
        rx
    }

    pub fn contains(&self, key: &str) -> bool {
        lock_or_recover(&self.state, "preferences")
            .values
            .contains_key(key)
    }

    /// Decision with the configured default applied, as the IME service reads it.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl PreferenceStore for Preferences {
    fn get_bool(&self, key: &str) -> Option<bool> {
        lock_or_recover(&self.state, "preferences")
            .values
            .get(key)
            .and_then(Value::as_bool)
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        let mut state = lock_or_recover(&self.state, "preferences");
        let previous = state.values.insert(key.to_string(), Value::Bool(value));
        if let Some(path) = &self.path {
            if let Err(err) = persist_values(path, &state.values) {
                // Keep memory consistent with disk when the write fails.
                match previous {
                    Some(old) => state.values.insert(key.to_string(), old),
                    None => state.values.remove(key),
                };
                return Err(err);
            }
        }
        tracing::info!(key, value, "preference written");
        log_debug(&format!("preference {key}={value}"));
        state
            .observers
            .retain(|observer| observer.send(key.to_string()).is_ok());
        Ok(())
    }
}

fn load_values(path: &Path) -> Result<Map<String, Value>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?
    {
        Value::Object(values) => Ok(values),
        other => bail!(
            "{} must hold a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn persist_values(path: &Path, values: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(values).context("failed to encode preferences")?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, body).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
