//! File logs kept off stdout, which belongs to the host protocol.
//!
//! Two size-capped files: the debug log (opt-in with `--logs`) and the crash
//! log written by the panic hook. Panics are also reported as `tracing`
//! events so they land in the JSON trace next to signal and preference events.

use crate::config::AppConfig;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const DEBUG_LOG_CAP: u64 = 2 * 1024 * 1024;
const CRASH_LOG_CAP: u64 = 128 * 1024;

static DEBUG_ON: AtomicBool = AtomicBool::new(false);
static CONTENT_ON: AtomicBool = AtomicBool::new(false);
static SINKS: OnceLock<Mutex<Sinks>> = OnceLock::new();

pub fn log_file_path() -> PathBuf {
    env::var("KEYBRIDGE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("keybridge.log"))
}

pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("keybridge_crash.log")
}

/// Append-only file that starts over once it would pass `cap` bytes.
struct CappedFile {
    path: PathBuf,
    cap: u64,
    len: u64,
    file: Option<File>,
}

impl CappedFile {
    fn new(path: PathBuf, cap: u64) -> Self {
        Self {
            path,
            cap,
            len: 0,
            file: None,
        }
    }

    fn open(&mut self, truncate: bool) -> Option<&mut File> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(&self.path)
            .ok()?;
        self.len = if truncate {
            0
        } else {
            file.metadata().map(|m| m.len()).unwrap_or(0)
        };
        self.file = Some(file);
        self.file.as_mut()
    }

    fn append(&mut self, line: &str) {
        let incoming = line.len() as u64;
        if self.file.is_none() {
            let over = self.current_len().saturating_add(incoming) > self.cap;
            if self.open(over).is_none() {
                return;
            }
        } else if self.len.saturating_add(incoming) > self.cap && self.open(true).is_none() {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            if file.write_all(line.as_bytes()).is_ok() {
                self.len = self.len.saturating_add(incoming);
            }
        }
    }

    fn current_len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

struct Sinks {
    debug: Option<CappedFile>,
    crash: Option<CappedFile>,
}

fn sinks() -> MutexGuard<'static, Sinks> {
    // lock_or_recover logs through this mutex, so recover inline.
    SINKS
        .get_or_init(|| {
            Mutex::new(Sinks {
                debug: None,
                crash: None,
            })
        })
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn switch_logs(debug: bool, content: bool) {
    DEBUG_ON.store(debug, Ordering::Relaxed);
    CONTENT_ON.store(debug && content, Ordering::Relaxed);
    let mut sinks = sinks();
    sinks.debug = debug.then(|| CappedFile::new(log_file_path(), DEBUG_LOG_CAP));
    sinks.crash = debug.then(|| CappedFile::new(crash_log_path(), CRASH_LOG_CAP));
}

/// `--no-logs` wins over `--logs`; content logging needs both `--logs` and `--log-content`.
pub fn init_logging(config: &AppConfig) {
    switch_logs(config.logs && !config.no_logs, config.log_content);
}

pub fn log_debug(msg: &str) {
    if !DEBUG_ON.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("[{}] {msg}\n", unix_seconds());
    if let Some(debug) = sinks().debug.as_mut() {
        debug.append(&line);
    }
}

/// For messages carrying driver input (raw commands, locale tags).
pub fn log_debug_content(msg: &str) {
    if CONTENT_ON.load(Ordering::Relaxed) {
        log_debug(msg);
    }
}

fn crash_line(timestamp: u64, location: &str, payload: Option<&str>) -> String {
    let payload = payload.unwrap_or("payload hidden without --log-content");
    format!(
        "[{timestamp}] panic at {location}: {payload} (keybridge {})\n",
        env!("CARGO_PKG_VERSION")
    )
}

fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Panic hook body: one trace event plus one crash-log line.
pub fn log_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = CONTENT_ON
        .load(Ordering::Relaxed)
        .then(|| panic_payload(info));
    tracing::error!(location = %location, payload = payload.as_deref(), "panic");

    if !DEBUG_ON.load(Ordering::Relaxed) {
        return;
    }
    let line = crash_line(unix_seconds(), &location, payload.as_deref());
    if let Some(crash) = sinks().crash.as_mut() {
        crash.append(&line);
    }
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool, content_enabled: bool) {
    switch_logs(enabled, content_enabled);
}
