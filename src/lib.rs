pub mod app;
pub mod capability;
pub mod config;
pub mod ime;
pub mod ipc;
mod lock;
pub mod notification;
pub mod permission;
pub mod prefs;
pub mod signal;
mod telemetry;

#[cfg(test)]
mod test_support;

pub(crate) use lock::lock_or_recover;
pub use app::logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use telemetry::init_tracing;
