//! keybridge host entrypoint: stands up the keyboard notification layer and
//! drives it from JSON lines on stdin.
//!
//! # Architecture
//!
//! - Stdin reader: parses host commands (permission answers, notification taps, settings writes)
//! - Main loop: applies commands and settles the signal bus
//! - Stdout: one JSON event per collaborator call

use anyhow::Result;
use keybridge::config::AppConfig;
use keybridge::ipc::run_host;
use keybridge::{init_logging, init_tracing, log_debug, log_file_path, log_panic};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    std::panic::set_hook(Box::new(log_panic));

    log_debug("=== keybridge host started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));
    log_debug(&format!(
        "sdk_level={} locale={} ephemeral_prefs={}",
        config.sdk_level, config.locale, config.ephemeral_prefs
    ));

    run_host(config)
}
