use crate::capability::{Configuration, HostCapabilities, LocaleAccessor};
use crate::config::AppConfig;
use crate::ime::{ImeService, KeyboardPresenter};
use crate::notification::{NotificationController, NotificationDeps};
use crate::permission::PermissionRequester;
use crate::prefs::{PreferenceStore, Preferences, PREF_KEYBOARD_NOTIFICATION};
use crate::signal::SignalBus;
use crate::{lock_or_recover, log_debug, log_debug_content};
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::host::{
    HostIme, HostInputMethodManager, HostNotifications, HostPermissions, HostSettings,
    PermissionScreen,
};
use super::protocol::{HostCommand, HostEvent};
use super::router::handle_command;

const LOOP_TICK: Duration = Duration::from_millis(20);
/// Upper bound on bus/preference/launch rounds per pump.
const MAX_PUMP_ROUNDS: usize = 64;

// ============================================================================
// Event Sending
// ============================================================================

#[derive(Clone)]
pub(super) enum EventSink {
    Stdout,
    #[cfg_attr(not(test), allow(dead_code))]
    Capture(Arc<Mutex<Vec<HostEvent>>>),
}

impl EventSink {
    pub(super) fn send_event(&self, event: HostEvent) {
        match self {
            EventSink::Stdout => {
                if let Ok(json) = serde_json::to_string(&event) {
                    let mut stdout = io::stdout().lock();
                    let _ = writeln!(stdout, "{json}");
                    let _ = stdout.flush();
                }
            }
            EventSink::Capture(events) => {
                lock_or_recover(events, "event capture").push(event);
            }
        }
    }
}

// ============================================================================
// Host State
// ============================================================================

pub(super) struct HostState {
    pub(super) caps: HostCapabilities,
    pub(super) show_path: &'static str,
    pub(super) bus: SignalBus,
    pub(super) prefs: Arc<Preferences>,
    pub(super) pref_changes: Receiver<String>,
    pub(super) ime: Arc<HostIme>,
    pub(super) permission_granted: Arc<AtomicBool>,
    pub(super) launch_rx: Receiver<()>,
    pub(super) requester: Option<PermissionRequester<PermissionScreen>>,
    pub(super) controller: NotificationController,
    pub(super) locale_accessor: LocaleAccessor,
    pub(super) configuration: Configuration,
    pub(super) events: EventSink,
    pub(super) shutdown: bool,
}

impl HostState {
    pub(super) fn new(
        config: AppConfig,
        prefs: Arc<Preferences>,
        bus: SignalBus,
        events: EventSink,
    ) -> Self {
        let caps = HostCapabilities::probe(&config);
        let pref_changes = prefs.subscribe_changes();
        let ime = Arc::new(HostIme::new("keybridge", events.clone()));
        let permission_granted = Arc::new(AtomicBool::new(false));
        let (launch_tx, launch_rx) = unbounded();

        let presenter = KeyboardPresenter::select(
            caps,
            Arc::new(HostInputMethodManager {
                events: events.clone(),
            }),
        );
        let show_path = presenter.label();
        let deps = NotificationDeps {
            bus: bus.clone(),
            prefs: prefs.clone(),
            permissions: Arc::new(HostPermissions::new(
                Arc::clone(&permission_granted),
                launch_tx,
            )),
            poster: Arc::new(HostNotifications {
                events: events.clone(),
            }),
            ime: ime.clone(),
            presenter,
            settings: Arc::new(HostSettings {
                events: events.clone(),
            }),
        };
        let controller = NotificationController::new(caps, deps, config.notification_default);
        let configuration = Configuration::new(config.initial_locale());

        Self {
            caps,
            show_path,
            bus,
            prefs,
            pref_changes,
            ime,
            permission_granted,
            launch_rx,
            requester: None,
            controller,
            locale_accessor: caps.locale_accessor(),
            configuration,
            events,
            shutdown: false,
        }
    }

    /// Announce the host, create the IME service, and settle.
    pub(super) fn start(&mut self) {
        self.emit_ready();
        let change = self.controller.on_create();
        log_debug(&format!("IME service created: {change:?}"));
        self.pump();
    }

    pub(super) fn emit_ready(&self) {
        self.events.send_event(HostEvent::Ready {
            version: env!("CARGO_PKG_VERSION").to_string(),
            sdk_level: self.caps.sdk_level(),
            show_path: self.show_path.to_string(),
            locale_accessor: self.locale_accessor.label().to_string(),
            prefs_path: self.prefs.path().map(|p| p.display().to_string()),
            keyboard_notification: self.controller.keyboard_notification_enabled(),
        });
    }

    pub(super) fn emit_state(&self) {
        self.events.send_event(HostEvent::State {
            keyboard_notification: self.prefs.get_bool(PREF_KEYBOARD_NOTIFICATION),
            notification_visible: self.controller.is_showing(),
            permission_granted: self.permission_granted.load(Ordering::SeqCst),
            awaiting_permission: self.controller.awaiting_permission(),
            token_attached: self.ime.window_token().is_some(),
            registrations: self.bus.registration_count(),
        });
    }

    /// Run queued bus deliveries, preference notifications, and permission
    /// screen launches until nothing is left.
    pub(super) fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut progressed = self.bus.dispatch_pending() > 0;

            while let Ok(key) = self.pref_changes.try_recv() {
                progressed = true;
                self.events.send_event(HostEvent::PreferenceWritten {
                    value: self.prefs.get_bool(&key),
                    key: key.clone(),
                });
                let change = self.controller.on_preference_changed(&key);
                log_debug(&format!("preference {key} changed: {change:?}"));
            }

            while self.launch_rx.try_recv().is_ok() {
                progressed = true;
                self.start_permission_screen();
            }

            if !progressed {
                return;
            }
        }
        log_debug("pump round limit reached; continuing on next tick");
    }

    fn start_permission_screen(&mut self) {
        if self.requester.as_ref().is_some_and(|r| !r.is_finished()) {
            log_debug("permission screen already showing; launch ignored");
            return;
        }
        let screen = PermissionScreen {
            events: self.events.clone(),
        };
        let mut requester = PermissionRequester::new(screen, self.bus.sender());
        requester.on_create();
        self.requester = Some(requester);
    }
}

// ============================================================================
// Stdin Reader Thread
// ============================================================================

fn spawn_stdin_reader(tx: Sender<HostCommand>, events: EventSink) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let stdin_lock = stdin.lock();

        for line in stdin_lock.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<HostCommand>(trimmed) {
                Ok(cmd) => {
                    if tx.send(cmd).is_err() {
                        break; // Main thread has exited
                    }
                }
                Err(e) => {
                    events.send_event(HostEvent::Error {
                        message: format!("Invalid command: {e}"),
                        recoverable: true,
                    });
                }
            }
        }

        log_debug("Stdin reader thread exiting");
    })
}

// ============================================================================
// Main Event Loop
// ============================================================================

pub fn run_host(config: AppConfig) -> Result<()> {
    log_debug("Starting keybridge host");

    let prefs = if config.ephemeral_prefs {
        Preferences::in_memory()
    } else {
        Preferences::open(config.prefs_path.clone()).with_context(|| {
            format!("failed to open preferences at {}", config.prefs_path.display())
        })?
    };

    let mut state = HostState::new(
        config,
        Arc::new(prefs),
        SignalBus::global().clone(),
        EventSink::Stdout,
    );
    state.start();

    let (cmd_tx, cmd_rx) = unbounded();
    let _stdin_handle = spawn_stdin_reader(cmd_tx, state.events.clone());
    run_host_loop(&mut state, &cmd_rx)
}

pub(super) fn run_host_loop(state: &mut HostState, cmd_rx: &Receiver<HostCommand>) -> Result<()> {
    let mut commands: u64 = 0;
    while !state.shutdown {
        match cmd_rx.recv_timeout(LOOP_TICK) {
            Ok(cmd) => {
                commands += 1;
                log_debug_content(&format!("host command received: {cmd:?}"));
                tracing::debug!(commands, "host command");
                handle_command(state, cmd);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log_debug("Command channel disconnected, exiting");
                break;
            }
        }
        state.pump();
    }

    state.controller.on_destroy();
    state.pump();
    log_debug(&format!("host exiting after {commands} commands"));
    Ok(())
}
