use std::sync::Arc;

use super::{ImeService, KeyboardPresenter, LaunchFlags, SettingsLauncher};
use crate::log_debug;
use crate::signal::{Action, ActionFilter, Signal, SignalBus, SignalReceiver, Subscription};

/// Turns SHOW and SETTINGS into calls on one IME service instance.
///
/// Holds no state between signals; the owning service disposes the
/// registration when it is destroyed.
pub struct ActionSignalListener {
    ime: Arc<dyn ImeService>,
    presenter: KeyboardPresenter,
    settings: Arc<dyn SettingsLauncher>,
}

impl ActionSignalListener {
    pub fn new(
        ime: Arc<dyn ImeService>,
        presenter: KeyboardPresenter,
        settings: Arc<dyn SettingsLauncher>,
    ) -> Self {
        log_debug(&format!(
            "action listener created, context={} show_path={}",
            ime.context(),
            presenter.label()
        ));
        Self {
            ime,
            presenter,
            settings,
        }
    }

    pub fn register(self, bus: &SignalBus) -> Subscription {
        bus.subscribe(ActionFilter::keyboard_actions(), self)
    }
}

impl SignalReceiver for ActionSignalListener {
    fn on_receive(&mut self, signal: &Signal) {
        log_debug(&format!("action listener received {}", signal.identifier()));
        match signal.action() {
            Some(Action::Show) => self.presenter.force_show(self.ime.as_ref()),
            Some(Action::Settings) => self
                .settings
                .launch_settings(&self.ime.context(), LaunchFlags::NEW_TASK),
            _ => {}
        }
    }
}
