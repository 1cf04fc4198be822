use super::*;
use crate::capability::{HostCapabilities, SDK_SHOW_SELF};
use crate::signal::{Action, Signal, SignalBus, SignalReceiver};
use crate::test_support::{RecordingIme, RecordingImm, RecordingSettings};

struct Fixture {
    ime: Arc<RecordingIme>,
    imm: Arc<RecordingImm>,
    settings: Arc<RecordingSettings>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            ime: Arc::new(RecordingIme::with_token("tok-1")),
            imm: Arc::new(RecordingImm::default()),
            settings: Arc::new(RecordingSettings::default()),
        }
    }

    fn listener(&self, sdk_level: u32) -> ActionSignalListener {
        let presenter = KeyboardPresenter::select(HostCapabilities::new(sdk_level), self.imm.clone());
        ActionSignalListener::new(self.ime.clone(), presenter, self.settings.clone())
    }
}

#[test]
fn show_on_capable_host_uses_self_show_only() {
    let fx = Fixture::new();
    let bus = SignalBus::new();
    let _sub = fx.listener(SDK_SHOW_SELF).register(&bus);

    bus.emit(Action::Show);
    bus.dispatch_pending();

    assert_eq!(fx.ime.show_self.lock().unwrap().as_slice(), [ShowFlags::FORCED]);
    assert!(fx.imm.calls.lock().unwrap().is_empty());
    assert!(fx.settings.launches.lock().unwrap().is_empty());
}

#[test]
fn show_on_legacy_host_goes_through_input_method_manager() {
    let fx = Fixture::new();
    let bus = SignalBus::new();
    let _sub = fx.listener(SDK_SHOW_SELF - 1).register(&bus);

    bus.emit(Action::Show);
    bus.dispatch_pending();

    let calls = fx.imm.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Some(WindowToken::new("tok-1")));
    assert!(calls[0].1.is_forced());
    assert!(fx.ime.show_self.lock().unwrap().is_empty());
}

#[test]
fn legacy_show_without_token_still_requests_forced_show() {
    let imm = Arc::new(RecordingImm::default());
    let ime = RecordingIme {
        show_self: std::sync::Mutex::new(Vec::new()),
        token: None,
    };
    KeyboardPresenter::InputMethodManager(imm.clone()).force_show(&ime);
    assert_eq!(
        imm.calls.lock().unwrap().as_slice(),
        [(None::<WindowToken>, ShowFlags::FORCED)]
    );
}

#[test]
fn settings_launches_once_with_ime_context_as_new_task() {
    let fx = Fixture::new();
    let bus = SignalBus::new();
    let _sub = fx.listener(34).register(&bus);

    bus.emit(Action::Show);
    bus.emit(Action::Show);
    bus.emit(Action::Settings);
    bus.dispatch_pending();

    let launches = fx.settings.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].0, ContextId::new("ime:test"));
    assert!(launches[0].1.is_new_task());
    assert_eq!(fx.ime.show_self.lock().unwrap().len(), 2);
}

#[test]
fn unknown_actions_do_nothing() {
    let fx = Fixture::new();
    let mut listener = fx.listener(34);
    listener.on_receive(&Signal::from_identifier("org.pocketworkstation.pckeyboard.HIDE"));
    listener.on_receive(&Signal::new(Action::NotificationGranted));

    assert!(fx.ime.show_self.lock().unwrap().is_empty());
    assert!(fx.imm.calls.lock().unwrap().is_empty());
    assert!(fx.settings.launches.lock().unwrap().is_empty());
}

#[test]
fn listener_stays_registered_across_signals() {
    let fx = Fixture::new();
    let bus = SignalBus::new();
    let sub = fx.listener(34).register(&bus);
    for _ in 0..3 {
        bus.emit(Action::Settings);
    }
    bus.dispatch_pending();
    assert!(bus.is_registered(sub.id()));
    assert_eq!(fx.settings.launches.lock().unwrap().len(), 3);

    sub.dispose();
    bus.emit(Action::Settings);
    bus.dispatch_pending();
    assert_eq!(fx.settings.launches.lock().unwrap().len(), 3);
}

#[test]
fn presenter_selection_is_fixed_by_capabilities() {
    let imm: Arc<dyn InputMethodManager> = Arc::new(RecordingImm::default());
    assert_eq!(
        KeyboardPresenter::select(HostCapabilities::new(30), imm.clone()).label(),
        "self"
    );
    assert_eq!(
        KeyboardPresenter::select(HostCapabilities::new(21), imm).label(),
        "input_method_manager"
    );
}

#[test]
fn flags_expose_host_bits() {
    assert_eq!(ShowFlags::FORCED.bits(), 2);
    assert!(!ShowFlags::IMPLICIT.is_forced());
    assert_eq!(LaunchFlags::NEW_TASK.bits(), 0x1000_0000);
}

#[test]
fn token_slot_keeps_first_attachment() {
    let slot = WindowTokenSlot::new();
    assert_eq!(slot.get(), None);
    assert!(slot.attach(WindowToken::new("first")));
    assert!(!slot.attach(WindowToken::new("second")));
    assert_eq!(slot.get(), Some(WindowToken::new("first")));
}
