use super::protocol::{HostCommand, HostEvent};
use super::router::handle_command;
use super::session::{run_host_loop, EventSink, HostState};
use crate::capability::Locale;
use crate::config::AppConfig;
use crate::notification::{KeyboardNotification, NotificationChannel, NOTIFICATION_ONGOING_ID};
use crate::permission::{GrantResult, Permission};
use crate::prefs::{Preferences, PREF_KEYBOARD_NOTIFICATION};
use crate::signal::{Action, SignalBus};
use clap::Parser;
use crossbeam_channel::unbounded;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

struct TestHost {
    state: HostState,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl TestHost {
    fn new(args: &[&str]) -> Self {
        let mut argv = vec!["test-app", "--ephemeral-prefs"];
        argv.extend_from_slice(args);
        let config = AppConfig::parse_from(argv);
        let events = Arc::new(Mutex::new(Vec::new()));
        let state = HostState::new(
            config,
            Arc::new(Preferences::in_memory()),
            SignalBus::new(),
            EventSink::Capture(events.clone()),
        );
        Self { state, events }
    }

    fn started(args: &[&str]) -> Self {
        let mut host = Self::new(args);
        host.state.start();
        host
    }

    fn send(&mut self, cmd: HostCommand) {
        handle_command(&mut self.state, cmd);
        self.state.pump();
    }

    fn command(&mut self, json: &str) {
        let cmd: HostCommand = serde_json::from_str(json).expect("valid command");
        self.send(cmd);
    }

    fn drain(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

fn grant(request_code: i32, result: GrantResult) -> HostCommand {
    HostCommand::PermissionResult {
        request_code,
        permissions: vec![Permission::PostNotifications],
        grant_results: vec![result],
    }
}

fn is_error(event: &HostEvent) -> bool {
    matches!(event, HostEvent::Error { .. })
}

#[test]
fn startup_on_new_host_requests_permission_once() {
    let host = TestHost::started(&["--sdk-level", "34", "--notification-default"]);
    let events = host.drain();

    assert!(matches!(
        &events[0],
        HostEvent::Ready { sdk_level: 34, show_path, locale_accessor, keyboard_notification: true, .. }
            if show_path == "self" && locale_accessor == "locale_list"
    ));
    let requested: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HostEvent::PermissionRequested { .. }))
        .collect();
    assert_eq!(
        requested,
        vec![&HostEvent::PermissionRequested {
            permissions: vec![Permission::PostNotifications],
            request_code: 0,
        }]
    );
    assert!(host.state.controller.awaiting_permission());
}

#[test]
fn granted_permission_persists_and_posts_notification() {
    let mut host = TestHost::started(&["--sdk-level", "34", "--notification-default"]);
    host.drain();

    host.send(grant(0, GrantResult::Granted));
    let events = host.drain();

    assert!(events.contains(&HostEvent::RequesterFinished));
    assert!(events.contains(&HostEvent::SignalEmitted {
        action: Action::NotificationGranted.as_str().to_string(),
    }));
    assert!(events.contains(&HostEvent::PreferenceWritten {
        key: PREF_KEYBOARD_NOTIFICATION.to_string(),
        value: Some(true),
    }));
    assert!(events.contains(&HostEvent::NotificationChannelCreated {
        channel: NotificationChannel::keyboard(),
    }));
    assert!(events.contains(&HostEvent::NotificationPosted {
        notification: KeyboardNotification::ongoing(),
    }));
    assert!(host.state.requester.is_none());
    assert!(!host.state.controller.awaiting_permission());

    host.command(r#"{"cmd":"broadcast","action":"org.pocketworkstation.pckeyboard.SHOW"}"#);
    host.command(r#"{"cmd":"broadcast","action":"org.pocketworkstation.pckeyboard.SETTINGS"}"#);
    let events = host.drain();
    assert!(events.contains(&HostEvent::ShowSelf { flags: 2 }));
    assert!(events.contains(&HostEvent::SettingsLaunched {
        origin: "ime:keybridge".to_string(),
        new_task: true,
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::ShowSoftInput { .. })));
}

#[test]
fn denied_permission_persists_false_without_reprompt() {
    let mut host = TestHost::started(&["--sdk-level", "33", "--notification-default"]);
    host.drain();

    host.send(grant(0, GrantResult::Denied));
    let events = host.drain();
    assert!(events.contains(&HostEvent::PreferenceWritten {
        key: PREF_KEYBOARD_NOTIFICATION.to_string(),
        value: Some(false),
    }));
    assert!(!events.iter().any(|e| matches!(
        e,
        HostEvent::NotificationPosted { .. } | HostEvent::PermissionRequested { .. }
    )));

    host.send(HostCommand::GetState);
    assert_eq!(
        host.drain(),
        vec![HostEvent::State {
            keyboard_notification: Some(false),
            notification_visible: false,
            permission_granted: false,
            awaiting_permission: false,
            token_attached: false,
            registrations: 0,
        }]
    );
}

#[test]
fn empty_grant_results_count_as_denied() {
    let mut host = TestHost::started(&["--sdk-level", "34", "--notification-default"]);
    host.drain();

    host.command(r#"{"cmd":"permission_result","request_code":0}"#);
    let events = host.drain();
    assert!(events.contains(&HostEvent::SignalEmitted {
        action: Action::NotificationDenied.as_str().to_string(),
    }));
    assert!(events.contains(&HostEvent::PreferenceWritten {
        key: PREF_KEYBOARD_NOTIFICATION.to_string(),
        value: Some(false),
    }));
}

#[test]
fn foreign_request_code_goes_to_default_handler() {
    let mut host = TestHost::started(&["--sdk-level", "34", "--notification-default"]);
    host.drain();

    host.send(grant(7, GrantResult::Granted));
    assert_eq!(
        host.drain(),
        vec![HostEvent::PermissionDefaultHandler { request_code: 7 }]
    );
    assert!(host.state.requester.is_some());
    assert!(host.state.controller.awaiting_permission());
    assert!(!host.state.permission_granted.load(Ordering::SeqCst));
}

#[test]
fn permission_result_without_screen_is_an_error() {
    let mut host = TestHost::started(&["--sdk-level", "30"]);
    host.drain();

    host.send(grant(0, GrantResult::Granted));
    let events = host.drain();
    assert_eq!(events.len(), 1);
    assert!(is_error(&events[0]));
    assert!(!host.state.permission_granted.load(Ordering::SeqCst));
}

#[test]
fn rejected_result_does_not_bypass_permission_request() {
    let mut host = TestHost::started(&["--sdk-level", "34"]);
    host.drain();

    host.send(grant(0, GrantResult::Granted));
    assert!(host.drain().iter().all(is_error));

    host.command(r#"{"cmd":"set_preference","key":"keyboard_notification","value":true}"#);
    let events = host.drain();
    assert!(events.contains(&HostEvent::PermissionRequested {
        permissions: vec![Permission::PostNotifications],
        request_code: 0,
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::NotificationPosted { .. })));
}

#[test]
fn grant_without_permission_list_posts_notification() {
    let mut host = TestHost::started(&["--sdk-level", "34", "--notification-default"]);
    host.drain();

    host.command(r#"{"cmd":"permission_result","request_code":0,"grant_results":["granted"]}"#);
    let events = host.drain();
    assert!(host.state.permission_granted.load(Ordering::SeqCst));
    assert!(events.contains(&HostEvent::NotificationPosted {
        notification: KeyboardNotification::ongoing(),
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::PermissionRequested { .. })));
    assert!(host.state.controller.is_showing());
}

#[test]
fn legacy_host_shows_keyboard_through_input_method_manager() {
    let mut host = TestHost::started(&["--sdk-level", "21", "--notification-default"]);
    let events = host.drain();
    assert!(matches!(
        &events[0],
        HostEvent::Ready { show_path, locale_accessor, .. }
            if show_path == "input_method_manager" && locale_accessor == "legacy"
    ));
    assert!(events.contains(&HostEvent::NotificationPosted {
        notification: KeyboardNotification::ongoing(),
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::NotificationChannelCreated { .. })));

    host.command(r#"{"cmd":"attach_token","token":"tok-9"}"#);
    host.command(r#"{"cmd":"broadcast","action":"org.pocketworkstation.pckeyboard.SHOW"}"#);
    let events = host.drain();
    assert!(events.contains(&HostEvent::ShowSoftInput {
        token: Some("tok-9".to_string()),
        flags: 2,
    }));
    assert!(!events.iter().any(|e| matches!(e, HostEvent::ShowSelf { .. })));

    host.command(r#"{"cmd":"attach_token","token":"tok-10"}"#);
    assert!(host.drain().iter().all(is_error));
}

#[test]
fn disabling_preference_cancels_notification() {
    let mut host = TestHost::started(&["--sdk-level", "30", "--notification-default"]);
    host.drain();
    assert!(host.state.controller.is_showing());

    host.command(r#"{"cmd":"set_preference","key":"keyboard_notification","value":false}"#);
    let events = host.drain();
    assert!(events.contains(&HostEvent::NotificationCancelled {
        id: NOTIFICATION_ONGOING_ID,
    }));

    host.command(r#"{"cmd":"broadcast","action":"org.pocketworkstation.pckeyboard.SHOW"}"#);
    let events = host.drain();
    assert!(!events.iter().any(|e| matches!(e, HostEvent::ShowSelf { .. })));
}

#[test]
fn unknown_broadcast_reaches_nobody() {
    let mut host = TestHost::started(&["--sdk-level", "30", "--notification-default"]);
    host.drain();

    host.command(r#"{"cmd":"broadcast","action":"org.pocketworkstation.pckeyboard.HIDE"}"#);
    assert_eq!(
        host.drain(),
        vec![HostEvent::SignalEmitted {
            action: "org.pocketworkstation.pckeyboard.HIDE".to_string(),
        }]
    );
}

#[test]
fn locale_round_trips_through_accessor() {
    for (sdk, accessor) in [("30", "locale_list"), ("21", "legacy")] {
        let mut host = TestHost::started(&["--sdk-level", sdk, "--locale", "pt-BR"]);
        host.drain();

        host.send(HostCommand::GetLocale);
        assert_eq!(
            host.drain(),
            vec![HostEvent::CurrentLocale {
                locale: Locale::new("pt", Some("BR")),
                accessor: accessor.to_string(),
            }]
        );

        host.command(r#"{"cmd":"set_locale","locale":"fr"}"#);
        assert_eq!(
            host.drain(),
            vec![HostEvent::CurrentLocale {
                locale: Locale::new("fr", None),
                accessor: accessor.to_string(),
            }]
        );

        host.command(r#"{"cmd":"set_locale","locale":"not a locale"}"#);
        assert!(host.drain().iter().all(is_error));
    }
}

#[test]
fn host_loop_exits_on_shutdown_and_disposes_listener() {
    let mut host = TestHost::started(&["--sdk-level", "30", "--notification-default"]);
    host.drain();
    assert_eq!(host.state.bus.registration_count(), 1);

    let (tx, rx) = unbounded();
    tx.send(HostCommand::GetState).unwrap();
    tx.send(HostCommand::Shutdown).unwrap();
    run_host_loop(&mut host.state, &rx).unwrap();

    assert!(host.state.shutdown);
    assert!(!host.state.controller.is_showing());
    assert_eq!(host.state.bus.registration_count(), 0);
    assert!(matches!(
        host.drain().as_slice(),
        [HostEvent::State { notification_visible: true, .. }]
    ));
}

#[test]
fn host_loop_exits_when_command_channel_closes() {
    let mut host = TestHost::started(&["--sdk-level", "34"]);
    let (tx, rx) = unbounded::<HostCommand>();
    drop(tx);
    run_host_loop(&mut host.state, &rx).unwrap();
    assert!(!host.state.shutdown);
}

#[test]
fn events_serialize_with_event_tag() {
    let json = serde_json::to_value(HostEvent::ShowSoftInput {
        token: None,
        flags: 2,
    })
    .unwrap();
    assert_eq!(json, serde_json::json!({"event": "show_soft_input", "flags": 2}));

    let json = serde_json::to_value(HostEvent::CurrentLocale {
        locale: Locale::new("en", Some("US")),
        accessor: "legacy".to_string(),
    })
    .unwrap();
    assert_eq!(
        json,
        serde_json::json!({"event": "locale", "locale": "en_US", "accessor": "legacy"})
    );

    let json = serde_json::to_value(HostEvent::PermissionRequested {
        permissions: vec![Permission::PostNotifications],
        request_code: 0,
    })
    .unwrap();
    assert_eq!(
        json["permissions"][0],
        "android.permission.POST_NOTIFICATIONS"
    );
}

#[test]
fn commands_reject_unknown_tags() {
    assert!(serde_json::from_str::<HostCommand>(r#"{"cmd":"reboot"}"#).is_err());
    assert!(serde_json::from_str::<HostCommand>(r#"{"action":"x"}"#).is_err());
    assert!(matches!(
        serde_json::from_str::<HostCommand>(r#"{"cmd":"shutdown"}"#),
        Ok(HostCommand::Shutdown)
    ));
}
