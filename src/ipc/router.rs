use std::sync::atomic::Ordering;

use super::protocol::{HostCommand, HostEvent};
use super::session::HostState;
use crate::capability::Locale;
use crate::ime::WindowToken;
use crate::log_debug;
use crate::permission::{outcome_for, GrantResult, Permission, NOTIFICATION_REQUEST_CODE};
use crate::prefs::PreferenceStore;
use crate::signal::{Action, Signal};

pub(super) fn handle_command(state: &mut HostState, cmd: HostCommand) {
    match cmd {
        HostCommand::Broadcast { action } => handle_broadcast(state, action),
        HostCommand::PermissionResult {
            request_code,
            permissions,
            grant_results,
        } => handle_permission_result(state, request_code, &permissions, &grant_results),
        HostCommand::SetPreference { key, value } => handle_set_preference(state, &key, value),
        HostCommand::AttachToken { token } => handle_attach_token(state, token),
        HostCommand::GetLocale => emit_locale(state),
        HostCommand::SetLocale { locale } => handle_set_locale(state, &locale),
        HostCommand::GetState => state.emit_state(),
        HostCommand::Shutdown => {
            log_debug("shutdown requested");
            state.shutdown = true;
        }
    }
}

fn send_error(state: &HostState, message: String) {
    state.events.send_event(HostEvent::Error {
        message,
        recoverable: true,
    });
}

pub(super) fn handle_broadcast(state: &mut HostState, action: String) {
    let signal = Signal::from_identifier(action);
    if signal.action().is_none() {
        log_debug(&format!("broadcasting unknown action {}", signal.identifier()));
    }
    state.events.send_event(HostEvent::SignalEmitted {
        action: signal.identifier().to_string(),
    });
    state.bus.emit(signal);
}

pub(super) fn handle_permission_result(
    state: &mut HostState,
    request_code: i32,
    permissions: &[Permission],
    grant_results: &[GrantResult],
) {
    let Some(requester) = state.requester.as_mut() else {
        send_error(state, "No permission screen is showing".to_string());
        return;
    };

    // The host records the user's decision before the screen hears about it.
    if request_code == NOTIFICATION_REQUEST_CODE && !requester.is_finished() {
        let granted = if permissions.is_empty() {
            outcome_for(grant_results) == Action::NotificationGranted
        } else {
            permissions
                .iter()
                .zip(grant_results)
                .find(|(permission, _)| **permission == Permission::PostNotifications)
                .is_some_and(|(_, result)| *result == GrantResult::Granted)
        };
        state.permission_granted.store(granted, Ordering::SeqCst);
    }

    if let Some(action) =
        requester.on_request_permissions_result(request_code, permissions, grant_results)
    {
        state.events.send_event(HostEvent::SignalEmitted {
            action: action.as_str().to_string(),
        });
    }
    if requester.is_finished() {
        state.requester = None;
    }
}

pub(super) fn handle_set_preference(state: &mut HostState, key: &str, value: bool) {
    if let Err(err) = state.prefs.put_bool(key, value) {
        send_error(state, format!("Failed to write preference {key}: {err:#}"));
    }
}

pub(super) fn handle_attach_token(state: &mut HostState, token: String) {
    if !state.ime.attach_token(WindowToken::new(token)) {
        send_error(state, "Window token already attached".to_string());
    }
}

pub(super) fn handle_set_locale(state: &mut HostState, raw: &str) {
    match raw.parse::<Locale>() {
        Ok(locale) => {
            state
                .locale_accessor
                .set(&mut state.configuration, locale);
            emit_locale(state);
        }
        Err(err) => send_error(state, err.to_string()),
    }
}

fn emit_locale(state: &HostState) {
    state.events.send_event(HostEvent::CurrentLocale {
        locale: state.locale_accessor.get(&state.configuration),
        accessor: state.locale_accessor.label().to_string(),
    });
}
