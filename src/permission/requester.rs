use super::{GrantResult, Permission};
use crate::log_debug;
use crate::signal::{Action, SignalSender};

/// Request code tagged on the notification permission request.
pub const NOTIFICATION_REQUEST_CODE: i32 = 0;

/// Host side of a permission screen.
pub trait PermissionHost {
    fn request_permissions(&mut self, permissions: &[Permission], request_code: i32);

    /// Platform default handling for results this screen did not ask for.
    fn default_permissions_result(
        &mut self,
        request_code: i32,
        permissions: &[Permission],
        grant_results: &[GrantResult],
    );

    /// Close the screen.
    fn finish(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequesterState {
    Created,
    Requested,
    Finished,
}

/// Asks for `POST_NOTIFICATIONS` once and broadcasts the answer.
pub struct PermissionRequester<H: PermissionHost> {
    host: H,
    signals: SignalSender,
    state: RequesterState,
}

/// Empty results fail closed.
pub fn outcome_for(grant_results: &[GrantResult]) -> Action {
    match grant_results.first() {
        Some(GrantResult::Granted) => Action::NotificationGranted,
        _ => Action::NotificationDenied,
    }
}

impl<H: PermissionHost> PermissionRequester<H> {
    pub fn new(host: H, signals: SignalSender) -> Self {
        Self {
            host,
            signals,
            state: RequesterState::Created,
        }
    }

    /// Issue the single permission request. Later calls do nothing.
    pub fn on_create(&mut self) {
        if self.state != RequesterState::Created {
            return;
        }
        self.state = RequesterState::Requested;
        log_debug("requesting POST_NOTIFICATIONS");
        self.host
            .request_permissions(&[Permission::PostNotifications], NOTIFICATION_REQUEST_CODE);
    }

    /// Handle the host's answer. Returns the emitted action when this screen
    /// consumed the result.
    pub fn on_request_permissions_result(
        &mut self,
        request_code: i32,
        permissions: &[Permission],
        grant_results: &[GrantResult],
    ) -> Option<Action> {
        if request_code != NOTIFICATION_REQUEST_CODE {
            self.host
                .default_permissions_result(request_code, permissions, grant_results);
            return None;
        }
        if self.state == RequesterState::Finished {
            log_debug("permission result after finish ignored");
            return None;
        }

        let action = outcome_for(grant_results);
        log_debug(&format!("permission result -> {}", action.as_str()));
        self.signals.emit(action);
        self.state = RequesterState::Finished;
        self.host.finish();
        Some(action)
    }

    pub fn is_finished(&self) -> bool {
        self.state == RequesterState::Finished
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}
