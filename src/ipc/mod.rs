//! Headless host speaking JSON lines over stdin/stdout.
//!
//! The host stands in for the operating system around the keyboard service:
//! it owns the process-wide signal bus, the preference file, the permission
//! screen, and the notification manager, and reports every collaborator call
//! as an event so a driver process can script and observe the whole flow.
//!
//! Architecture:
//! - Stdin reader thread: parses commands, forwards them over a channel
//! - Main loop: applies commands, then pumps the bus, preference changes, and
//!   permission-screen launches until quiet
//!
//! Protocol:
//! - Each line is a JSON object
//! - Events (host → driver): {"event": "...", ...}
//! - Commands (driver → host): {"cmd": "...", ...}

mod host;
mod protocol;
mod router;
mod session;

#[cfg(test)]
mod tests;

pub use protocol::{HostCommand, HostEvent};
pub use session::run_host;
