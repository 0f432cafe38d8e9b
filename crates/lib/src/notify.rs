//! User-visible notifications.
//!
//! The library never renders anything itself; instead, everything a
//! front-end would surface as a toast flows through a broadcast channel.
//! There are three kinds: success messages from mutations, a single error
//! notification per failed operation (carrying the server's message when it
//! sent one), and the session-expiry signal emitted by the refresh
//! interceptor. Failures of the refresh endpoint itself never produce a
//! generic error notification; the expiration path owns those.

use tokio::sync::broadcast;

/// Default capacity of the notification channel.
const CHANNEL_CAPACITY: usize = 64;

/// Message shown by the refresh interceptor when the session cannot be
/// renewed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please login again.";

/// Fallback for failures that carry no server message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Server connection failed";

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A success message, e.g. "Task created successfully".
    Info(String),
    /// A failed operation, carrying the most specific message available.
    Error(String),
    /// The session could not be refreshed; the user must log in again.
    SessionExpired,
}

/// Broadcast fan-out for notifications.
///
/// Cloning is cheap; all clones publish into the same channel. Sending never
/// fails: with no subscribers the notification is simply dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all notifications published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish a success message.
    pub fn info(&self, message: impl Into<String>) {
        let _ = self.tx.send(Notification::Info(message.into()));
    }

    /// Publish an error message.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(Notification::Error(message.into()));
    }

    /// Publish the session-expiry signal.
    pub fn session_expired(&self) {
        let _ = self.tx.send(Notification::SessionExpired);
    }

    /// Convert a failed operation into a single error notification.
    ///
    /// Expired-session failures are skipped here: the interceptor has already
    /// published [`Notification::SessionExpired`], and doubling up would show
    /// the user two toasts for one event.
    pub fn report_failure(&self, err: &crate::Error) {
        if err.is_auth_expired() {
            return;
        }
        let message = err
            .api_message()
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string();
        self.error(message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
