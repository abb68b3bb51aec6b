//! Error types for the beo-stream crate.

/// Errors raised while classifying a notification.
///
/// These never leave the router: [`NotificationRouter::route`](crate::NotificationRouter::route)
/// logs them and drops the notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A field the notification kind requires is missing or empty
    #[error("Malformed {kind} notification: {reason}")]
    MalformedNotification {
        /// Wire kind of the notification
        kind: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A key state that has no logical key event
    #[error("Unknown key state {state:?} in {kind} notification")]
    UnknownKeyState {
        /// Wire kind of the notification
        kind: &'static str,
        /// The raw state string
        state: String,
    },
}

impl StreamError {
    pub(crate) fn missing(kind: &'static str, field: &str) -> Self {
        StreamError::MalformedNotification {
            kind,
            reason: format!("missing required field `{}`", field),
        }
    }
}

/// Result type for beo-stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
