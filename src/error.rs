//! Unified error handling for the slirc client.
//!
//! Caller-facing operations return [`ClientError`]. Transport failures seen
//! by the read loop never reach callers directly; they drive the reconnect
//! state machine instead.

use std::time::Duration;

use slirc_proto::ProtocolError;
use thiserror::Error;

use crate::callback::CallbackId;
use crate::config::ValidationError;

// ============================================================================
// Client Errors
// ============================================================================

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration failed validation; nothing was sent.
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error("not connected")]
    NotConnected,

    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    #[error("invalid target: {0:?}")]
    InvalidTarget(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// A request/response exchange saw no completion in time.
    #[error("callback {} timed out after {timeout:?}", format_ids(.ids))]
    Timeout {
        ids: Vec<CallbackId>,
        timeout: Duration,
    },

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Reconnect gave up; the client is stopped for good.
    #[error("reconnect failed after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// The client was stopped after exhausting reconnects and cannot be
    /// reused.
    #[error("client terminated")]
    Terminated,
}

impl ClientError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NotConnected => "not_connected",
            Self::AlreadyConnecting => "already_connecting",
            Self::InvalidTarget(_) => "invalid_target",
            Self::InvalidEvent(_) => "invalid_event",
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::ReconnectExhausted { .. } => "reconnect_exhausted",
            Self::Terminated => "terminated",
        }
    }
}

impl From<Vec<ValidationError>> for ClientError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Config(errors)
    }
}

/// Result type for client operations.
pub type ClientResult<T = ()> = Result<T, ClientError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_ids(ids: &[CallbackId]) -> String {
    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", ids.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClientError::NotConnected.error_code(), "not_connected");
        assert_eq!(
            ClientError::ReconnectExhausted { attempts: 3 }.error_code(),
            "reconnect_exhausted"
        );
    }

    #[test]
    fn test_timeout_message_lists_ids() {
        let id = CallbackId::new();
        let err = ClientError::Timeout {
            ids: vec![id],
            timeout: Duration::from_secs(2),
        };
        let msg = err.to_string();
        assert!(msg.contains(&id.to_string()));
        assert!(msg.contains("2s"));
    }

    #[test]
    fn test_config_message_joins_errors() {
        let err = ClientError::from(vec![
            ValidationError::EmptyHost,
            ValidationError::InvalidPort(7),
        ]);
        assert_eq!(err.error_code(), "config");
        assert!(err.to_string().contains("; "));
    }
}
