//! Error types for the responder and initiator.

use derive_more::{Display, Error};
use noughts_wire::{WireError, WireErrorKind};
use tracing::instrument;

/// Failure that ends an initiator session.
#[derive(Debug, Clone, Display, Error)]
pub enum ClientError {
    /// Transport or framing failure.
    #[display("{}", _0)]
    Wire(WireError),

    /// The responder sent something the current state does not allow.
    #[display("Protocol violation: {}", _0)]
    ProtocolViolation(#[error(not(source))] String),

    /// The player could not supply input.
    #[display("Player input failed: {}", _0)]
    Player(#[error(not(source))] String),
}

impl ClientError {
    /// Creates a protocol violation.
    #[instrument(skip(message))]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolViolation(message.into())
    }

    /// True for transient transport errors, where resending the same
    /// request is allowed. Timeouts and a vanished peer are not transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Wire(err) => {
                matches!(err.kind(), WireErrorKind::Io(..)) && !err.is_connection_failure()
            }
            ClientError::ProtocolViolation(_) | ClientError::Player(_) => false,
        }
    }

    /// True when the connection itself is gone or silent.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ClientError::Wire(err) if err.is_connection_failure())
    }
}

impl From<WireError> for ClientError {
    fn from(err: WireError) -> Self {
        match err.kind() {
            WireErrorKind::UnknownOpcode(_) | WireErrorKind::InvalidField(_) => {
                Self::ProtocolViolation(err.to_string())
            }
            _ => Self::Wire(err),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
