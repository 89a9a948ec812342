//! Wire error types.

use derive_more::{Display, Error};
use std::io;
use std::time::Duration;
use tracing::instrument;

/// What went wrong while reading or writing the byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WireErrorKind {
    /// End of stream before a fixed-length field was complete.
    #[display("truncated stream")]
    Truncated,

    /// No data arrived within the read deadline.
    #[display("timed out after {:?}", _0)]
    Timeout(Duration),

    /// Underlying transport failure.
    #[display("I/O error ({:?}): {}", _0, _1)]
    Io(io::ErrorKind, String),

    /// Leading byte is not a defined opcode.
    #[display("unknown opcode {}", _0)]
    UnknownOpcode(u8),

    /// A field holds a value outside its defined range.
    #[display("invalid field: {}", _0)]
    InvalidField(String),
}

/// Wire error with location tracking.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Wire error: {} at {}:{}", kind, file, line)]
pub struct WireError {
    /// Error classification.
    pub kind: WireErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl WireError {
    /// Creates a new wire error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: WireErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> &WireErrorKind {
        &self.kind
    }

    /// True when the connection can no longer be used: truncation, read
    /// deadline expiry, or the peer going away.
    pub fn is_connection_failure(&self) -> bool {
        match &self.kind {
            WireErrorKind::Truncated | WireErrorKind::Timeout(_) => true,
            WireErrorKind::Io(kind, _) => matches!(
                kind,
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::WriteZero
            ),
            WireErrorKind::UnknownOpcode(_) | WireErrorKind::InvalidField(_) => false,
        }
    }
}

impl From<io::Error> for WireError {
    #[track_caller]
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::new(WireErrorKind::Truncated),
            kind => Self::new(WireErrorKind::Io(kind, err.to_string())),
        }
    }
}
