//! Error types for the wire layer.
//!
//! [`ProtocolError`] covers everything the codec can fail on while framing
//! and parsing lines; [`MessageParseError`] is the narrower cause attached
//! to a line that was framed correctly but could not be turned into an
//! [`Event`](crate::Event).

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors produced while reading or writing protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
        /// Decoder message.
        details: String,
    },

    /// A line contained a control character that may not appear on the wire.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// A framed line could not be parsed into an event.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The offending line, without its terminator.
        string: String,
        /// Why parsing failed.
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// Whether the error concerns one line only. The stream stays usable
    /// after a recoverable error; only I/O failures are fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Reasons a single line fails to parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line was empty or only whitespace.
    #[error("empty message")]
    EmptyMessage,

    /// A source prefix or tag block was present but no command followed.
    #[error("missing command")]
    MissingCommand,

    /// The command token was neither alphabetic nor a three-digit numeric.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// More than 15 parameters (including the trailing one).
    #[error("too many parameters: {0}")]
    TooManyParams(usize),
}
