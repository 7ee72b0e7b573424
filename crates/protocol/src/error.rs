//! Protocol error types

use thiserror::Error;

/// Errors raised while resolving commands or decoding device responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A raw command code with no entry in the descriptor table.
    #[error("unknown command code {0:#06x}")]
    UnknownCommand(u16),

    /// Response shorter than the layout the decoder expects.
    #[error("response too short: expected {expected} bytes, got {actual}")]
    ShortResponse { expected: usize, actual: usize },

    /// An information field that does not carry the expected text.
    #[error("malformed information field: {0}")]
    MalformedField(String),
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
