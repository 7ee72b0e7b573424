//! Driver error types

use protocol::SessionId;
use thiserror::Error;

/// Errors surfaced by the session manager and the protocol engine.
///
/// Transport failures propagate verbatim and are never retried internally;
/// in particular [`Error::Timeout`] stays distinguishable from
/// [`Error::DeviceIo`] because drain loops terminate on the former and must
/// abort on the latter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No session registered under the id, or the session is gone.
    #[error("no session registered under id {0:?}")]
    NotFound(SessionId),

    /// The session is already open.
    #[error("session {0:?} is already open")]
    Busy(SessionId),

    /// The endpoint layout matches no supported spectrometer variant.
    #[error("endpoint layout matches no supported spectrometer variant")]
    TopologyMismatch,

    /// Command code with no descriptor table entry.
    #[error("command code {0:#06x} is not supported")]
    NotSupported(u16),

    /// A command argument outside its accepted range, or missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A bulk transfer failed outright or the device is gone.
    #[error("device I/O failed: {0}")]
    DeviceIo(String),

    /// A bulk read did not complete within its timeout.
    #[error("bulk transfer timed out")]
    Timeout,

    /// Caller buffer cannot hold the expected response.
    #[error("caller buffer too small: need {needed}, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// The session id slot is already taken.
    #[error("session id {0:?} is already in use")]
    ResourceExhausted(SessionId),
}

/// Type alias for driver results
pub type Result<T> = std::result::Result<T, Error>;
