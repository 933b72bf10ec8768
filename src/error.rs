//! Error types for DrishtiIO
//!
//! # Error Recovery Strategies
//!
//! Different error types require different recovery approaches:
//!
//! ## Transient Errors (Retry Recommended)
//!
//! - **`Timeout`**: No datagram or command reply arrived within the configured
//!   timeout. The session stays usable; call the operation again.
//!
//! - **`Parse`**: A measurement datagram or command reply was malformed. The
//!   previous snapshot remains current and the next receive can be attempted.
//!
//! ## Fatal to One Interface (Other Interface Unaffected)
//!
//! - **`Net`** on the command channel: the TCP session is dead and all further
//!   commands fail until the SDK is reconstructed. Measurement reception keeps
//!   working.
//!
//! - **`Net`** on the data channel: the UDP socket could not be bound or has
//!   been closed. Commands keep working.
//!
//! ## Configuration Errors (Fix and Retry)
//!
//! - **`Connection`**: The connection string or settings file is invalid.
//! - **`Io`**: Socket setup failed (port in use, no permission, bad address).

use thiserror::Error;

/// Errors that can occur in DrishtiIO
///
/// See module-level documentation for recovery strategies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("receive timeout")]
    Timeout,

    #[error("network interface unusable: {0}")]
    Net(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid connection string: {0}")]
    Connection(String),

    #[error("command refused: {0}")]
    Command(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error code kept per transmission channel.
///
/// The session retains one of these for the data channel and one for the
/// command channel after every operation that can fail, so callers that
/// prefer polling over matching on [`Error`] can inspect the most recent
/// outcome at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    /// Last operation on this channel succeeded
    #[default]
    None,
    /// Last operation timed out
    Timeout,
    /// Socket error, or the channel is not usable at all
    Net,
    /// Received data could not be parsed
    Parse,
}

impl ErrorKind {
    /// Classify an [`Error`] for channel bookkeeping.
    pub(crate) fn of(err: &Error) -> Self {
        match err {
            Error::Timeout => ErrorKind::Timeout,
            Error::Parse(_) => ErrorKind::Parse,
            _ => ErrorKind::Net,
        }
    }
}
