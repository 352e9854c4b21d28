// ABOUTME: Error types for the emulated modem session
// ABOUTME: Separates transport failures from caller mistakes such as a second run or a bad temperature

use std::io;
use thiserror::Error;

/// Errors surfaced by [`Heatpump`](crate::session::Heatpump) and its handle
///
/// Protocol problems (unknown commands, bad slot numbers, undecodable
/// messages) never show up here; they are answered on the wire and the
/// session carries on.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error on the transport
    #[error("Connection error: {0}")]
    Connection(io::Error),

    /// The transport reached end of stream
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// `run` was called on a session that already ran
    #[error("Session can only run once")]
    AlreadyRun,

    /// Temperature requests must be non-negative integers
    #[error("Invalid temperature: {0}, expected a non-negative integer")]
    InvalidTemperature(i64),

    /// Session configuration rejected before start
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The session behind a handle has been dropped
    #[error("Session is gone")]
    Detached,
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => SessionError::ConnectionClosed,
            _ => SessionError::Connection(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_maps_to_connection_closed() {
        let err = SessionError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, SessionError::ConnectionClosed));
    }

    #[test]
    fn test_other_io_errors_are_kept() {
        let err = SessionError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        match err {
            SessionError::Connection(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(SessionError::AlreadyRun.to_string(), "Session can only run once");
        assert_eq!(
            SessionError::InvalidTemperature(-3).to_string(),
            "Invalid temperature: -3, expected a non-negative integer"
        );
    }
}
