//! FastCGI transport errors
//!
//! Distinguishes failures to reach a pool from failures that happen once the
//! exchange is under way, so callers can log them differently.

use std::io;
use thiserror::Error;

use super::record::ProtocolStatus;
use crate::types::Protocol;

/// Errors from a single status exchange with a pool
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Could not open the socket
    #[error("failed to connect to {protocol}://{address}: {source}")]
    Connect {
        protocol: Protocol,
        address: String,
        #[source]
        source: io::Error,
    },

    /// Connect, read or write exceeded the configured timeout
    #[error("FastCGI exchange timed out")]
    Timeout,

    /// I/O error during the exchange
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// Malformed or incomplete record stream
    #[error("FastCGI protocol error: {0}")]
    Protocol(String),

    /// `END_REQUEST` carried a non-success protocol status
    #[error("request rejected by pool: {0}")]
    Rejected(ProtocolStatus),

    /// STDOUT grew past the accumulation limit
    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

impl TransportError {
    /// The pool could not be reached at all
    #[must_use]
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Wrap a connect-phase I/O error, keeping timeouts distinct
    pub(super) fn connect(protocol: Protocol, address: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Connect {
                protocol,
                address: address.to_string(),
                source,
            },
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Socket timeouts surface as WouldBlock on Unix and TimedOut on Windows
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::UnexpectedEof => {
                Self::Protocol("connection closed before END_REQUEST".to_string())
            }
            io::ErrorKind::InvalidData => Self::Protocol(e.to_string()),
            _ => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_kinds_map_to_timeout() {
        let e: TransportError = io::Error::from(io::ErrorKind::WouldBlock).into();
        assert!(matches!(e, TransportError::Timeout));
        let e: TransportError = io::Error::from(io::ErrorKind::TimedOut).into();
        assert!(matches!(e, TransportError::Timeout));
    }

    #[test]
    fn test_eof_is_protocol_error() {
        let e: TransportError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(e.to_string().contains("before END_REQUEST"));
    }

    #[test]
    fn test_connect_failure_display() {
        let e = TransportError::connect(
            Protocol::Tcp,
            "127.0.0.1:1",
            io::Error::from(io::ErrorKind::ConnectionRefused),
        );
        assert!(e.is_connect_failure());
        assert!(e.to_string().starts_with("failed to connect to tcp://127.0.0.1:1"));
    }

    #[test]
    fn test_connect_timeout_is_not_connect_failure() {
        let e = TransportError::connect(
            Protocol::Unix,
            "/run/php.sock",
            io::Error::from(io::ErrorKind::TimedOut),
        );
        assert!(matches!(e, TransportError::Timeout));
        assert!(!e.is_connect_failure());
    }

    #[test]
    fn test_rejected_display() {
        let e = TransportError::Rejected(ProtocolStatus::Overloaded);
        assert_eq!(e.to_string(), "request rejected by pool: overloaded");
    }
}
