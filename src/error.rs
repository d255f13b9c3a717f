//! Error handling module
//!
//! Defines custom error types for the session layer.

use thiserror::Error;

use crate::protocol::packets::PacketDecodeError;

/// Main error type for the session layer
#[derive(Error, Debug)]
pub enum SessionError {
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Protocol-related errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Network-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Write buffer full")]
    WriteBufferFull,

    #[error("Session not found: {0}")]
    SessionNotFound(u64),
}

/// Protocol-specific errors
///
/// None of these terminate a session on their own: the packet that caused
/// them is dropped and the caller decides what to do next.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("incorrect entity runtime ID {reported}: runtime ID must be equal to {expected}")]
    RuntimeIdMismatch { reported: u64, expected: u64 },

    #[error("Unknown packet ID: {0:#x}")]
    UnknownPacket(u32),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Packet too large: {size} bytes (max: {max})")]
    PacketTooLarge { size: usize, max: usize },
}

impl From<PacketDecodeError> for ProtocolError {
    fn from(err: PacketDecodeError) -> Self {
        match err {
            PacketDecodeError::UnknownPacket(id) => ProtocolError::UnknownPacket(id),
            other => ProtocolError::MalformedPacket(other.to_string()),
        }
    }
}

impl From<PacketDecodeError> for SessionError {
    fn from(err: PacketDecodeError) -> Self {
        SessionError::Protocol(err.into())
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_id_mismatch_display() {
        let err = ProtocolError::RuntimeIdMismatch {
            reported: 7,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "incorrect entity runtime ID 7: runtime ID must be equal to 1"
        );
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: ProtocolError = PacketDecodeError::UnknownPacket(0x99).into();
        assert_eq!(err, ProtocolError::UnknownPacket(0x99));

        let err: ProtocolError = PacketDecodeError::InsufficientData {
            expected: 4,
            actual: 1,
        }
        .into();
        assert!(matches!(err, ProtocolError::MalformedPacket(_)));
    }

    #[test]
    fn test_error_display() {
        let err = NetworkError::ConnectionClosed;
        assert_eq!(err.to_string(), "Connection closed");

        let err = SessionError::from(ProtocolError::UnknownPacket(0x13));
        assert_eq!(err.to_string(), "Protocol error: Unknown packet ID: 0x13");

        let err = SessionError::from(NetworkError::SessionNotFound(9));
        assert_eq!(err.to_string(), "Network error: Session not found: 9");
    }
}
