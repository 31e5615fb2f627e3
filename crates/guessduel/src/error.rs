//! Unified error type for the guessduel server.

use guessduel_protocol::ProtocolError;
use guessduel_room::RoomError;
use guessduel_session::SessionError;
use guessduel_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attributes let `?` lift sub-crate errors without
/// explicit `map_err` calls.
#[derive(Debug, thiserror::Error)]
pub enum GuessDuelError {
    /// A transport-level error (bind, accept, send, recv, framing).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed budget).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry error (double registration, bad pairing).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room error (invalid bounds).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use guessduel_transport::ConnectionId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::FrameTooLong { limit: 64 };
        let duel_err: GuessDuelError = err.into();
        assert!(matches!(duel_err, GuessDuelError::Transport(_)));
        assert!(duel_err.to_string().contains("64 bytes"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::TooManyMalformed(5);
        let duel_err: GuessDuelError = err.into();
        assert!(matches!(duel_err, GuessDuelError::Protocol(_)));
        assert!(duel_err.to_string().contains('5'));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotRegistered(ConnectionId::new(1));
        let duel_err: GuessDuelError = err.into();
        assert!(matches!(duel_err, GuessDuelError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::InvalidBounds { lower: 9, upper: 1 };
        let duel_err: GuessDuelError = err.into();
        assert!(matches!(duel_err, GuessDuelError::Room(_)));
    }
}
