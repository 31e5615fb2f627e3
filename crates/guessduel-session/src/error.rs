//! Error types for the session layer.

use guessduel_transport::ConnectionId;

/// Errors that can occur while registering or pairing connections.
///
/// Every variant is a caller bug (the handler asked for something out
/// of order), never something a remote player can trigger.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The connection already recorded a nickname; it is immutable.
    #[error("{0} already has a nickname")]
    AlreadyRegistered(ConnectionId),

    /// The connection never recorded a nickname.
    #[error("{0} is not registered")]
    NotRegistered(ConnectionId),

    /// The connection is already waiting or already paired.
    #[error("{0} is already waiting or paired")]
    AlreadyMatched(ConnectionId),

    /// A connection cannot be paired with itself.
    #[error("{0} cannot be paired with itself")]
    SelfPairing(ConnectionId),
}
