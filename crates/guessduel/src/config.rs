//! Server-wide settings.

use std::time::Duration;

use guessduel_room::RoomConfig;

/// How long a fresh connection has to send a usable nickname.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(60);

/// Consecutive undecodable frames tolerated before a connection is
/// dropped. The frame that reaches this count terminates the session.
pub const DEFAULT_MAX_DECODE_FAILURES: u32 = 5;

/// Settings shared by every connection handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bounds every room draws its secret from.
    pub room: RoomConfig,

    /// Send `correct_number_reveal` to both players when a game starts.
    ///
    /// Existing clients expect it, so it defaults to on.
    pub reveal_secret_on_start: bool,

    /// Deadline for the nickname handshake.
    pub handshake_timeout: Duration,

    /// See [`DEFAULT_MAX_DECODE_FAILURES`].
    pub max_decode_failures: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            reveal_secret_on_start: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            max_decode_failures: DEFAULT_MAX_DECODE_FAILURES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.room.lower_bound(), 0);
        assert_eq!(config.room.upper_bound(), 500);
        assert!(config.reveal_secret_on_start);
        assert_eq!(config.handshake_timeout, Duration::from_secs(60));
        assert_eq!(config.max_decode_failures, 5);
    }
}
