//! Session types: the per-connection state machine and its outbox.
//!
//! A "session" is the server's view of one connected player. It tracks:
//! - WHAT phase the player is in (naming, waiting, playing, gone)
//! - HOW other sessions reach it (an [`Outbound`] channel)

use std::sync::Arc;

use guessduel_protocol::ServerMessage;
use guessduel_room::Room;
use guessduel_transport::ConnectionId;
use tokio::sync::mpsc;

/// Longest nickname accepted, in characters.
pub const MAX_NICKNAME_LEN: usize = 32;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The phase a connection's session is in.
///
/// ```text
/// AwaitingNickname ──→ Waiting ──→ Paired ──→ Playing ──→ Terminated
///         │                           ↑
///         └───────────────────────────┘  (an opponent was already waiting)
/// ```
///
/// Every state can also drop straight to `Terminated` when the peer
/// disconnects, leaves, or keeps sending garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Prompting for a nickname.
    AwaitingNickname,
    /// Named, sitting in the waiting slot.
    Waiting,
    /// Matched with an opponent; setup messages are being exchanged.
    Paired,
    /// Guesses are being evaluated.
    Playing,
    /// Torn down. Terminal.
    Terminated,
}

impl SessionState {
    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        use SessionState::*;
        match (self, target) {
            (Terminated, _) => false,
            (_, Terminated) => true,
            (AwaitingNickname, Waiting | Paired) => true,
            (Waiting, Paired) => true,
            (Paired, Playing) => true,
            _ => false,
        }
    }

    /// Returns `true` once the session has an opponent.
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired | Self::Playing)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingNickname => write!(f, "AwaitingNickname"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Paired => write!(f, "Paired"),
            Self::Playing => write!(f, "Playing"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// Something one session hands to another.
///
/// Sessions never write to each other's sockets. They push onto the
/// target's outbox, and the target's own task writes, so each socket
/// sees its messages in the order they were queued.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A waiting session has been matched. Sent by [`Registry::pair`]
    /// to the connection that was in the waiting slot.
    ///
    /// [`Registry::pair`]: crate::Registry::pair
    Paired {
        opponent: ConnectionId,
        room: Arc<Room>,
    },
    /// A protocol message to forward to the client verbatim.
    Message(ServerMessage),
}

/// Channel sender for delivering [`Outbound`] items to a session.
pub type PeerSender = mpsc::UnboundedSender<Outbound>;

/// The receiving end a session drains.
pub type PeerReceiver = mpsc::UnboundedReceiver<Outbound>;

// ---------------------------------------------------------------------------
// Nicknames
// ---------------------------------------------------------------------------

/// Trims a requested nickname and checks it is usable.
///
/// Returns `None` for names that are blank after trimming or longer
/// than [`MAX_NICKNAME_LEN`] characters; the handshake re-prompts.
pub fn normalize_nickname(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_NICKNAME_LEN {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use SessionState::*;
        assert!(AwaitingNickname.can_transition_to(Waiting));
        assert!(Waiting.can_transition_to(Paired));
        assert!(Paired.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Terminated));
    }

    #[test]
    fn test_second_arrival_skips_waiting() {
        assert!(SessionState::AwaitingNickname.can_transition_to(SessionState::Paired));
    }

    #[test]
    fn test_every_live_state_can_terminate() {
        use SessionState::*;
        for state in [AwaitingNickname, Waiting, Paired, Playing] {
            assert!(state.can_transition_to(Terminated), "{state}");
        }
    }

    #[test]
    fn test_terminated_is_final() {
        use SessionState::*;
        for state in [AwaitingNickname, Waiting, Paired, Playing, Terminated] {
            assert!(!Terminated.can_transition_to(state), "{state}");
        }
    }

    #[test]
    fn test_no_backwards_transitions() {
        use SessionState::*;
        assert!(!Playing.can_transition_to(Waiting));
        assert!(!Paired.can_transition_to(AwaitingNickname));
        assert!(!Waiting.can_transition_to(Playing));
    }

    #[test]
    fn test_is_paired() {
        assert!(!SessionState::Waiting.is_paired());
        assert!(SessionState::Paired.is_paired());
        assert!(SessionState::Playing.is_paired());
        assert!(!SessionState::Terminated.is_paired());
    }

    #[test]
    fn test_normalize_nickname_trims() {
        assert_eq!(normalize_nickname("  Ann \t"), Some("Ann".into()));
    }

    #[test]
    fn test_normalize_nickname_rejects_blank() {
        assert_eq!(normalize_nickname(""), None);
        assert_eq!(normalize_nickname("   "), None);
    }

    #[test]
    fn test_normalize_nickname_limits_length_in_chars() {
        let max = "é".repeat(MAX_NICKNAME_LEN);
        assert_eq!(normalize_nickname(&max), Some(max.clone()));
        assert_eq!(normalize_nickname(&format!("{max}x")), None);
    }
}
