//! Room configuration and state machine.

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// The inclusive range a room's secret number is drawn from.
///
/// Fixed for the lifetime of every room built from it. Deserializing
/// goes through [`RoomConfig::new`], so inverted bounds are rejected
/// there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoomConfig")]
pub struct RoomConfig {
    lower_bound: i64,
    upper_bound: i64,
}

impl RoomConfig {
    /// Creates a config for secrets in `[lower_bound, upper_bound]`.
    ///
    /// # Errors
    /// [`RoomError::InvalidBounds`] if `lower_bound > upper_bound`.
    /// Equal bounds are allowed and pin the secret to one value.
    pub fn new(lower_bound: i64, upper_bound: i64) -> Result<Self, RoomError> {
        if lower_bound > upper_bound {
            return Err(RoomError::InvalidBounds {
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        Ok(Self {
            lower_bound,
            upper_bound,
        })
    }

    /// The smallest possible secret.
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }

    /// The largest possible secret.
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    /// Returns `true` if `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        (self.lower_bound..=self.upper_bound).contains(&value)
    }
}

/// Unvalidated wire shape of a [`RoomConfig`].
#[derive(Deserialize)]
struct RawRoomConfig {
    lower_bound: i64,
    upper_bound: i64,
}

impl TryFrom<RawRoomConfig> for RoomConfig {
    type Error = RoomError;

    fn try_from(raw: RawRoomConfig) -> Result<Self, Self::Error> {
        Self::new(raw.lower_bound, raw.upper_bound)
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            lower_bound: 0,
            upper_bound: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Active ──(correct guess)──→ Over
/// ```
///
/// - **Active**: guesses are compared against the secret.
/// - **Over**: someone guessed it. Terminal; every later guess is
///   answered with [`GuessOutcome::AlreadyOver`](crate::GuessOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Active,
    Over,
}

impl RoomState {
    /// Returns `true` if guesses are still being evaluated.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Over => write!(f, "Over"),
        }
    }
}
