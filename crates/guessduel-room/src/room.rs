//! The room: one secret number shared by two paired players.
//!
//! A room has no task of its own. Both players' connection handlers hold
//! an `Arc<Room>` and call [`Room::evaluate`] directly; the only mutable
//! piece is the game-over flag, flipped with a single compare-and-swap.

use std::cmp::Ordering as Compare;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{RoomConfig, RoomError, RoomState};

/// A unique identifier for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// The result of evaluating one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess is below the secret; the secret is higher.
    TooLow,
    /// The guess is above the secret; the secret is lower.
    TooHigh,
    /// The guess is the secret. Returned at most once per room.
    Correct,
    /// Someone already won. The guess must be discarded.
    AlreadyOver,
}

/// One game instance.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    secret: i64,
    over: AtomicBool,
}

impl Room {
    /// Creates a room with a secret drawn uniformly from the config's
    /// inclusive bounds.
    pub fn new(id: RoomId, config: RoomConfig) -> Self {
        let secret = rand::rng()
            .random_range(config.lower_bound()..=config.upper_bound());
        tracing::debug!(room_id = %id, "secret drawn");
        Self::build(id, config, secret)
    }

    /// Creates a room with a fixed secret.
    ///
    /// # Errors
    /// [`RoomError::SecretOutOfBounds`] if `secret` is outside the
    /// config's bounds.
    pub fn with_secret(
        id: RoomId,
        config: RoomConfig,
        secret: i64,
    ) -> Result<Self, RoomError> {
        if !config.contains(secret) {
            return Err(RoomError::SecretOutOfBounds {
                secret,
                lower: config.lower_bound(),
                upper: config.upper_bound(),
            });
        }
        Ok(Self::build(id, config, secret))
    }

    fn build(id: RoomId, config: RoomConfig, secret: i64) -> Self {
        Self {
            id,
            config,
            secret,
            over: AtomicBool::new(false),
        }
    }

    /// Compares a guess against the secret.
    ///
    /// The `Active → Over` transition is a compare-and-swap, so when two
    /// players send the secret at the same moment exactly one of them
    /// gets [`GuessOutcome::Correct`] (whoever swaps first) and the other
    /// gets [`GuessOutcome::AlreadyOver`]. A wrong guess that read the
    /// flag before the winning swap still gets its `TooLow`/`TooHigh`.
    pub fn evaluate(&self, guess: i64) -> GuessOutcome {
        if self.is_over() {
            return GuessOutcome::AlreadyOver;
        }

        match guess.cmp(&self.secret) {
            Compare::Less => GuessOutcome::TooLow,
            Compare::Greater => GuessOutcome::TooHigh,
            Compare::Equal => match self.over.compare_exchange(
                false,
                true,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::info!(room_id = %self.id, "secret guessed, room over");
                    GuessOutcome::Correct
                }
                Err(_) => GuessOutcome::AlreadyOver,
            },
        }
    }

    /// The room's unique ID.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The secret number.
    pub fn secret(&self) -> i64 {
        self.secret
    }

    /// The bounds the secret was drawn from.
    pub fn config(&self) -> RoomConfig {
        self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RoomState {
        if self.over.load(Ordering::Acquire) {
            RoomState::Over
        } else {
            RoomState::Active
        }
    }

    /// Returns `true` once someone has guessed the secret.
    pub fn is_over(&self) -> bool {
        !self.state().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_secret(secret: i64) -> Room {
        Room::with_secret(RoomId(1), RoomConfig::default(), secret).unwrap()
    }

    #[test]
    fn test_secret_stays_within_bounds() {
        let config = RoomConfig::new(-5, 5).unwrap();
        for i in 0..1_000 {
            let room = Room::new(RoomId(i), config);
            assert!(config.contains(room.secret()), "secret {}", room.secret());
        }
    }

    #[test]
    fn test_single_value_bounds_pin_the_secret() {
        let room = Room::new(RoomId(1), RoomConfig::new(42, 42).unwrap());
        assert_eq!(room.secret(), 42);
    }

    #[test]
    fn test_with_secret_rejects_out_of_bounds() {
        let result = Room::with_secret(RoomId(1), RoomConfig::default(), 501);
        assert_eq!(
            result.unwrap_err(),
            RoomError::SecretOutOfBounds { secret: 501, lower: 0, upper: 500 }
        );
    }

    #[test]
    fn test_guess_scenario_low_high_correct_over() {
        let room = room_with_secret(250);

        assert_eq!(room.evaluate(100), GuessOutcome::TooLow);
        assert_eq!(room.evaluate(400), GuessOutcome::TooHigh);
        assert_eq!(room.state(), RoomState::Active);

        assert_eq!(room.evaluate(250), GuessOutcome::Correct);
        assert_eq!(room.state(), RoomState::Over);

        assert_eq!(room.evaluate(250), GuessOutcome::AlreadyOver);
    }

    #[test]
    fn test_below_is_always_too_low_and_above_always_too_high() {
        let room = room_with_secret(250);
        for guess in 0..250 {
            assert_eq!(room.evaluate(guess), GuessOutcome::TooLow, "guess {guess}");
        }
        for guess in 251..=500 {
            assert_eq!(room.evaluate(guess), GuessOutcome::TooHigh, "guess {guess}");
        }
        // Out-of-range guesses are still just low or high.
        assert_eq!(room.evaluate(-1_000), GuessOutcome::TooLow);
        assert_eq!(room.evaluate(i64::MAX), GuessOutcome::TooHigh);
        assert!(!room.is_over());
    }

    #[test]
    fn test_over_is_terminal_for_every_guess() {
        let room = room_with_secret(3);
        assert_eq!(room.evaluate(3), GuessOutcome::Correct);

        for guess in [0, 2, 3, 4, 500] {
            assert_eq!(room.evaluate(guess), GuessOutcome::AlreadyOver);
        }
        assert_eq!(room.state(), RoomState::Over);
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "R-3");
    }
}
