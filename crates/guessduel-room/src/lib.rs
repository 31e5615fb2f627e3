//! Room state for guessduel.
//!
//! A room is one game: one secret number shared by exactly two players.
//!
//! # Key types
//!
//! - [`Room`] — holds the secret and evaluates guesses atomically
//! - [`RoomState`] — `Active → Over`, entered exactly once
//! - [`GuessOutcome`] — what a single guess produced
//! - [`RoomConfig`] — the inclusive range secrets are drawn from

mod config;
mod error;
mod room;

pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use room::{GuessOutcome, Room, RoomId};
