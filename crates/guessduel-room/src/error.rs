//! Error types for the room layer.

/// Errors that can occur while building a room.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    /// The lower bound is above the upper bound.
    #[error("invalid bounds: lower {lower} is greater than upper {upper}")]
    InvalidBounds { lower: i64, upper: i64 },

    /// A fixed secret was requested outside the configured bounds.
    #[error("secret {secret} is outside [{lower}, {upper}]")]
    SecretOutOfBounds { secret: i64, lower: i64, upper: i64 },
}
