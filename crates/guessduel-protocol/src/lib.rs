//! Wire protocol for guessduel.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`]) — the closed set of
//!   message kinds that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer doesn't know about sockets or rooms. Framing the
//! bytes on a stream is the transport's job; deciding what a message
//! means is the server's.
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Session (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, ServerMessage};
