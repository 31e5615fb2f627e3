//! # Guessduel
//!
//! A two-player number guessing server. Clients connect over TCP, speak
//! newline-delimited JSON, pick a nickname, and are paired first come
//! first served. Each pair shares a secret number; whoever guesses it
//! first wins.
//!
//! The sub-crates split the work by layer:
//!
//! - [`guessduel_transport`]: TCP accept loop and line framing
//! - [`guessduel_protocol`]: the message catalog and JSON codec
//! - [`guessduel_room`]: the secret and the first-correct-guess race
//! - [`guessduel_session`]: nickname registry and matchmaking
//!
//! This crate glues them into a server: one task per connection runs
//! the session state machine from nickname prompt to teardown.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guessduel::prelude::*;
//!
//! # async fn start() -> Result<(), GuessDuelError> {
//! let server = GuessDuelServer::builder()
//!     .bind("127.0.0.1:55555")
//!     .room_config(RoomConfig::new(0, 500)?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{
    DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MAX_DECODE_FAILURES, ServerConfig,
};
pub use error::GuessDuelError;
pub use server::{GuessDuelServer, GuessDuelServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{
        GuessDuelError, GuessDuelServer, GuessDuelServerBuilder, ServerConfig,
    };
    pub use guessduel_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
    pub use guessduel_room::RoomConfig;
}
