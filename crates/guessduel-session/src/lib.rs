//! Connection registry and matchmaking for guessduel.
//!
//! This crate tracks every connection that has told us its nickname:
//!
//! 1. **Registry** — who is connected, under which nickname, paired with
//!    whom, in which room ([`Registry`])
//! 2. **Matchmaking** — pairing two waiting connections into a fresh
//!    room ([`Registry::pair`])
//! 3. **Session lifecycle** — the per-connection state machine
//!    ([`SessionState`]) and the outbox other sessions use to reach it
//!
//! # How it fits in the stack
//!
//! ```text
//! Server handler (above)  ← drives one session per connection
//!     ↕
//! Session Layer (this crate)  ← registry, pairing, teardown
//!     ↕
//! Room / Protocol / Transport (below)
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::{PairOutcome, Registry};
pub use session::{
    MAX_NICKNAME_LEN, Outbound, PeerReceiver, PeerSender, SessionState,
    normalize_nickname,
};
