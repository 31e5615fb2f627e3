//! Error types for the protocol layer.
//!
//! Each crate in guessduel defines its own error enum, so a
//! `ProtocolError` always means the bytes were fine but their contents
//! were not.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, or a payload
    /// of the wrong shape for its tag. The server tolerates a few of
    /// these in a row before giving up on the peer.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The peer kept sending undecodable frames.
    #[error("too many malformed messages ({0} in a row)")]
    TooManyMalformed(u32),
}
