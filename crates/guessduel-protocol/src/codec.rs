//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The server doesn't care HOW messages are serialized, only that the
//! result is a single frame. [`JsonCodec`] is the one the GUI client
//! speaks.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// Implementations must never emit a raw `\n` byte: the transport uses
/// it as the frame delimiter and will refuse to send such a payload.
///
/// `Send + Sync + 'static` lets one codec live in the shared server
/// state and be used from every connection task at once.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output escapes control characters inside strings, so a
/// nickname containing a newline still encodes to a single line.
///
/// ## Example
///
/// ```rust
/// use guessduel_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ServerMessage::GameStart).unwrap();
/// assert_eq!(bytes, br#"{"type":"game_start","data":null}"#);
///
/// let decoded: ServerMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, ServerMessage::GameStart);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, ServerMessage};

    #[test]
    fn test_json_codec_encodes_single_line() {
        let bytes = JsonCodec
            .encode(&ServerMessage::WinnerAnnounced("a\nb".into()))
            .unwrap();
        assert!(!bytes.contains(&b'\n'));
    }

    #[test]
    fn test_json_codec_decodes_client_message() {
        let msg: ClientMessage = JsonCodec
            .decode(br#"{"type":"send_nickname","data":"Ann"}"#)
            .unwrap();
        assert_eq!(msg, ClientMessage::SendNickname("Ann".into()));
    }

    #[test]
    fn test_json_codec_decode_error_is_distinct() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"{oops");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
