//! Message types for guessduel's wire format.
//!
//! Every message on the wire is a single JSON object with two keys:
//!
//! ```text
//! {"type": "submit_guess", "data": 250}
//! {"type": "game_start",   "data": null}
//! ```
//!
//! `type` names the message kind and `data` carries its payload, or
//! `null` for kinds without one. Requests travel client → server as
//! [`ClientMessage`]; responses travel server → client as
//! [`ServerMessage`]. Both are closed enums, so a `match` over them is
//! checked for exhaustiveness by the compiler.

use serde::de::{Deserializer, IgnoredAny};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClientMessage — requests
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// Deserialization uses serde's "adjacently tagged" representation,
/// which reads exactly the `{"type": ..., "data": ...}` shape. Variants
/// without a payload accept `"data": null` or a missing `data` key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "This is my nickname." Answers `request_nickname`.
    SendNickname(String),

    /// "I guess this number."
    ///
    /// `None` means the payload was present but not an integer (a
    /// string, a float, `null`, ...). It still decodes so the server can
    /// ignore it as a bad guess instead of treating the whole frame as
    /// garbage.
    SubmitGuess(#[serde(deserialize_with = "lenient_guess")] Option<i64>),

    /// "I'm leaving."
    Leave,
}

impl ClientMessage {
    /// The wire tag for this message kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SendNickname(_) => "send_nickname",
            Self::SubmitGuess(_) => "submit_guess",
            Self::Leave => "leave",
        }
    }
}

impl Serialize for ClientMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SendNickname(name) => frame(serializer, self.tag(), name),
            Self::SubmitGuess(guess) => frame(serializer, self.tag(), guess),
            Self::Leave => frame(serializer, self.tag(), &()),
        }
    }
}

/// Accepts any JSON value as a guess payload; only integers survive.
fn lenient_guess<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Other(IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Some(n),
        Raw::Other(_) => None,
    })
}

// ---------------------------------------------------------------------------
// ServerMessage — responses
// ---------------------------------------------------------------------------

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Prompt for a nickname; repeated until one arrives.
    RequestNickname,

    /// The nickname of the player you've been paired with.
    OpponentIdentified(String),

    /// Your opponent left; the game is over for you too.
    OpponentExited,

    /// The room's secret number.
    CorrectNumberReveal(i64),

    /// The inclusive range the secret was drawn from, as `[lower, upper]`.
    GameBounds(i64, i64),

    /// Both players are paired and guessing may begin.
    GameStart,

    /// Your guess is below the secret.
    GuessTooLow,

    /// Your guess is above the secret.
    GuessTooHigh,

    /// Your guess is the secret.
    GuessValid,

    /// The game was won by the player with this nickname.
    WinnerAnnounced(String),
}

impl ServerMessage {
    /// The wire tag for this message kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RequestNickname => "request_nickname",
            Self::OpponentIdentified(_) => "opponent_identified",
            Self::OpponentExited => "opponent_exited",
            Self::CorrectNumberReveal(_) => "correct_number_reveal",
            Self::GameBounds(..) => "game_bounds",
            Self::GameStart => "game_start",
            Self::GuessTooLow => "guess_too_low",
            Self::GuessTooHigh => "guess_too_high",
            Self::GuessValid => "guess_valid",
            Self::WinnerAnnounced(_) => "winner_announced",
        }
    }
}

impl Serialize for ServerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.tag();
        match self {
            Self::OpponentIdentified(name) | Self::WinnerAnnounced(name) => {
                frame(serializer, tag, name)
            }
            Self::CorrectNumberReveal(secret) => frame(serializer, tag, secret),
            Self::GameBounds(lower, upper) => {
                frame(serializer, tag, &(lower, upper))
            }
            Self::RequestNickname
            | Self::OpponentExited
            | Self::GameStart
            | Self::GuessTooLow
            | Self::GuessTooHigh
            | Self::GuessValid => frame(serializer, tag, &()),
        }
    }
}

/// Writes the `{"type": tag, "data": data}` object.
///
/// serde's derived adjacently-tagged serializer drops the `data` key for
/// payload-less variants; clients expect it to be present as `null`, and
/// `()` serializes as exactly that.
fn frame<S, T>(serializer: S, tag: &'static str, data: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut object = serializer.serialize_struct("Message", 2)?;
    object.serialize_field("type", tag)?;
    object.serialize_field("data", data)?;
    object.end()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! These pin the exact JSON shapes, because a mismatch means the GUI
    //! client silently drops our messages.

    use super::*;
    use serde_json::json;

    fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_send_nickname_json_format() {
        let msg = ClientMessage::SendNickname("Ann".into());
        assert_eq!(to_json(&msg), json!({"type": "send_nickname", "data": "Ann"}));
    }

    #[test]
    fn test_leave_carries_null_data() {
        assert_eq!(
            to_json(&ClientMessage::Leave),
            json!({"type": "leave", "data": null})
        );
    }

    #[test]
    fn test_submit_guess_decodes_integer() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"submit_guess","data":250}"#).unwrap();
        assert_eq!(msg, ClientMessage::SubmitGuess(Some(250)));
    }

    #[test]
    fn test_submit_guess_decodes_negative_integer() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"submit_guess","data":-3}"#).unwrap();
        assert_eq!(msg, ClientMessage::SubmitGuess(Some(-3)));
    }

    #[test]
    fn test_submit_guess_non_integer_payload_is_tolerated() {
        for data in [r#""abc""#, "12.5", "null", "[1,2]", r#"{"n":1}"#] {
            let raw = format!(r#"{{"type":"submit_guess","data":{data}}}"#);
            let msg: ClientMessage = serde_json::from_str(&raw)
                .unwrap_or_else(|e| panic!("{raw} should decode: {e}"));
            assert_eq!(msg, ClientMessage::SubmitGuess(None), "payload {data}");
        }
    }

    #[test]
    fn test_leave_accepts_null_or_missing_data() {
        let with_null: ClientMessage =
            serde_json::from_str(r#"{"type":"leave","data":null}"#).unwrap();
        let without: ClientMessage =
            serde_json::from_str(r#"{"type":"leave"}"#).unwrap();
        assert_eq!(with_null, ClientMessage::Leave);
        assert_eq!(without, ClientMessage::Leave);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"data":"Bo","type":"send_nickname"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SendNickname("Bo".into()));
    }

    #[test]
    fn test_client_message_round_trip() {
        for msg in [
            ClientMessage::SendNickname("Ann".into()),
            ClientMessage::SubmitGuess(Some(42)),
            ClientMessage::Leave,
        ] {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: ClientMessage = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_payloadless_server_messages_carry_null_data() {
        for msg in [
            ServerMessage::RequestNickname,
            ServerMessage::OpponentExited,
            ServerMessage::GameStart,
            ServerMessage::GuessTooLow,
            ServerMessage::GuessTooHigh,
            ServerMessage::GuessValid,
        ] {
            let json = to_json(&msg);
            assert_eq!(json["type"], msg.tag());
            assert!(
                json.as_object().unwrap().contains_key("data"),
                "{} should carry a data key",
                msg.tag()
            );
            assert!(json["data"].is_null());
        }
    }

    #[test]
    fn test_winner_announced_json_format() {
        let msg = ServerMessage::WinnerAnnounced("Ann".into());
        assert_eq!(
            to_json(&msg),
            json!({"type": "winner_announced", "data": "Ann"})
        );
    }

    #[test]
    fn test_correct_number_reveal_json_format() {
        let msg = ServerMessage::CorrectNumberReveal(250);
        assert_eq!(
            to_json(&msg),
            json!({"type": "correct_number_reveal", "data": 250})
        );
    }

    #[test]
    fn test_game_bounds_json_format() {
        let msg = ServerMessage::GameBounds(0, 500);
        assert_eq!(to_json(&msg), json!({"type": "game_bounds", "data": [0, 500]}));
    }

    #[test]
    fn test_server_message_round_trip() {
        for msg in [
            ServerMessage::RequestNickname,
            ServerMessage::OpponentIdentified("Bo".into()),
            ServerMessage::GameBounds(1, 10),
            ServerMessage::CorrectNumberReveal(7),
            ServerMessage::WinnerAnnounced("Ann".into()),
            ServerMessage::GuessTooHigh,
        ] {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn test_newline_in_nickname_is_escaped() {
        // The framer forbids raw newlines; serde_json must escape them.
        let msg = ServerMessage::OpponentIdentified("line\nbreak".into());
        let bytes = serde_json::to_vec(&msg).unwrap();
        assert!(!bytes.contains(&b'\n'));
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<ClientMessage, _> = serde_json::from_slice(b"not json at all");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_type_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"fly_to_moon","data":null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_server_tag_as_client_message_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"game_start","data":null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_nickname_with_wrong_payload_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"send_nickname","data":5}"#);
        assert!(result.is_err());
    }
}
