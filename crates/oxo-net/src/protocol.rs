//! Wire messages exchanged with game clients.
//!
//! Every payload starts with a protocol version byte followed by one JSON
//! document. The JSON tag and field names are the client contract and use
//! camelCase; [`encode`] and [`decode`] handle the version envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use oxo_game::GameSnapshot;

/// Current wire-protocol version. Prepended to every encoded message.
pub const PROTOCOL_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Requests a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Start a fresh game, discarding any game in progress on this
    /// connection.
    StartGame {
        /// Opponent policy identifier. Missing or unrecognized values select
        /// the rule-based policy.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strategy: Option<String>,
    },
    /// Claim a cell for the human player. Indices outside the board are
    /// carried as-is and ignored by the server.
    MakeMove { row: i32, col: i32 },
}

/// Pushes the server may send.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The authoritative session state after an accepted request.
    GameState(GameSnapshot),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from decoding a received payload.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The payload had no version byte.
    #[error("empty payload: missing version byte")]
    EmptyPayload,

    /// The version byte does not match [`PROTOCOL_VERSION`].
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The JSON document was malformed or had the wrong shape.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Encode a message as a versioned payload: `[version: u8] [JSON document]`.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, serde_json::Error> {
    let body = serde_json::to_vec(message)?;
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a versioned payload produced by [`encode`].
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, WireError> {
    match payload {
        [] => Err(WireError::EmptyPayload),
        [PROTOCOL_VERSION, body @ ..] => Ok(serde_json::from_slice(body)?),
        [version, ..] => Err(WireError::UnsupportedVersion(*version)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use oxo_game::{Session, Strategy};
    use serde_json::json;

    /// The JSON document inside an encoded payload.
    fn body_of(payload: &[u8]) -> serde_json::Value {
        assert_eq!(payload[0], PROTOCOL_VERSION, "version byte comes first");
        serde_json::from_slice(&payload[1..]).unwrap()
    }

    #[test]
    fn test_start_game_wire_shape() {
        let bare = encode(&ClientMessage::StartGame { strategy: None }).unwrap();
        assert_eq!(body_of(&bare), json!({"type": "startGame"}));

        let chosen = encode(&ClientMessage::StartGame {
            strategy: Some("random".to_string()),
        })
        .unwrap();
        assert_eq!(
            body_of(&chosen),
            json!({"type": "startGame", "strategy": "random"})
        );
    }

    #[test]
    fn test_make_move_wire_shape() {
        let payload = encode(&ClientMessage::MakeMove { row: 0, col: 2 }).unwrap();
        assert_eq!(
            body_of(&payload),
            json!({"type": "makeMove", "row": 0, "col": 2})
        );
    }

    #[test]
    fn test_game_state_wire_shape() {
        let snapshot = Session::new(Strategy::RuleBased).snapshot();
        let payload = encode(&ServerMessage::GameState(snapshot)).unwrap();
        assert_eq!(
            body_of(&payload),
            json!({
                "type": "gameState",
                "board": [[null, null, null], [null, null, null], [null, null, null]],
                "currentPlayer": "X",
                "status": "playing",
            })
        );
    }

    #[test]
    fn test_client_message_roundtrip() {
        for message in [
            ClientMessage::StartGame { strategy: None },
            ClientMessage::StartGame {
                strategy: Some("rule-based".to_string()),
            },
            ClientMessage::MakeMove { row: 2, col: 1 },
        ] {
            let payload = encode(&message).unwrap();
            let decoded: ClientMessage = decode(&payload).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_out_of_range_indices_still_decode() {
        // Bounds are a game rule, not a parse rule; hostile indices must
        // survive decoding so the server can ignore them.
        let payload = encode(&ClientMessage::MakeMove { row: -4, col: 99 }).unwrap();
        let decoded: ClientMessage = decode(&payload).unwrap();
        assert_eq!(decoded, ClientMessage::MakeMove { row: -4, col: 99 });
    }

    #[test]
    fn test_missing_strategy_field_decodes_to_none() {
        let mut payload = vec![PROTOCOL_VERSION];
        payload.extend_from_slice(br#"{"type":"startGame"}"#);
        let decoded: ClientMessage = decode(&payload).unwrap();
        assert_eq!(decoded, ClientMessage::StartGame { strategy: None });
    }

    #[test]
    fn test_empty_payload_rejected() {
        let result: Result<ClientMessage, _> = decode(&[]);
        assert!(matches!(result, Err(WireError::EmptyPayload)));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut payload = encode(&ClientMessage::MakeMove { row: 0, col: 0 }).unwrap();
        payload[0] = 9;
        let result: Result<ClientMessage, _> = decode(&payload);
        assert!(matches!(result, Err(WireError::UnsupportedVersion(9))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result: Result<ClientMessage, _> = decode(&[PROTOCOL_VERSION, b'{', b'x']);
        assert!(matches!(result, Err(WireError::Json(_))));
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let mut payload = vec![PROTOCOL_VERSION];
        payload.extend_from_slice(br#"{"type":"resetBoard"}"#);
        let result: Result<ClientMessage, _> = decode(&payload);
        assert!(matches!(result, Err(WireError::Json(_))));
    }
}
