//! Wire types for the lobby socket.
//!
//! Frames are JSON arrays of the form `[event_name, payload]`, the shape a
//! socket-style `emit(eventName, payload)` produces. The only event this
//! client sends is [`CS_FETCH_LOBBY_INFO`], carrying a [`LobbyJoinRequest`]:
//!
//! ```json
//! ["CS_FETCH_LOBBY_INFO", {"walletAddress":"0x…","socketId":"…","gameId":"g1","username":"bob"}]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Event asking the server for lobby info and seating the player.
pub const CS_FETCH_LOBBY_INFO: &str = "CS_FETCH_LOBBY_INFO";

// ── Payloads ────────────────────────────────────────────────────────

/// Payload of [`CS_FETCH_LOBBY_INFO`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyJoinRequest {
    /// Verified wallet address of the joining player.
    pub wallet_address: String,
    /// Id of the transport session the server should answer on.
    pub socket_id: String,
    pub game_id: String,
    pub username: String,
}

// ── Events ──────────────────────────────────────────────────────────

/// Events the client emits over the lobby transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Join the lobby of a game.
    FetchLobbyInfo(LobbyJoinRequest),
}

impl ClientEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchLobbyInfo(_) => CS_FETCH_LOBBY_INFO,
        }
    }

    /// Encode as a `[name, payload]` text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Serialization`] if the payload cannot be encoded.
    pub fn to_frame(&self) -> Result<String, TransportError> {
        let frame = match self {
            Self::FetchLobbyInfo(request) => serde_json::to_string(&(self.name(), request))?,
        };
        Ok(frame)
    }

    /// Decode a `[name, payload]` text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Serialization`] for invalid JSON or payloads,
    /// and [`TransportError::MalformedFrame`] for unknown event names.
    pub fn from_frame(text: &str) -> Result<Self, TransportError> {
        let (name, payload) = parse_frame(text)?;
        match name.as_str() {
            CS_FETCH_LOBBY_INFO => Ok(Self::FetchLobbyInfo(serde_json::from_value(payload)?)),
            other => Err(TransportError::MalformedFrame(format!(
                "unknown client event {other}"
            ))),
        }
    }
}

/// Split any `[name, payload]` frame without interpreting the payload.
///
/// A frame with only a name yields a `null` payload.
///
/// # Errors
///
/// Returns [`TransportError::Serialization`] if `text` is not a JSON array,
/// and [`TransportError::MalformedFrame`] if it does not start with a string.
pub fn parse_frame(text: &str) -> Result<(String, serde_json::Value), TransportError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut items = items.into_iter();
    let name = match items.next() {
        Some(serde_json::Value::String(name)) => name,
        _ => {
            return Err(TransportError::MalformedFrame(
                "frame must start with an event name".into(),
            ))
        }
    };
    Ok((name, items.next().unwrap_or(serde_json::Value::Null)))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn request() -> LobbyJoinRequest {
        LobbyJoinRequest {
            wallet_address: "0xAAA0000000000000000000000000000000000001".into(),
            socket_id: "sock-1".into(),
            game_id: "g1".into(),
            username: "bob".into(),
        }
    }

    #[test]
    fn join_payload_uses_camel_case_keys() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "walletAddress": "0xAAA0000000000000000000000000000000000001",
                "socketId": "sock-1",
                "gameId": "g1",
                "username": "bob",
            })
        );
    }

    #[test]
    fn frame_is_name_then_payload() {
        let frame = ClientEvent::FetchLobbyInfo(request()).to_frame().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value[0], CS_FETCH_LOBBY_INFO);
        assert_eq!(value[1]["gameId"], "g1");
    }

    #[test]
    fn from_frame_reads_join_event() {
        let frame = format!(
            r#"["{CS_FETCH_LOBBY_INFO}",{{"walletAddress":"0xa","socketId":"s","gameId":"g","username":"u"}}]"#
        );
        let event = ClientEvent::from_frame(&frame).unwrap();
        let ClientEvent::FetchLobbyInfo(request) = event;
        assert_eq!(request.wallet_address, "0xa");
        assert_eq!(request.username, "u");
    }

    #[test]
    fn from_frame_rejects_unknown_event() {
        let err = ClientEvent::from_frame(r#"["CS_SIT_DOWN",{}]"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedFrame(_)));
    }

    #[test]
    fn from_frame_rejects_missing_fields() {
        let err = ClientEvent::from_frame(r#"["CS_FETCH_LOBBY_INFO",{"gameId":"g"}]"#).unwrap_err();
        assert!(matches!(err, TransportError::Serialization(_)));
    }

    #[test]
    fn parse_frame_allows_missing_payload() {
        let (name, payload) = parse_frame(r#"["SC_PING"]"#).unwrap();
        assert_eq!(name, "SC_PING");
        assert!(payload.is_null());
        assert!(parse_frame(r#"{"event":"x"}"#).is_err());
    }
}
