//! The message decoder: one raw text frame in, one [`ServerMessage`] out.
//!
//! Decoding is deliberately lenient. Only a frame that is not a JSON
//! object at all is an error; everything else becomes *some* message.
//! An object whose `type` we don't know, or whose payload doesn't fit the
//! type it claims, becomes [`GameEvent::Opaque`] so it still shows up in
//! the event log.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ProtocolError;
use crate::events::{
    ActionEvent, GameEvent, GenerateEvent, IdMessage, OpaqueEvent,
    PlayerEvent, PromptEvent, RenderEvent, ReplyEvent, ResultEvent,
    RosterMessage, ServerMessage, SnapshotEvent, StatusEvent,
};

/// Decodes one text frame from the backend.
///
/// # Errors
/// - [`ProtocolError::Decode`] if the frame is not valid JSON.
/// - [`ProtocolError::InvalidMessage`] if it is JSON but not an object.
///
/// The caller is expected to drop such frames and report them.
pub fn decode_frame(frame: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(frame).map_err(ProtocolError::Decode)?;
    decode_value(value)
}

/// Like [`decode_frame`], for a frame that has already been parsed.
pub fn decode_value(value: Value) -> Result<ServerMessage, ProtocolError> {
    if !value.is_object() {
        return Err(ProtocolError::InvalidMessage(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Ok(opaque(None, "missing message type".to_string(), value));
    };

    let decoded = match kind {
        "id" => parse::<IdMessage>(&value).map(ServerMessage::Id),
        "players" => parse::<RosterMessage>(&value).map(ServerMessage::Roster),
        "snapshot" => parse::<SnapshotEvent>(&value).map(GameEvent::Snapshot).map(Into::into),
        "player" => parse::<PlayerEvent>(&value).map(GameEvent::Player).map(Into::into),
        "prompt" => parse::<PromptEvent>(&value).map(GameEvent::Prompt).map(Into::into),
        "action" => parse::<ActionEvent>(&value).map(GameEvent::Action).map(Into::into),
        "result" => parse::<ResultEvent>(&value).map(GameEvent::Result).map(Into::into),
        "reply" => parse::<ReplyEvent>(&value).map(GameEvent::Reply).map(Into::into),
        "status" => parse::<StatusEvent>(&value).map(GameEvent::Status).map(Into::into),
        "render" => parse::<RenderEvent>(&value).map(GameEvent::Render).map(Into::into),
        "generate" => parse::<GenerateEvent>(&value).map(GameEvent::Generate).map(Into::into),
        other => {
            let kind = other.to_string();
            return Ok(opaque(Some(kind), "unknown message type".to_string(), value));
        }
    };

    match decoded {
        Ok(message) => Ok(message),
        Err(e) => {
            let kind = kind.to_string();
            Ok(opaque(Some(kind), format!("malformed payload: {e}"), value))
        }
    }
}

fn parse<T: DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(value)
}

fn opaque(kind: Option<String>, reason: String, payload: Value) -> ServerMessage {
    ServerMessage::Event(GameEvent::Opaque(OpaqueEvent {
        kind,
        reason,
        payload,
    }))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
