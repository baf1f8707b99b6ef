//! Messages the client sends to the backend.
//!
//! ```json
//! {"type": "player", "become": "Bob"}     // take over a character
//! {"type": "player", "become": null}      // give it back
//! {"type": "player", "name": "Alice"}     // rename this client
//! {"type": "input", "input": "~move:direction=north"}
//! {"type": "render", "event": "e-42"}
//! {"type": "render", "room": "Hall"}
//! ```

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Payload of a `player` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerCommand {
    // Listed first: a missing `Option` field would let `Become` swallow
    // a rename when decoding.
    Rename { name: String },
    /// `None` releases the current character. It must serialize as an
    /// explicit `null`, so the field is never skipped.
    Become {
        #[serde(rename = "become")]
        r#become: Option<String>,
    },
}

/// Asks the backend to render an image of an event or an entity.
///
/// Exactly one field is normally set; use the constructors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl RenderRequest {
    pub fn event(id: impl Into<String>) -> Self {
        Self {
            event: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn character(name: impl Into<String>) -> Self {
        Self {
            character: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn item(name: impl Into<String>) -> Self {
        Self {
            item: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn portal(name: impl Into<String>) -> Self {
        Self {
            portal: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn room(name: impl Into<String>) -> Self {
        Self {
            room: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Every message the client can send.
///
/// `#[serde(tag = "type")]` writes the variant name into a `type` field
/// next to the payload's own fields, which is exactly the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Player(PlayerCommand),
    Input { input: String },
    Render(RenderRequest),
}

impl ClientMessage {
    /// Serializes the message to the text sent over the connection.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn wire(message: &ClientMessage) -> Value {
        let text = message.encode().expect("encode should succeed");
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_encode_become_character() {
        let message = ClientMessage::Player(PlayerCommand::Become {
            r#become: Some("Bob".into()),
        });
        assert_eq!(wire(&message), json!({"type": "player", "become": "Bob"}));
    }

    #[test]
    fn test_encode_release_writes_explicit_null() {
        let message = ClientMessage::Player(PlayerCommand::Become { r#become: None });
        assert_eq!(wire(&message), json!({"type": "player", "become": null}));
    }

    #[test]
    fn test_encode_rename() {
        let message = ClientMessage::Player(PlayerCommand::Rename {
            name: "Alice".into(),
        });
        assert_eq!(wire(&message), json!({"type": "player", "name": "Alice"}));
    }

    #[test]
    fn test_encode_input() {
        let message = ClientMessage::Input {
            input: "~action_move:direction=north".into(),
        };
        assert_eq!(
            wire(&message),
            json!({"type": "input", "input": "~action_move:direction=north"})
        );
    }

    #[test]
    fn test_encode_render_requests_only_set_field() {
        assert_eq!(
            wire(&ClientMessage::Render(RenderRequest::event("e-1"))),
            json!({"type": "render", "event": "e-1"})
        );
        assert_eq!(
            wire(&ClientMessage::Render(RenderRequest::portal("north"))),
            json!({"type": "render", "portal": "north"})
        );
    }
}
