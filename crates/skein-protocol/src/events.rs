//! Server-pushed messages.
//!
//! Everything the backend sends falls into one of three groups:
//!
//! - **Control messages** ([`IdMessage`], [`RosterMessage`]) update the
//!   session directly and are never shown in the event log.
//! - **Game events** ([`GameEvent`]) are appended to the event log. Some
//!   of them (`snapshot`, `player`, `prompt`) also change session state.
//! - **Opaque events** ([`OpaqueEvent`]) are anything we could not make
//!   sense of. They are kept so the log stays complete.
//!
//! [`ServerMessage`] is the closed sum of all of these; see
//! [`decode_frame`](crate::decode_frame) for how a raw frame becomes one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::action::Action;
use crate::world::World;

// ---------------------------------------------------------------------------
// EntityRef
// ---------------------------------------------------------------------------

/// A reference to a named entity (character, room) inside an event.
///
/// The backend sends either a bare name (`"Bob"`) or the entity itself
/// (`{"name": "Bob", "id": "..."}`). Both decode to the same value; only
/// the name and id are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntityRefWire")]
pub struct EntityRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EntityRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityRefWire {
    Name(String),
    Entity {
        name: String,
        #[serde(default)]
        id: Option<String>,
    },
}

impl From<EntityRefWire> for EntityRef {
    fn from(wire: EntityRefWire) -> Self {
        match wire {
            EntityRefWire::Name(name) => Self { name, id: None },
            EntityRefWire::Entity { name, id } => Self { name, id },
        }
    }
}

// ---------------------------------------------------------------------------
// Control messages
// ---------------------------------------------------------------------------

/// `{"type": "id", "client": "..."}`: the backend telling us who we are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdMessage {
    pub client: String,
}

/// `{"type": "players", "players": {clientId: characterName}}`: the full
/// roster of human players. Always a complete replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterMessage {
    #[serde(default)]
    pub players: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// A full world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub world: World,
    #[serde(default, alias = "step", skip_serializing_if = "Option::is_none")]
    pub turn: Option<u64>,
}

/// Whether a player joined or left a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Join,
    Leave,
}

/// A player taking over (or giving up) a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: PlayerStatus,
    pub client: String,
    pub character: String,
}

/// An invitation for one client to take the next turn.
///
/// Prompts are broadcast: every client sees every prompt, and only the
/// one whose id matches `client` may answer it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub client: String,
    pub character: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<EntityRef>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A character performed an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "actor")]
    pub character: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<EntityRef>,
    pub action: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

/// The outcome of a character's turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "actor")]
    pub character: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<EntityRef>,
    pub result: String,
}

/// A system reply addressed to players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
}

/// A backend status line ("generating the world...").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
}

/// Rendered images, keyed by image name. Values are base64 JPEG data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

/// The backend is generating a new entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// A message we kept but could not interpret.
///
/// `kind` is the message's `type` string if it had one. `payload` is the
/// whole raw message, so serializing an opaque event reproduces what the
/// backend sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueEvent {
    pub kind: Option<String>,
    pub reason: String,
    pub payload: Value,
}

/// Any event that belongs in the event log.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Snapshot(SnapshotEvent),
    Player(PlayerEvent),
    Prompt(PromptEvent),
    Action(ActionEvent),
    Result(ResultEvent),
    Reply(ReplyEvent),
    Status(StatusEvent),
    Render(RenderEvent),
    Generate(GenerateEvent),
    Opaque(OpaqueEvent),
}

impl GameEvent {
    /// The wire `type` of this event. Opaque events without a type
    /// report `"unknown"`.
    pub fn kind(&self) -> &str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Player(_) => "player",
            Self::Prompt(_) => "prompt",
            Self::Action(_) => "action",
            Self::Result(_) => "result",
            Self::Reply(_) => "reply",
            Self::Status(_) => "status",
            Self::Render(_) => "render",
            Self::Generate(_) => "generate",
            Self::Opaque(event) => event.kind.as_deref().unwrap_or("unknown"),
        }
    }

    /// The backend-assigned event id, used for render requests.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Self::Snapshot(event) => &event.id,
            Self::Player(event) => &event.id,
            Self::Prompt(event) => &event.id,
            Self::Action(event) => &event.id,
            Self::Result(event) => &event.id,
            Self::Reply(event) => &event.id,
            Self::Status(event) => &event.id,
            Self::Render(event) => &event.id,
            Self::Generate(event) => &event.id,
            Self::Opaque(event) => {
                return event.payload.get("id").and_then(Value::as_str);
            }
        };
        id.as_deref()
    }
}

/// Puts the `type` tag back next to an event's own fields.
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

/// Serializes in wire shape, so an exported log can be fed back through
/// [`decode_frame`](crate::decode_frame).
impl Serialize for GameEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Snapshot(body) => Tagged { kind, body }.serialize(serializer),
            Self::Player(body) => Tagged { kind, body }.serialize(serializer),
            Self::Prompt(body) => Tagged { kind, body }.serialize(serializer),
            Self::Action(body) => Tagged { kind, body }.serialize(serializer),
            Self::Result(body) => Tagged { kind, body }.serialize(serializer),
            Self::Reply(body) => Tagged { kind, body }.serialize(serializer),
            Self::Status(body) => Tagged { kind, body }.serialize(serializer),
            Self::Render(body) => Tagged { kind, body }.serialize(serializer),
            Self::Generate(body) => Tagged { kind, body }.serialize(serializer),
            Self::Opaque(event) => event.payload.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// One decoded frame from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Id(IdMessage),
    Roster(RosterMessage),
    Event(GameEvent),
}

impl ServerMessage {
    /// The wire `type` of the message.
    pub fn kind(&self) -> &str {
        match self {
            Self::Id(_) => "id",
            Self::Roster(_) => "players",
            Self::Event(event) => event.kind(),
        }
    }
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        Self::Event(event)
    }
}
