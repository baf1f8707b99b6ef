//! The world snapshot: rooms and everything inside them.
//!
//! A [`World`] always arrives whole inside a `snapshot` message and is
//! replaced whole. Nothing here is ever patched field-by-field.
//!
//! The backend attaches extra bookkeeping (`id`, `type`, effects, ...) to
//! every entity. Fields we don't model are ignored, and every field we do
//! model has a default, so a sparse snapshot like
//! `{"rooms":[{"name":"Hall"}]}` still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A scalar attribute value attached to an entity.
///
/// `#[serde(untagged)]` means the JSON value is matched by shape: `true`
/// becomes `Bool`, `3` becomes `Integer`, `0.5` becomes `Float`, and
/// `"tired"` becomes `Text`. Variant order matters; serde tries them top
/// to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Named scalar attributes. A `BTreeMap` keeps iteration order stable.
pub type Attributes = BTreeMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// An item lying in a room or carried by a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    /// Items can contain other items (a chest, a bag).
    pub items: Vec<Item>,
}

/// A scheduled entry in a character's calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarEvent {
    pub name: String,
    pub turn: u64,
}

/// A character's calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calendar {
    pub events: Vec<CalendarEvent>,
}

/// A character's plans: upcoming calendar events plus free-text notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planner {
    pub calendar: Calendar,
    pub notes: Vec<String>,
}

/// A character in the world, played either by a person or by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub backstory: String,
    pub description: String,
    pub items: Vec<Item>,
    pub attributes: Attributes,
    pub planner: Planner,
}

/// A one-way exit from a room.
///
/// `name` is what an action's `direction` parameter refers to ("north",
/// "trapdoor"); `destination` is the name of the room it leads to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portal {
    pub name: String,
    pub description: String,
    pub destination: String,
    pub attributes: Attributes,
}

/// A room: the unit of location in the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    pub characters: Vec<Character>,
    pub items: Vec<Item>,
    pub portals: Vec<Portal>,
}

/// The whole world as of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    pub name: String,
    pub theme: String,
    /// Character names in turn order.
    pub order: Vec<String>,
    pub rooms: Vec<Room>,
}

impl World {
    /// Every character across every room, in room order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.rooms.iter().flat_map(|room| room.characters.iter())
    }

    /// Every item lying in a room (not nested or carried), in room order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.rooms.iter().flat_map(|room| room.items.iter())
    }

    /// Every portal across every room, in room order.
    pub fn portals(&self) -> impl Iterator<Item = &Portal> {
        self.rooms.iter().flat_map(|room| room.portals.iter())
    }

    /// Looks up a room by name.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// Looks up a character by name in any room.
    pub fn find_character(&self, name: &str) -> Option<&Character> {
        self.characters().find(|character| character.name == name)
    }

    /// Returns the room a named character is currently in.
    pub fn room_of_character(&self, name: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|room| room.characters.iter().any(|c| c.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> World {
        serde_json::from_str(
            r#"{
                "name": "Keep",
                "theme": "gothic",
                "order": ["Bob", "Ann"],
                "rooms": [
                    {
                        "name": "Hall",
                        "characters": [{"name": "Bob", "backstory": "a cook"}],
                        "items": [{"name": "lamp"}],
                        "portals": [{"name": "north", "destination": "Tower"}]
                    },
                    {
                        "name": "Tower",
                        "characters": [{"name": "Ann"}],
                        "items": [{"name": "key"}, {"name": "map"}],
                        "portals": [{"name": "south", "destination": "Hall"}]
                    }
                ]
            }"#,
        )
        .expect("world should decode")
    }

    #[test]
    fn test_world_decodes_sparse_snapshot_with_defaults() {
        let world: World = serde_json::from_str(
            r#"{"rooms":[{"name":"Hall","characters":[{"name":"Bob"}],"items":[],"portals":[]}]}"#,
        )
        .unwrap();

        assert_eq!(world.name, "");
        assert_eq!(world.rooms.len(), 1);
        assert_eq!(world.rooms[0].characters[0].name, "Bob");
        assert_eq!(world.rooms[0].characters[0].backstory, "");
        assert!(world.rooms[0].characters[0].planner.notes.is_empty());
    }

    #[test]
    fn test_world_ignores_backend_bookkeeping_fields() {
        let room: Room = serde_json::from_str(
            r#"{"name":"Hall","id":"abc","type":"room","active_effects":[]}"#,
        )
        .unwrap();
        assert_eq!(room.name, "Hall");
    }

    #[test]
    fn test_attribute_values_decode_by_shape() {
        let attrs: Attributes = serde_json::from_str(
            r#"{"awake": true, "gold": 3, "hunger": 0.5, "mood": "tired"}"#,
        )
        .unwrap();

        assert_eq!(attrs["awake"], AttributeValue::Bool(true));
        assert_eq!(attrs["gold"], AttributeValue::Integer(3));
        assert_eq!(attrs["hunger"], AttributeValue::Float(0.5));
        assert_eq!(attrs["mood"], AttributeValue::Text("tired".into()));
    }

    #[test]
    fn test_world_enumerations_cover_every_room() {
        let world = sample_world();

        let characters: Vec<_> =
            world.characters().map(|c| c.name.as_str()).collect();
        let items: Vec<_> = world.items().map(|i| i.name.as_str()).collect();
        let portals: Vec<_> =
            world.portals().map(|p| p.name.as_str()).collect();

        assert_eq!(characters, ["Bob", "Ann"]);
        assert_eq!(items, ["lamp", "key", "map"]);
        assert_eq!(portals, ["north", "south"]);
    }

    #[test]
    fn test_find_character_and_room_of_character() {
        let world = sample_world();

        assert_eq!(
            world.find_character("Bob").map(|c| c.backstory.as_str()),
            Some("a cook")
        );
        assert!(world.find_character("Zed").is_none());
        assert_eq!(
            world.room_of_character("Ann").map(|r| r.name.as_str()),
            Some("Tower")
        );
        assert!(world.room("Cellar").is_none());
    }
}
