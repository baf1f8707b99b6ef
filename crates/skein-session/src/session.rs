//! Session types: the client's record of one connection to the game.
//!
//! A "session" is everything the client knows about the game right now:
//! - WHO this client is (`client_id`, `client_name`)
//! - WHAT the world looks like (the last snapshot and turn number)
//! - WHOM this client plays (`player_character`)
//! - WHETHER it is this client's turn (`prompt`)
//! - everything that has happened so far (`history`)
//!
//! Fields are private. Only [`SessionStore`](crate::SessionStore) mutates
//! a session; everyone else reads it through the accessors and
//! projections below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skein_protocol::{Character, GameEvent, PromptEvent, Room, World};
use skein_transport::ConnectionPhase;

use crate::SessionError;

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// How the presentation lays out its panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Horizontal,
    Vertical,
}

/// Light or dark colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Presentation preferences. They live in the session so observers see
/// them change, but the reducer never touches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub layout: LayoutMode,
    pub theme: ThemeMode,
    /// Keep the event log scrolled to the newest entry.
    pub auto_scroll: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Horizontal,
            theme: ThemeMode::Light,
            auto_scroll: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The complete client-local state for one connection.
///
/// `Option` fields distinguish "absent" from "empty": no world yet is
/// not the same as an empty world, and no bound character is not the
/// same as a character with an empty name.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) client_id: Option<String>,
    pub(crate) client_name: String,
    pub(crate) connection_phase: ConnectionPhase,
    pub(crate) world: Option<World>,
    pub(crate) turn: Option<u64>,
    pub(crate) players: BTreeMap<String, String>,
    pub(crate) player_character: Option<Character>,
    pub(crate) prompt: Option<PromptEvent>,
    pub(crate) history: Vec<GameEvent>,
    pub(crate) preferences: Preferences,
}

impl Session {
    /// Creates an empty session with the given display name and
    /// preferences.
    pub fn new(client_name: impl Into<String>, preferences: Preferences) -> Self {
        Self {
            client_name: client_name.into(),
            preferences,
            ..Self::default()
        }
    }

    // -- accessors ----------------------------------------------------------

    /// The id the backend assigned to this client, once an `id` message
    /// has arrived on the current connection.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn connection_phase(&self) -> ConnectionPhase {
        self.connection_phase
    }

    /// The world as of the last snapshot.
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// The turn number of the last snapshot, if it carried one.
    pub fn turn(&self) -> Option<u64> {
        self.turn
    }

    /// Client id → character name, as of the last roster message.
    pub fn players(&self) -> &BTreeMap<String, String> {
        &self.players
    }

    /// The character this client plays, if any.
    pub fn player_character(&self) -> Option<&Character> {
        self.player_character.as_ref()
    }

    /// The open turn prompt, present only while it is addressed to us.
    pub fn prompt(&self) -> Option<&PromptEvent> {
        self.prompt.as_ref()
    }

    /// Every logged event, oldest first.
    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    // -- projections --------------------------------------------------------

    /// True iff a character is bound and a prompt addressed to us is open.
    pub fn is_my_turn(&self) -> bool {
        self.player_character.is_some() && self.prompt.is_some()
    }

    /// Returns `true` if `client` is this session's own client id.
    pub fn is_me(&self, client: &str) -> bool {
        self.client_id.as_deref() == Some(client)
    }

    /// The client id currently playing `character`, per the roster.
    pub fn player_for_character(&self, character: &str) -> Option<&str> {
        self.players
            .iter()
            .find(|(_, name)| name.as_str() == character)
            .map(|(client, _)| client.as_str())
    }

    /// Returns `true` if any client (including this one) plays
    /// `character`.
    pub fn is_character_taken(&self, character: &str) -> bool {
        self.player_for_character(character).is_some()
    }

    /// The room our character is in, looked up in the current world.
    pub fn room_of_player_character(&self) -> Option<&Room> {
        let character = self.player_character.as_ref()?;
        self.world.as_ref()?.room_of_character(&character.name)
    }

    /// The event log as a JSON array in wire shape. Feeding the entries
    /// back through the decoder and [`SessionStore::replay`] rebuilds the
    /// same log.
    ///
    /// [`SessionStore::replay`]: crate::SessionStore::replay
    pub fn export_history(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(&self.history).map_err(SessionError::Export)
    }
}
