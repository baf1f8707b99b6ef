//! The session store: the single owner and mutator of a [`Session`].
//!
//! Every decoded server message goes through [`SessionStore::apply`],
//! one at a time, in arrival order. `apply` is total: it never fails and
//! never panics, whatever the backend sends.
//!
//! # Observers
//!
//! Anything that needs to react to state changes (a UI, a logger, a
//! test) registers a callback with [`SessionStore::subscribe`]. Every
//! mutation notifies every observer exactly once, after the mutation is
//! complete, so observers never see a half-applied message.
//!
//! # Identity
//!
//! Some effects only make sense once we know who we are: binding our
//! character and opening our prompt both compare a message's `client`
//! against our client id. Until an `id` message has been applied on the
//! current connection, those effects are skipped (the events are still
//! logged).

use skein_protocol::{
    GameEvent, PlayerEvent, PlayerStatus, PromptEvent, ServerMessage,
    SnapshotEvent,
};
use skein_transport::ConnectionPhase;

use crate::session::{LayoutMode, Preferences, Session};
use crate::SessionConfig;

/// A callback invoked with the session after every mutation.
pub type Observer = Box<dyn FnMut(&Session) + Send>;

/// Handle returned by [`SessionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What a single [`SessionStore::apply`] call did.
///
/// Mostly useful for logging and for tests; the session itself is the
/// source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Our client id was set.
    Identified(String),
    /// The roster was replaced; carries the new number of players.
    RosterReplaced(usize),
    /// The world was replaced by a snapshot.
    WorldReplaced,
    /// We now play the named character.
    CharacterBound(String),
    /// We were told to play a character the current world doesn't have.
    CharacterNotFound(String),
    /// We no longer play a character.
    CharacterReleased,
    /// A prompt addressed to us was opened (or replaced).
    PromptOpened,
    /// A prompt addressed to someone else closed ours (if any).
    PromptCleared,
    /// An identity-sensitive effect was skipped because no `id` message
    /// has arrived yet. The event was still logged.
    AwaitingIdentity,
    /// The event was only logged.
    Logged,
}

/// Owns a [`Session`] and applies server messages to it.
pub struct SessionStore {
    session: Session,
    config: SessionConfig,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl SessionStore {
    /// Creates a store around an empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_session(Session::default(), config)
    }

    /// Creates a store around an existing session (a name and
    /// preferences chosen before connecting, for instance).
    pub fn with_session(session: Session, config: SessionConfig) -> Self {
        Self {
            session,
            config,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current session state.
    pub fn state(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Registers a callback to run after every mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Session) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a callback. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(candidate, _)| *candidate != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.session);
        }
    }

    // -----------------------------------------------------------------------
    // The reducer
    // -----------------------------------------------------------------------

    /// Applies one server message, then notifies observers once.
    pub fn apply(&mut self, message: ServerMessage) -> Applied {
        let kind = message.kind().to_string();
        let applied = self.reduce(message);
        tracing::debug!(kind = %kind, ?applied, "applied server message");
        self.notify();
        applied
    }

    /// Applies each event in order, as if it had just arrived.
    ///
    /// Used to rebuild a log (for example from an exported history).
    /// Observers are notified once per event.
    pub fn replay<I>(&mut self, events: I) -> Vec<Applied>
    where
        I: IntoIterator<Item = GameEvent>,
    {
        events
            .into_iter()
            .map(|event| self.apply(ServerMessage::Event(event)))
            .collect()
    }

    fn reduce(&mut self, message: ServerMessage) -> Applied {
        match message {
            ServerMessage::Id(id) => {
                tracing::info!(client = %id.client, "client identified");
                let changed = self
                    .session
                    .client_id
                    .as_deref()
                    .is_some_and(|current| current != id.client);
                if changed {
                    // The prompt and character were granted to the old id.
                    tracing::info!(client = %id.client, "client id changed, dropping prompt and character");
                    self.session.prompt = None;
                    self.session.player_character = None;
                }
                self.session.client_id = Some(id.client.clone());
                Applied::Identified(id.client)
            }
            ServerMessage::Roster(roster) => {
                self.session.players = roster.players;
                Applied::RosterReplaced(self.session.players.len())
            }
            ServerMessage::Event(event) => {
                let applied = match &event {
                    GameEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
                    GameEvent::Player(player) => self.apply_player(player),
                    GameEvent::Prompt(prompt) => self.apply_prompt(prompt),
                    _ => Applied::Logged,
                };
                self.session.history.push(event);
                applied
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: &SnapshotEvent) -> Applied {
        self.session.world = Some(snapshot.world.clone());
        self.session.turn = snapshot.turn;

        if self.config.revalidate_character_on_snapshot {
            self.revalidate_character();
        }
        Applied::WorldReplaced
    }

    fn revalidate_character(&mut self) {
        let Some(bound) = &self.session.player_character else {
            return;
        };
        let fresh = self
            .session
            .world
            .as_ref()
            .and_then(|world| world.find_character(&bound.name))
            .cloned();

        if fresh.is_none() {
            tracing::info!(character = %bound.name, "bound character left the world, unbinding");
        }
        self.session.player_character = fresh;
    }

    fn apply_player(&mut self, event: &PlayerEvent) -> Applied {
        if self.session.client_id.is_none() {
            tracing::debug!(client = %event.client, "player event before identity, skipping binding");
            return Applied::AwaitingIdentity;
        }
        if !self.session.is_me(&event.client) {
            return Applied::Logged;
        }

        match event.status {
            PlayerStatus::Join => {
                let found = self
                    .session
                    .world
                    .as_ref()
                    .and_then(|world| world.find_character(&event.character))
                    .cloned();
                match found {
                    Some(character) => {
                        tracing::info!(character = %character.name, "now playing character");
                        self.session.player_character = Some(character);
                        Applied::CharacterBound(event.character.clone())
                    }
                    None => {
                        tracing::debug!(character = %event.character, "joined character not found in world");
                        Applied::CharacterNotFound(event.character.clone())
                    }
                }
            }
            PlayerStatus::Leave => {
                tracing::info!(character = %event.character, "released character");
                self.session.player_character = None;
                Applied::CharacterReleased
            }
        }
    }

    fn apply_prompt(&mut self, prompt: &PromptEvent) -> Applied {
        if self.session.client_id.is_none() {
            tracing::debug!(client = %prompt.client, "prompt before identity, ignoring");
            return Applied::AwaitingIdentity;
        }
        if self.session.is_me(&prompt.client) {
            self.session.prompt = Some(prompt.clone());
            Applied::PromptOpened
        } else {
            self.session.prompt = None;
            Applied::PromptCleared
        }
    }

    // -----------------------------------------------------------------------
    // Other mutators
    // -----------------------------------------------------------------------

    /// Clears all connection-derived state for a fresh connection.
    ///
    /// The client name and preferences belong to the user, not the
    /// connection, and are kept. Identity-sensitive effects are ignored
    /// again until the new connection's `id` message arrives.
    pub fn reset(&mut self) {
        let client_name = std::mem::take(&mut self.session.client_name);
        let preferences = self.session.preferences;
        self.session = Session::new(client_name, preferences);
        tracing::debug!("session reset");
        self.notify();
    }

    pub fn set_phase(&mut self, phase: ConnectionPhase) {
        self.session.connection_phase = phase;
        self.notify();
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.session.client_name = name.into();
        self.notify();
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.session.preferences = preferences;
        self.notify();
    }

    pub fn toggle_theme(&mut self) {
        let prefs = &mut self.session.preferences;
        prefs.theme = prefs.theme.toggled();
        self.notify();
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        self.session.preferences.layout = layout;
        self.notify();
    }

    pub fn set_auto_scroll(&mut self, auto_scroll: bool) {
        self.session.preferences.auto_scroll = auto_scroll;
        self.notify();
    }

    /// Closes the current prompt locally. Used after submitting,
    /// skipping or leaving a turn; the backend is not told.
    pub fn clear_prompt(&mut self) {
        self.session.prompt = None;
        self.notify();
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}
