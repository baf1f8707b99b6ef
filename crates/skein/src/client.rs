//! `SkeinClient` builder and message loop.
//!
//! This is the entry point for talking to a game backend. It ties
//! together all the layers: transport → protocol → session, and back.
//!
//! ```text
//!   recv ──→ decode_frame ──→ SessionStore::apply ──→ observers
//!                 │
//!                 └── malformed ──→ Diagnostics (warn, keep going)
//!
//!   command ──→ commands::* ──→ ClientMessage::encode ──→ send
//! ```

use skein_protocol::{ClientMessage, RenderRequest, decode_frame};
use skein_session::{
    Applied, Preferences, Session, SessionConfig, SessionStore, TurnController,
    commands,
};
use skein_transport::{Connection, ConnectionPhase, WebSocketConnection};

use crate::{ClientConfig, Diagnostics, SkeinError};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and connecting a client.
///
/// # Example
///
/// ```rust,no_run
/// use skein::prelude::*;
///
/// # async fn demo() -> Result<(), SkeinError> {
/// let mut client = SkeinClient::builder()
///     .url("ws://127.0.0.1:8001/")
///     .client_name("alice")
///     .connect()
///     .await?;
/// client.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkeinClientBuilder {
    config: ClientConfig,
}

impl SkeinClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a complete configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the backend URL.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Sets the display name.
    pub fn client_name(mut self, name: &str) -> Self {
        self.config.client_name = name.to_string();
        self
    }

    /// Sets the reducer configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets how many malformed frames to keep.
    pub fn diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.config.diagnostics_capacity = capacity;
        self
    }

    /// Sets the initial presentation preferences.
    pub fn preferences(mut self, preferences: Preferences) -> Self {
        self.config.preferences = preferences;
        self
    }

    /// Opens a WebSocket connection to the configured URL.
    pub async fn connect(self) -> Result<SkeinClient<WebSocketConnection>, SkeinError> {
        let connection = WebSocketConnection::connect(&self.config.url).await?;
        Ok(self.with_connection(connection))
    }

    /// Builds a client around an already-open connection.
    pub fn with_connection<C: Connection>(self, connection: C) -> SkeinClient<C> {
        SkeinClient::new(self.config, connection)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A connected game client.
///
/// Owns the connection and the session. Everything happens on the
/// caller's task: [`pump`](Self::pump) applies one frame at a time, so
/// the session is never touched concurrently.
pub struct SkeinClient<C: Connection> {
    connection: C,
    store: SessionStore,
    turn: TurnController,
    diagnostics: Diagnostics,
    config: ClientConfig,
}

impl<C> SkeinClient<C>
where
    C: Connection,
{
    fn new(config: ClientConfig, connection: C) -> Self {
        let session = Session::new(config.client_name.as_str(), config.preferences);
        let mut store = SessionStore::with_session(session, config.session.clone());
        store.set_phase(connection.phase());
        Self {
            connection,
            store,
            turn: TurnController::new(),
            diagnostics: Diagnostics::new(config.diagnostics_capacity),
            config,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// The current session state.
    pub fn session(&self) -> &Session {
        self.store.state()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mutable access to the store, for subscribing observers and
    /// changing preferences.
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    pub fn turn(&self) -> &TurnController {
        &self.turn
    }

    /// The turn controller, for editing the draft.
    pub fn turn_mut(&mut self) -> &mut TurnController {
        &mut self.turn
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl<C> SkeinClient<C>
where
    C: Connection,
    SkeinError: From<C::Error>,
{
    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Receives frames until one applies, and returns what it did.
    ///
    /// Frames that fail to decode are logged, recorded in
    /// [`diagnostics`](Self::diagnostics) and skipped. Returns `Ok(None)`
    /// when the connection closes cleanly.
    ///
    /// # Errors
    /// Returns the connection's error if receiving fails.
    pub async fn pump(&mut self) -> Result<Option<Applied>, SkeinError> {
        loop {
            let frame = match self.connection.recv().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("connection closed by backend");
                    self.sync_phase();
                    return Ok(None);
                }
                Err(e) => {
                    self.sync_phase();
                    return Err(e.into());
                }
            };

            match decode_frame(&frame) {
                Ok(message) => return Ok(Some(self.store.apply(message))),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed frame");
                    self.diagnostics.record(frame, e);
                }
            }
        }
    }

    /// Pumps until the connection closes.
    pub async fn run(&mut self) -> Result<(), SkeinError> {
        while self.pump().await?.is_some() {}
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn send(&self, message: &ClientMessage) -> Result<(), SkeinError> {
        let text = message.encode()?;
        self.connection.send(&text).await?;
        Ok(())
    }

    /// Asks to play `character`. The binding happens when the backend's
    /// `player` event comes back.
    pub async fn become_character(&self, character: &str) -> Result<(), SkeinError> {
        tracing::info!(character, "requesting character");
        self.send(&commands::become_character(character)).await
    }

    /// Gives up the current character.
    pub async fn release_character(&self) -> Result<(), SkeinError> {
        self.send(&commands::release_character()).await
    }

    /// Renames this client, locally and on the backend.
    pub async fn rename(&mut self, name: &str) -> Result<(), SkeinError> {
        self.store.set_client_name(name);
        self.send(&commands::rename(name)).await
    }

    /// Sends the turn draft as input, then closes the prompt.
    ///
    /// # Errors
    /// Fails with [`SessionError::NoCharacter`](skein_session::SessionError)
    /// before sending anything if no character is bound. If the send
    /// fails, the draft and prompt are kept so the turn can be retried.
    pub async fn submit_turn(&mut self) -> Result<(), SkeinError> {
        let message = self.turn.prepare(self.store.state())?;
        self.send(&message).await?;
        self.turn.commit(&mut self.store);
        Ok(())
    }

    /// Closes the prompt without acting.
    pub fn skip_turn(&mut self) {
        self.turn.skip(&mut self.store);
    }

    /// Closes the prompt without acting, keeping the character.
    pub fn leave_turn(&mut self) {
        self.turn.leave(&mut self.store);
    }

    /// Asks the backend to render an image.
    pub async fn request_render(&self, request: RenderRequest) -> Result<(), SkeinError> {
        self.send(&commands::render(request)).await
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Replaces the connection and starts a fresh session on it.
    ///
    /// The old connection is closed first; a failure to close it is
    /// logged and otherwise ignored.
    pub async fn attach(&mut self, connection: C) {
        if let Err(e) = self.connection.close().await {
            tracing::debug!(error = %e, "closing previous connection failed");
        }
        self.connection = connection;
        self.turn = TurnController::new();
        self.store.reset();
        self.sync_phase();
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), SkeinError> {
        let result = self.connection.close().await;
        self.sync_phase();
        result.map_err(Into::into)
    }

    fn sync_phase(&mut self) {
        let phase = self.connection.phase();
        if self.store.state().connection_phase() != phase {
            self.store.set_phase(phase);
        }
    }
}

impl SkeinClient<WebSocketConnection> {
    /// Creates a new builder.
    pub fn builder() -> SkeinClientBuilder {
        SkeinClientBuilder::new()
    }

    /// Opens a new WebSocket connection to the configured URL and
    /// attaches it.
    pub async fn reconnect(&mut self) -> Result<(), SkeinError> {
        self.store.set_phase(ConnectionPhase::Connecting);
        tracing::info!(url = %self.config.url, "reconnecting");
        let connection = match WebSocketConnection::connect(&self.config.url).await {
            Ok(connection) => connection,
            Err(e) => {
                self.store.set_phase(ConnectionPhase::Closed);
                return Err(e.into());
            }
        };
        self.attach(connection).await;
        Ok(())
    }
}
