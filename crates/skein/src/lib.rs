//! # Skein
//!
//! Client runtime for a multiplayer narrative game.
//!
//! The backend pushes world snapshots, turn prompts and game events over
//! a WebSocket. Skein keeps a consistent local [`Session`] from that
//! stream, tells you when it is your turn, and encodes what you do back
//! into messages the backend understands.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skein::prelude::*;
//!
//! # async fn demo() -> Result<(), SkeinError> {
//! let mut client = SkeinClient::builder()
//!     .url("ws://127.0.0.1:8001/")
//!     .connect()
//!     .await?;
//!
//! client.store_mut().subscribe(|session| {
//!     if session.is_my_turn() {
//!         println!("your turn!");
//!     }
//! });
//! client.run().await
//! # }
//! ```
//!
//! [`Session`]: skein_session::Session

mod client;
mod config;
mod diagnostics;
mod error;

pub use client::{SkeinClient, SkeinClientBuilder};
pub use config::{ClientConfig, DEFAULT_DIAGNOSTICS_CAPACITY, DEFAULT_URL};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::SkeinError;

pub use skein_protocol as protocol;
pub use skein_session as session;
pub use skein_transport as transport;

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::{
        ClientConfig, Diagnostics, SkeinClient, SkeinClientBuilder, SkeinError,
    };
    pub use skein_protocol::{
        Action, Character, ClientMessage, GameEvent, Parameter, ParameterValue,
        PromptEvent, RenderRequest, Room, ServerMessage, World,
    };
    pub use skein_session::{
        ActionForm, Applied, Preferences, Session, SessionConfig, SessionError,
        SessionStore, TurnController, commands,
    };
    pub use skein_transport::{
        Connection, ConnectionPhase, TransportError, WebSocketConnection,
    };
}
