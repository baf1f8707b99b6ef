//! Client session state for Skein.
//!
//! This crate turns a stream of decoded server messages into a
//! consistent local picture of the game, and turns player intent back
//! into messages:
//!
//! 1. **Reducer**: [`SessionStore::apply`] folds each message into the
//!    [`Session`] and notifies observers.
//! 2. **Turns**: [`TurnController`] decides whether it's our turn and
//!    holds the draft input.
//! 3. **Actions**: [`ActionForm`] fills in an action's parameters and
//!    encodes them as an input token.
//! 4. **Commands**: [`commands`] builds every outbound message.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← owns the store, pumps messages into it, sends commands
//!     ↕
//! Session Layer (this crate)  ← state, turns, actions, commands
//!     ↕
//! Protocol Layer (below)  ← ServerMessage, ClientMessage, World
//! ```
//!
//! Nothing here does I/O, so everything can be driven directly in tests.

pub mod commands;
mod config;
mod error;
pub mod format;
mod form;
mod session;
mod store;
mod turn;

pub use config::SessionConfig;
pub use error::SessionError;
pub use form::{ActionForm, FormField, SIGNIFICANT_PARAMETERS, significant_values};
pub use session::{LayoutMode, Preferences, Session, ThemeMode};
pub use store::{Applied, Observer, SessionStore, SubscriptionId};
pub use turn::{TurnController, TurnView};
