//! Wire protocol for Skein.
//!
//! This crate defines the "language" the client and the game backend
//! speak:
//!
//! - **World model** ([`World`], [`Room`], [`Character`], ...): the state
//!   carried by every snapshot.
//! - **Actions** ([`Action`], [`Parameter`]): what a player may do on
//!   their turn.
//! - **Inbound messages** ([`ServerMessage`], [`GameEvent`]) and the
//!   decoder that produces them ([`decode_frame`]).
//! - **Outbound messages** ([`ClientMessage`], [`RenderRequest`]).
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and session
//! (client state). It doesn't know about connections or turns; it only
//! knows how to read and write messages.
//!
//! ```text
//! Transport (text) → Protocol (ServerMessage) → Session (state)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod action;
mod decode;
mod error;
mod events;
mod outbound;
mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use action::{Action, Parameter, ParameterSchema, ParameterValue};
pub use decode::{decode_frame, decode_value};
pub use error::ProtocolError;
pub use events::{
    ActionEvent, EntityRef, GameEvent, GenerateEvent, IdMessage, OpaqueEvent,
    PlayerEvent, PlayerStatus, PromptEvent, RenderEvent, ReplyEvent,
    ResultEvent, RosterMessage, ServerMessage, SnapshotEvent, StatusEvent,
};
pub use outbound::{ClientMessage, PlayerCommand, RenderRequest};
pub use world::{
    AttributeValue, Attributes, Calendar, CalendarEvent, Character, Item,
    Planner, Portal, Room, World,
};
