//! Connection abstraction for the Skein client.
//!
//! The session core never touches sockets. It talks to a [`Connection`]:
//! something that can send a text frame, hand back the next received
//! frame, and report a coarse [`ConnectionPhase`]. Anything that can do
//! that (a WebSocket, an in-memory pipe in tests) can drive a session.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client adapter via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;

/// Coarse lifecycle of a connection, as seen by the client.
///
/// ```text
/// Connecting ──→ Open ──→ Closing ──→ Closed
///     │                                  ↑
///     └──────────(connect failed)────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    /// The handshake has not finished yet.
    #[default]
    Connecting,
    /// Frames can flow in both directions.
    Open,
    /// A close was requested but not yet confirmed.
    Closing,
    /// The connection is gone. A new one is needed to continue.
    Closed,
}

impl ConnectionPhase {
    /// Returns `true` if frames can currently be sent.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Human-readable status label, suitable for a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Open => "Running",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single duplex connection to the game backend.
///
/// Frames are text: the backend speaks one JSON object per frame.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one text frame to the backend.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next text frame from the backend.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the current lifecycle phase.
    fn phase(&self) -> ConnectionPhase;

    /// Returns a copy of the most recently received frame, if any.
    fn last_frame(&self) -> Option<String>;
}
