//! Client configuration.

use serde::{Deserialize, Serialize};
use skein_session::{Preferences, SessionConfig};

/// The backend address used when none is configured.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8001/";

/// How many malformed frames the diagnostics ring keeps by default.
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 32;

/// Everything needed to build a [`SkeinClient`](crate::SkeinClient).
///
/// Deserializable so it can be loaded from a file; every field has a
/// default, so a file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket URL of the game backend.
    pub url: String,

    /// Display name for this client. Empty until the player picks one.
    pub client_name: String,

    /// Capacity of the malformed-frame ring buffer. Zero disables it.
    pub diagnostics_capacity: usize,

    /// Initial presentation preferences.
    pub preferences: Preferences,

    /// Reducer configuration.
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            client_name: String::new(),
            diagnostics_capacity: DEFAULT_DIAGNOSTICS_CAPACITY,
            preferences: Preferences::default(),
            session: SessionConfig::default(),
        }
    }
}
