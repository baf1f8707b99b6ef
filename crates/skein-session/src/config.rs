use serde::{Deserialize, Serialize};

/// Configuration for how the reducer treats incoming messages.
///
/// Every field has a default, so a config file only needs to name what
/// it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Re-check the bound character against every new snapshot.
    ///
    /// Off by default: the character is then only (un)bound by `player`
    /// events, and a snapshot that no longer contains it leaves a stale
    /// copy behind. When on, a snapshot refreshes the bound character
    /// from the new world, or unbinds it if it is gone.
    pub revalidate_character_on_snapshot: bool,
}
