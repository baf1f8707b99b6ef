//! Error types for the session layer.

/// Errors that can occur while building commands from session state.
///
/// The reducer itself never fails: every message it is given is applied
/// or logged. These errors come from the command side (turn submission,
/// action forms, export).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Turn input can only be sent while this client plays a character.
    #[error("no character is bound to this client")]
    NoCharacter,

    /// The action has no parameter by that name (or it is excluded).
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// The value has the wrong type, or is outside the parameter's
    /// domain.
    #[error("invalid value for parameter {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    /// A render was requested for an event the backend never gave an id.
    #[error("event has no id to render")]
    MissingEventId,

    /// Serializing the event log failed.
    #[error("history export failed: {0}")]
    Export(serde_json::Error),
}
