//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in turning text into
//! messages or back, not in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound message failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound frame was not valid JSON.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An inbound frame was valid JSON but not something we can treat as
    /// a message at all (an array, a bare string, ...).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
