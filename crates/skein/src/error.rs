//! The client's error type.

use skein_protocol::ProtocolError;
use skein_session::SessionError;
use skein_transport::TransportError;

/// Anything a [`SkeinClient`](crate::SkeinClient) call can fail with.
///
/// Each layer keeps its own error enum; this one only forwards them, so
/// the message a caller prints is the layer's own.
#[derive(Debug, thiserror::Error)]
pub enum SkeinError {
    /// The socket could not connect, send, or receive.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An outbound message failed to encode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A command was refused locally, before anything was sent.
    #[error(transparent)]
    Session(#[from] SessionError),
}
