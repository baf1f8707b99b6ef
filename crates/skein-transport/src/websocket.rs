//! WebSocket client adapter using `tokio-tungstenite`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex as StdMutex;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionPhase, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A client-side WebSocket connection to the game backend.
///
/// The socket is split so that a pending `recv` never blocks a `send`.
pub struct WebSocketConnection {
    url: String,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    phase: AtomicU8,
    last_frame: StdMutex<Option<String>>,
}

impl WebSocketConnection {
    /// Opens a WebSocket connection to `url` (e.g. `ws://127.0.0.1:8001/`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        tracing::debug!(url, "opening WebSocket connection");
        let (ws, _response) =
            tokio_tungstenite::connect_async(url).await.map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::info!(url, "WebSocket connection open");

        let (sink, stream) = ws.split();
        Ok(Self {
            url: url.to_string(),
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            phase: AtomicU8::new(encode_phase(ConnectionPhase::Open)),
            last_frame: StdMutex::new(None),
        })
    }

    /// The URL this connection was opened against.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn set_phase(&self, phase: ConnectionPhase) {
        self.phase.store(encode_phase(phase), Ordering::Release);
    }

    fn remember(&self, frame: &str) {
        let mut last = self
            .last_frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(frame.to_string());
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        if !self.phase().is_open() {
            return Err(TransportError::ConnectionClosed(format!(
                "cannot send while {}",
                self.phase()
            )));
        }
        let msg = Message::Text(text.to_string().into());
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Text(text))) => {
                    let text = text.as_str().to_string();
                    self.remember(&text);
                    return Ok(Some(text));
                }
                Some(Ok(Message::Binary(data))) => {
                    // The backend only sends text, but tolerate binary
                    // frames and let the decoder reject them if need be.
                    let text = String::from_utf8_lossy(&data).into_owned();
                    self.remember(&text);
                    return Ok(Some(text));
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.set_phase(ConnectionPhase::Closed);
                    return Ok(None);
                }
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    self.set_phase(ConnectionPhase::Closed);
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.set_phase(ConnectionPhase::Closing);
        let result = self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        });
        self.set_phase(ConnectionPhase::Closed);
        tracing::info!(url = %self.url, "WebSocket connection closed");
        result
    }

    fn phase(&self) -> ConnectionPhase {
        decode_phase(self.phase.load(Ordering::Acquire))
    }

    fn last_frame(&self) -> Option<String> {
        self.last_frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

fn encode_phase(phase: ConnectionPhase) -> u8 {
    match phase {
        ConnectionPhase::Connecting => 0,
        ConnectionPhase::Open => 1,
        ConnectionPhase::Closing => 2,
        ConnectionPhase::Closed => 3,
    }
}

fn decode_phase(raw: u8) -> ConnectionPhase {
    match raw {
        0 => ConnectionPhase::Connecting,
        1 => ConnectionPhase::Open,
        2 => ConnectionPhase::Closing,
        _ => ConnectionPhase::Closed,
    }
}
