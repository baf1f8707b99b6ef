//! Integration tests for the client loop: decoding, applying, commands,
//! and reconnection.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use skein::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Mock connection
// =========================================================================

/// An in-memory connection: frames queued in `inbound` are received in
/// order, and everything sent is recorded in `sent`.
struct MockConnection {
    inbound: Mutex<VecDeque<String>>,
    sent: Arc<Mutex<Vec<String>>>,
    phase: Mutex<ConnectionPhase>,
}

impl MockConnection {
    fn new(frames: &[&str]) -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let conn = Self {
            inbound: Mutex::new(frames.iter().map(|f| f.to_string()).collect()),
            sent: Arc::clone(&sent),
            phase: Mutex::new(ConnectionPhase::Open),
        };
        (conn, sent)
    }
}

impl Connection for MockConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        if !self.phase().is_open() {
            return Err(TransportError::ConnectionClosed("mock closed".into()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        let next = self.inbound.lock().unwrap().pop_front();
        if next.is_none() {
            *self.phase.lock().unwrap() = ConnectionPhase::Closed;
        }
        Ok(next)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        *self.phase.lock().unwrap() = ConnectionPhase::Closed;
        Ok(())
    }

    fn phase(&self) -> ConnectionPhase {
        *self.phase.lock().unwrap()
    }

    fn last_frame(&self) -> Option<String> {
        None
    }
}

fn sent_json(sent: &Arc<Mutex<Vec<String>>>) -> Vec<Value> {
    sent.lock()
        .unwrap()
        .iter()
        .map(|text| serde_json::from_str(text).unwrap())
        .collect()
}

const ID: &str = r#"{"type":"id","client":"c1"}"#;
const SNAPSHOT: &str = r#"{"type":"snapshot","world":{"rooms":[{"name":"Hall","characters":[{"name":"Bob"}],"portals":[{"name":"north"},{"name":"south"}]}]},"turn":1}"#;
const JOIN: &str = r#"{"type":"player","status":"join","client":"c1","character":"Bob"}"#;
const PROMPT: &str = r#"{"type":"prompt","client":"c1","character":"Bob","prompt":"What next?","actions":[{"type":"function","function":{"name":"action_move","description":"Move","parameters":{"type":"object","properties":{"direction":{"type":"string"}}}}}]}"#;

// =========================================================================
// pump() / run()
// =========================================================================

#[tokio::test]
async fn test_pump_applies_frames_in_order() {
    let (conn, _sent) = MockConnection::new(&[ID, SNAPSHOT, JOIN]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);

    assert_eq!(
        client.pump().await.unwrap(),
        Some(Applied::Identified("c1".into()))
    );
    assert_eq!(client.pump().await.unwrap(), Some(Applied::WorldReplaced));
    assert_eq!(
        client.pump().await.unwrap(),
        Some(Applied::CharacterBound("Bob".into()))
    );
    assert_eq!(client.pump().await.unwrap(), None);
    assert_eq!(client.session().connection_phase(), ConnectionPhase::Closed);
}

#[tokio::test]
async fn test_pump_skips_malformed_frames_and_records_them() {
    let (conn, _sent) = MockConnection::new(&["not json", "[1,2]", ID]);
    let mut client = SkeinClientBuilder::new()
        .diagnostics_capacity(1)
        .with_connection(conn);

    let applied = client.pump().await.unwrap();

    assert_eq!(applied, Some(Applied::Identified("c1".into())));
    assert_eq!(client.diagnostics().dropped_total(), 2);
    assert_eq!(client.diagnostics().len(), 1);
    assert_eq!(client.diagnostics().latest().unwrap().frame, "[1,2]");
}

#[tokio::test]
async fn test_run_drives_session_until_close() {
    let (conn, _sent) = MockConnection::new(&[ID, SNAPSHOT, JOIN, PROMPT]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);
    let turns = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&turns);
    client
        .store_mut()
        .subscribe(move |session| seen.lock().unwrap().push(session.is_my_turn()));

    client.run().await.unwrap();

    assert!(client.session().is_my_turn());
    assert_eq!(client.session().history().len(), 3);
    // Four applies plus the final phase change, and only the prompt
    // opened the turn.
    let turns = turns.lock().unwrap();
    assert_eq!(turns.iter().filter(|t| **t).count(), 2);
    assert_eq!(turns.len(), 5);
}

// =========================================================================
// Commands
// =========================================================================

#[tokio::test]
async fn test_submit_turn_sends_chosen_action() {
    let (conn, sent) = MockConnection::new(&[ID, SNAPSHOT, JOIN, PROMPT]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);
    for _ in 0..4 {
        client.pump().await.unwrap();
    }

    let action = client.session().prompt().unwrap().actions[0].clone();
    let mut form = ActionForm::new(&action, client.session().world());
    let options: Vec<String> = form
        .field("direction")
        .and_then(|field| field.options())
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(options, ["north", "south"]);

    form.set("direction", "south").unwrap();
    client.turn_mut().choose_action(&form);
    client.submit_turn().await.unwrap();

    assert_eq!(
        sent_json(&sent),
        [json!({"type": "input", "input": "~action_move:direction=south"})]
    );
    assert!(!client.session().is_my_turn());
}

#[tokio::test]
async fn test_submit_turn_failed_send_keeps_draft_and_prompt() {
    let (conn, sent) = MockConnection::new(&[ID, SNAPSHOT, JOIN, PROMPT]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);
    for _ in 0..4 {
        client.pump().await.unwrap();
    }
    client.turn_mut().set_draft("look around");
    client.connection().close().await.unwrap();

    let result = client.submit_turn().await;

    assert!(matches!(
        result,
        Err(SkeinError::Transport(TransportError::ConnectionClosed(_)))
    ));
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(client.turn().draft(), "look around");
    assert!(client.session().prompt().is_some());
    assert!(client.session().is_my_turn());
}

#[tokio::test]
async fn test_submit_turn_without_character_sends_nothing() {
    let (conn, sent) = MockConnection::new(&[ID]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);
    client.pump().await.unwrap();
    client.turn_mut().set_draft("look");

    let result = client.submit_turn().await;

    assert!(matches!(
        result,
        Err(SkeinError::Session(SessionError::NoCharacter))
    ));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_character_and_render_commands_use_wire_shapes() {
    let (conn, sent) = MockConnection::new(&[]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);

    client.become_character("Bob").await.unwrap();
    client.release_character().await.unwrap();
    client.rename("alice").await.unwrap();
    client.request_render(RenderRequest::room("Hall")).await.unwrap();

    assert_eq!(
        sent_json(&sent),
        [
            json!({"type": "player", "become": "Bob"}),
            json!({"type": "player", "become": null}),
            json!({"type": "player", "name": "alice"}),
            json!({"type": "render", "room": "Hall"}),
        ]
    );
    assert_eq!(client.session().client_name(), "alice");
}

#[tokio::test]
async fn test_skip_turn_sends_nothing_and_closes_prompt() {
    let (conn, sent) = MockConnection::new(&[ID, SNAPSHOT, JOIN, PROMPT]);
    let mut client = SkeinClientBuilder::new().with_connection(conn);
    for _ in 0..4 {
        client.pump().await.unwrap();
    }

    client.skip_turn();

    assert!(client.session().prompt().is_none());
    assert!(client.session().player_character().is_some());
    assert!(sent.lock().unwrap().is_empty());
}

// =========================================================================
// attach()
// =========================================================================

#[tokio::test]
async fn test_attach_resets_session_until_new_identity() {
    let (first, _) = MockConnection::new(&[ID, SNAPSHOT, JOIN]);
    let mut client = SkeinClientBuilder::new()
        .client_name("alice")
        .with_connection(first);
    client.run().await.unwrap();
    assert!(client.session().player_character().is_some());

    let (second, _) = MockConnection::new(&[SNAPSHOT, JOIN, ID, JOIN]);
    client.attach(second).await;

    assert!(client.session().client_id().is_none());
    assert!(client.session().history().is_empty());
    assert_eq!(client.session().client_name(), "alice");
    assert_eq!(client.session().connection_phase(), ConnectionPhase::Open);

    client.pump().await.unwrap();
    assert_eq!(
        client.pump().await.unwrap(),
        Some(Applied::AwaitingIdentity)
    );
    client.pump().await.unwrap();
    assert_eq!(
        client.pump().await.unwrap(),
        Some(Applied::CharacterBound("Bob".into()))
    );
}

// =========================================================================
// Over a real WebSocket
// =========================================================================

#[tokio::test]
async fn test_websocket_client_round_trip() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in [ID, SNAPSHOT, JOIN] {
            ws.send(Message::Text(frame.to_string().into())).await.unwrap();
        }
        let reply = ws.next().await.unwrap().unwrap();
        ws.send(Message::Close(None)).await.unwrap();
        reply.into_text().unwrap().as_str().to_string()
    });

    let mut client = SkeinClient::builder().url(&url).connect().await.unwrap();
    for _ in 0..3 {
        client.pump().await.unwrap();
    }
    assert_eq!(client.session().player_character().unwrap().name, "Bob");

    client.become_character("Ann").await.unwrap();
    let reply = server.await.unwrap();

    assert_eq!(reply, r#"{"type":"player","become":"Ann"}"#);
    assert_eq!(client.pump().await.unwrap(), None);
}
