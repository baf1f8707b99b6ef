//! One-line descriptions of logged events, for plain-text presentations.

use serde_json::Value;
use skein_protocol::{ActionEvent, GameEvent, PlayerStatus};

/// Turns a backend action name into a label: `action_move` → `Move`.
pub fn action_label(name: &str) -> String {
    let short = name.strip_prefix("action_").unwrap_or(name);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn describe_action(event: &ActionEvent) -> String {
    let parameters: Vec<String> = event
        .parameters
        .iter()
        .map(|(name, value)| match value {
            Value::String(text) => format!("{name}: {text}"),
            other => format!("{name}: {other}"),
        })
        .collect();
    format!(
        "Action: {} - {}",
        action_label(&event.action),
        parameters.join(", ")
    )
}

/// Describes an event the way the event log shows it.
pub fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::Snapshot(snapshot) => match snapshot.turn {
            Some(turn) => format!("{} - {turn}", snapshot.world.theme),
            None => snapshot.world.theme.clone(),
        },
        GameEvent::Player(player) => match player.status {
            PlayerStatus::Join => format!(
                "{} is now playing as {}",
                player.client, player.character
            ),
            PlayerStatus::Leave => format!(
                "{} has left the game. {} is now controlled by the backend",
                player.client, player.character
            ),
        },
        GameEvent::Prompt(prompt) => format!(
            "Waiting for {} to take their turn",
            prompt.character.name
        ),
        GameEvent::Action(action) => {
            format!("{}: Starting turn: {}", action.character.name, describe_action(action))
        }
        GameEvent::Result(result) => {
            format!("{}: Turn result: {}", result.character.name, result.result)
        }
        GameEvent::Reply(reply) => reply.text.clone(),
        GameEvent::Status(status) => status.text.clone(),
        GameEvent::Render(render) => match render.images.len() {
            1 => "Rendered 1 image".to_string(),
            count => format!("Rendered {count} images"),
        },
        GameEvent::Generate(generate) => format!("Generating {}", generate.name),
        GameEvent::Opaque(_) => format!("Unknown event type: {}", event.kind()),
    }
}
