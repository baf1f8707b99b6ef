//! The outbound command builder.
//!
//! Each function returns the [`ClientMessage`] for one user intent. None
//! of them judge whether the intent makes sense in the game (the backend
//! does that); the only client-side rule is that turn input needs a bound
//! character.

use skein_protocol::{ClientMessage, GameEvent, PlayerCommand, RenderRequest};

use crate::{Session, SessionError};

/// Ask to play `character`.
pub fn become_character(character: impl Into<String>) -> ClientMessage {
    ClientMessage::Player(PlayerCommand::Become {
        r#become: Some(character.into()),
    })
}

/// Give up the current character.
pub fn release_character() -> ClientMessage {
    ClientMessage::Player(PlayerCommand::Become { r#become: None })
}

/// Change this client's display name.
pub fn rename(name: impl Into<String>) -> ClientMessage {
    ClientMessage::Player(PlayerCommand::Rename { name: name.into() })
}

/// Send turn input: free text or an encoded action token.
///
/// # Errors
/// Returns [`SessionError::NoCharacter`] unless `session` has a bound
/// character.
pub fn submit_input(
    session: &Session,
    input: impl Into<String>,
) -> Result<ClientMessage, SessionError> {
    if session.player_character().is_none() {
        return Err(SessionError::NoCharacter);
    }
    Ok(ClientMessage::Input {
        input: input.into(),
    })
}

/// Ask for an image of an entity or event.
pub fn render(request: RenderRequest) -> ClientMessage {
    ClientMessage::Render(request)
}

/// Ask for an image of a logged event.
///
/// # Errors
/// Returns [`SessionError::MissingEventId`] if the event has no id.
pub fn render_event(event: &GameEvent) -> Result<ClientMessage, SessionError> {
    let id = event.id().ok_or(SessionError::MissingEventId)?;
    Ok(render(RenderRequest::event(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_protocol::{Character, ReplyEvent};

    fn playing(name: &str) -> Session {
        let mut session = Session::default();
        session.player_character = Some(Character {
            name: name.into(),
            ..Character::default()
        });
        session
    }

    #[test]
    fn test_submit_input_requires_character() {
        let result = submit_input(&Session::default(), "look");
        assert!(matches!(result, Err(SessionError::NoCharacter)));
    }

    #[test]
    fn test_submit_input_with_character_builds_input() {
        let message = submit_input(&playing("Bob"), "look around").unwrap();
        assert_eq!(
            message,
            ClientMessage::Input {
                input: "look around".into()
            }
        );
    }

    #[test]
    fn test_become_and_release_encode_player_messages() {
        assert_eq!(
            become_character("Bob").encode().unwrap(),
            r#"{"type":"player","become":"Bob"}"#
        );
        assert_eq!(
            release_character().encode().unwrap(),
            r#"{"type":"player","become":null}"#
        );
        assert_eq!(
            rename("Alice").encode().unwrap(),
            r#"{"type":"player","name":"Alice"}"#
        );
    }

    #[test]
    fn test_render_event_uses_event_id() {
        let event = GameEvent::Reply(ReplyEvent {
            id: Some("e-3".into()),
            text: "hi".into(),
        });

        assert_eq!(
            render_event(&event).unwrap(),
            ClientMessage::Render(RenderRequest::event("e-3"))
        );
    }

    #[test]
    fn test_render_event_without_id_is_error() {
        let event = GameEvent::Reply(ReplyEvent {
            id: None,
            text: "hi".into(),
        });

        assert!(matches!(
            render_event(&event),
            Err(SessionError::MissingEventId)
        ));
    }
}
