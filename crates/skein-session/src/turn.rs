//! The turn prompt controller.
//!
//! A turn is open while this client plays a character *and* a prompt
//! addressed to it is open. While it is, the player edits a free-text
//! draft (typing, or picking an action which writes its encoded token
//! into the draft) and then submits, skips, or leaves.
//!
//! There is no client-side timeout: the turn stays open until the player
//! acts or the backend prompts someone else.

use skein_protocol::{Action, ClientMessage};

use crate::{ActionForm, Session, SessionError, SessionStore, commands};

/// What the presentation needs to show an open turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnView<'a> {
    pub character: &'a str,
    pub room: Option<&'a str>,
    pub prompt: &'a str,
    pub actions: &'a [Action],
}

/// Holds the draft input for the current turn.
#[derive(Debug, Clone, Default)]
pub struct TurnController {
    draft: String,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open turn, or `None` if it isn't our turn.
    pub fn view<'a>(&self, session: &'a Session) -> Option<TurnView<'a>> {
        if !session.is_my_turn() {
            return None;
        }
        let prompt = session.prompt()?;
        Some(TurnView {
            character: &prompt.character.name,
            room: prompt.room.as_ref().map(|room| room.name.as_str()),
            prompt: &prompt.prompt,
            actions: &prompt.actions,
        })
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Writes the form's encoded token into the draft. Nothing is sent;
    /// the player can still edit or submit it.
    pub fn choose_action(&mut self, form: &ActionForm) {
        self.draft = form.encode();
    }

    /// Builds the `input` command for the draft without changing anything.
    ///
    /// Send the result, then call [`commit`](Self::commit) once the send
    /// succeeded. On a failed send the draft and prompt are still there
    /// to retry.
    ///
    /// # Errors
    /// Returns [`SessionError::NoCharacter`] if no character is bound.
    pub fn prepare(&self, session: &Session) -> Result<ClientMessage, SessionError> {
        commands::submit_input(session, self.draft.as_str())
    }

    /// Clears the draft and closes the prompt after the input went out.
    ///
    /// The prompt is closed optimistically: the backend sends no
    /// acknowledgement, and the next prompt (for us or anyone) will
    /// arrive as usual.
    pub fn commit(&mut self, store: &mut SessionStore) {
        self.draft.clear();
        store.clear_prompt();
        tracing::debug!("turn submitted");
    }

    /// [`prepare`](Self::prepare) and [`commit`](Self::commit) in one
    /// step, for callers whose delivery cannot fail.
    ///
    /// # Errors
    /// Returns [`SessionError::NoCharacter`] if no character is bound.
    /// The draft and prompt are left untouched in that case.
    pub fn submit(&mut self, store: &mut SessionStore) -> Result<ClientMessage, SessionError> {
        let message = self.prepare(store.state())?;
        self.commit(store);
        Ok(message)
    }

    /// Closes the prompt without sending anything.
    pub fn skip(&mut self, store: &mut SessionStore) {
        self.draft.clear();
        store.clear_prompt();
        tracing::debug!("turn skipped");
    }

    /// Closes the prompt without sending anything. The character stays
    /// bound; releasing it is a separate command.
    pub fn leave(&mut self, store: &mut SessionStore) {
        self.draft.clear();
        store.clear_prompt();
        tracing::debug!("left turn prompt");
    }
}
