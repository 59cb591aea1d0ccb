//! Resolving the API key from the credential store or the terminal.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::observability::CREDENTIAL_PROMPTS;

const KEY_PROMPT: &str = "Enter your Groq API key: ";

/// A source of one line of user input for a missing API key.
pub trait KeyPrompt {
    /// Show `prompt` and return the line the user typed.
    fn read_key(&mut self, prompt: &str) -> Result<String>;
}

/// Reads the key from the controlling terminal with rustyline.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl KeyPrompt for TerminalPrompt {
    fn read_key(&mut self, prompt: &str) -> Result<String> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        editor.readline(prompt).map_err(readline_error)
    }
}

fn readline_error(err: ReadlineError) -> Error {
    match err {
        ReadlineError::Eof | ReadlineError::Interrupted => {
            Error::abort("no API key was entered")
        }
        ReadlineError::Io(err) => Error::io("failed to read API key from the terminal", err),
        other => Error::io(
            "failed to read API key from the terminal",
            std::io::Error::other(other.to_string()),
        ),
    }
}

/// Return the API key stored under `slot`, prompting for and persisting one
/// if the slot is absent or empty.
///
/// The entered line is trimmed.  An empty entry is rejected and nothing is
/// stored.
pub fn resolve_api_key(
    store: &CredentialStore,
    slot: &str,
    prompt: &mut dyn KeyPrompt,
) -> Result<String> {
    if let Some(key) = store.get(slot)?
        && !key.trim().is_empty()
    {
        return Ok(key);
    }

    CREDENTIAL_PROMPTS.click();
    let entered = prompt.read_key(KEY_PROMPT)?;
    let key = entered.trim();
    if key.is_empty() {
        return Err(Error::validation(
            "API key must not be empty",
            Some(slot.to_string()),
        ));
    }
    store.set(slot, key)?;
    tracing::info!(path = %store.path().as_str(), slot, "stored API key");
    Ok(key.to_string())
}
