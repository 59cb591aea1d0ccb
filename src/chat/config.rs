//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! [`ChatConfig`] that every component of a run receives explicitly.

use std::time::Duration;

use arrrg_derive::CommandLine;
use utf8path::Path;

use crate::history::DEFAULT_MAX_HISTORY;
use crate::types::Model;

/// Ledger file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = ".groq_chat_history.json";

/// Credential file name, relative to the working directory.
pub const DEFAULT_CREDENTIAL_FILE: &str = ".groq_key.json";

/// The credential slot holding the API key.
pub const DEFAULT_CREDENTIAL_SLOT: &str = "GROQ_API_KEY";

/// Delay before each streamed fragment is displayed.
pub const DEFAULT_PACING: Duration = Duration::from_millis(60);

/// Command-line arguments for the groq-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    pub model: Option<String>,

    /// Clear the history before sending the message.
    #[arrrg(flag, "Reset the conversation history first")]
    pub reset: bool,

    /// Accepted for compatibility; streaming is already the default.
    #[arrrg(flag, "Stream the response (default)")]
    pub stream: bool,

    /// Wait for the whole response instead of streaming it.
    #[arrrg(flag, "Wait for the complete response instead of streaming")]
    pub no_stream: bool,

    /// How many turns the history keeps.
    #[arrrg(optional, "Turns of history to keep (default: 20)", "TURNS")]
    pub max_history: Option<u32>,

    /// Milliseconds to wait before each streamed fragment.
    #[arrrg(optional, "Delay before each streamed fragment (default: 60)", "MS")]
    pub pacing_ms: Option<u32>,

    /// Where the history lives.
    #[arrrg(optional, "History file (default: .groq_chat_history.json)", "FILE")]
    pub history_file: Option<String>,

    /// Where the API key lives.
    #[arrrg(optional, "Credential file (default: .groq_key.json)", "FILE")]
    pub credential_file: Option<String>,

    /// Alternate service endpoint.
    #[arrrg(optional, "Base URL of the OpenAI-compatible API", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Add this binary's directory to PATH in the shell profiles and exit.
    #[arrrg(flag, "Add the install directory to PATH in shell profiles")]
    pub install: bool,
}

/// Configuration for a single chat invocation.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Whether to stream the response.
    pub stream: bool,

    /// Whether to clear the history before sending.
    pub reset: bool,

    /// The most turns the history keeps.
    pub max_history: usize,

    /// Delay before each streamed fragment.  Zero disables pacing.
    pub pacing: Duration,

    /// The ledger file.
    pub history_path: Path<'static>,

    /// The credential file.
    pub credential_path: Path<'static>,

    /// Name of the credential slot holding the API key.
    pub credential_slot: String,

    /// Service endpoint override; `None` uses the public Groq API.
    pub base_url: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: llama-3.3-70b-versatile
    /// - Streaming: enabled, 60ms pacing
    /// - History: 20 turns in `.groq_chat_history.json`
    /// - Credentials: `GROQ_API_KEY` in `.groq_key.json`
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            stream: true,
            reset: false,
            max_history: DEFAULT_MAX_HISTORY,
            pacing: DEFAULT_PACING,
            history_path: Path::from(DEFAULT_HISTORY_FILE),
            credential_path: Path::from(DEFAULT_CREDENTIAL_FILE),
            credential_slot: DEFAULT_CREDENTIAL_SLOT.to_string(),
            base_url: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets whether the response is streamed.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Sets whether history is cleared before sending.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Sets the history bound.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Sets the streaming pacing delay.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the ledger file.
    pub fn with_history_path(mut self, path: impl Into<Path<'static>>) -> Self {
        self.history_path = path.into();
        self
    }

    /// Sets the credential file.
    pub fn with_credential_path(mut self, path: impl Into<Path<'static>>) -> Self {
        self.credential_path = path.into();
        self
    }

    /// Sets the credential slot name.
    pub fn with_credential_slot(mut self, slot: impl Into<String>) -> Self {
        self.credential_slot = slot.into();
        self
    }

    /// Sets the service base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or(defaults.model.clone());

        ChatConfig {
            model,
            stream: !args.no_stream,
            reset: args.reset,
            max_history: args
                .max_history
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_MAX_HISTORY),
            pacing: args
                .pacing_ms
                .map(|ms| Duration::from_millis(ms.into()))
                .unwrap_or(DEFAULT_PACING),
            history_path: args
                .history_file
                .map(Path::from)
                .unwrap_or(defaults.history_path.clone()),
            credential_path: args
                .credential_file
                .map(Path::from)
                .unwrap_or(defaults.credential_path.clone()),
            base_url: args.base_url,
            use_color: !args.no_color,
            ..defaults
        }
    }
}
