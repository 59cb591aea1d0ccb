//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which sends one user message
//! with the persisted history as context, renders the reply, and records both
//! turns in the history ledger.

use futures::StreamExt;

use crate::chat::config::ChatConfig;
use crate::chat::key::{KeyPrompt, resolve_api_key};
use crate::client::CompletionService;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::history::HistoryLedger;
use crate::render::Renderer;
use crate::types::{ChatCompletionCreateParams, ChatTurn, CompletionUsage, Model};

/// Shown after the history is cleared.
pub const RESET_NOTICE: &str = "[ History reset ]";

/// A chat session bound to one completion service and one history ledger.
pub struct ChatSession<S: CompletionService> {
    service: S,
    config: ChatConfig,
    ledger: HistoryLedger,
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session, opening the ledger named by `config`.
    pub fn new(service: S, config: ChatConfig) -> Result<Self> {
        let ledger = HistoryLedger::open(config.history_path.clone(), config.max_history)?;
        Ok(Self {
            service,
            config,
            ledger,
        })
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Returns the ledger this session records into.
    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Clears the persisted conversation history.
    pub fn reset_history(&self, renderer: &mut dyn Renderer) -> Result<()> {
        self.ledger.reset()?;
        renderer.print_info(RESET_NOTICE);
        Ok(())
    }

    /// Sends a user message and renders the response.
    ///
    /// This method:
    /// 1. Builds the request from the stored history plus the new message
    /// 2. Streams or waits for the response, per the configuration
    /// 3. Appends the user turn and then the assistant turn to the ledger
    ///
    /// The returned value is the assistant content that was persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request or the stream fails.  Nothing is
    /// persisted in that case.
    pub async fn send(&self, message: &str, renderer: &mut dyn Renderer) -> Result<Option<String>> {
        let mut messages = self.ledger.load()?;
        messages.push(ChatTurn::user(message));
        let params = ChatCompletionCreateParams::new(messages, self.config.model.clone())
            .with_stream(self.config.stream);

        let response = if self.config.stream {
            Some(self.stream_response(params, renderer).await?)
        } else {
            self.complete_response(params, renderer).await?
        };

        self.ledger.append(ChatTurn::user(message))?;
        self.ledger.append(ChatTurn::assistant(response.clone()))?;
        Ok(response)
    }

    async fn stream_response(
        &self,
        params: ChatCompletionCreateParams,
        renderer: &mut dyn Renderer,
    ) -> Result<String> {
        let mut stream = self.service.complete_streaming(params).await?;
        let mut response = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(usage) = chunk.usage() {
                log_usage(usage);
            }
            let Some(fragment) = chunk.text() else {
                continue;
            };
            if fragment.is_empty() {
                continue;
            }
            if !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
            renderer.print_text(fragment);
            response.push_str(fragment);
        }
        renderer.finish_response();
        Ok(response)
    }

    async fn complete_response(
        &self,
        params: ChatCompletionCreateParams,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<String>> {
        let completion = self.service.complete(params).await?;
        let Some(choice) = completion.first_choice() else {
            return Err(Error::serialization("response contained no choices", None));
        };
        let content = choice.message.content.clone();
        if let Some(text) = &content {
            renderer.print_text(text);
        }
        renderer.finish_response();
        Ok(content)
    }
}

fn log_usage(usage: CompletionUsage) {
    tracing::debug!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "chat completion usage"
    );
}

/// Join the positional message words with single spaces.
pub fn join_message(words: &[String]) -> Result<String> {
    if words.is_empty() {
        return Err(Error::validation(
            "a message is required",
            Some("message".to_string()),
        ));
    }
    Ok(words.join(" "))
}

/// Run one complete chat invocation.
///
/// Resolves the API key (prompting if needed), builds the service with
/// `connect`, optionally clears the history, then sends `message`.
pub async fn run_chat<S, F>(
    config: ChatConfig,
    message: &str,
    prompt: &mut dyn KeyPrompt,
    connect: F,
    renderer: &mut dyn Renderer,
) -> Result<Option<String>>
where
    S: CompletionService,
    F: FnOnce(String) -> Result<S>,
{
    let store = CredentialStore::open(config.credential_path.clone())?;
    let api_key = resolve_api_key(&store, &config.credential_slot, prompt)?;
    let service = connect(api_key)?;

    let reset = config.reset;
    let session = ChatSession::new(service, config)?;
    if reset {
        session.reset_history(renderer)?;
    }
    session.send(message, renderer).await
}
