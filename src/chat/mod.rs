//! The chat application: one message in, one response out.
//!
//! This module drives a single invocation of `groq-chat`:
//!
//! - The API key comes from the credential store, or from the terminal once
//! - The persisted history is sent as context with the new message
//! - Responses stream with a short delay per fragment, or arrive whole
//! - Both turns are appended to the bounded history afterwards
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`key`]: API key resolution
//! - [`session`]: The request, render, and persist flow

mod config;
mod key;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use config::{
    ChatArgs, ChatConfig, DEFAULT_CREDENTIAL_FILE, DEFAULT_CREDENTIAL_SLOT, DEFAULT_HISTORY_FILE,
    DEFAULT_PACING,
};
pub use key::{KeyPrompt, TerminalPrompt, resolve_api_key};
pub use session::{ChatSession, RESET_NOTICE, join_message, run_chat};
