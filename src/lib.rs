// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod credentials;
pub mod error;
pub mod history;
pub mod render;
pub mod setup;
pub mod types;

mod observability;
mod sse;

// Re-exports
pub use client::{ChunkStream, CompletionService, Groq};
pub use client_logger::ClientLogger;
pub use credentials::CredentialStore;
pub use error::{Error, Result};
pub use history::{DEFAULT_MAX_HISTORY, HistoryLedger};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
