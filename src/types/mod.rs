// Public modules
pub mod chat_completion;
pub mod chat_completion_chunk;
pub mod chat_completion_create_params;
pub mod chat_turn;
pub mod completion_usage;
pub mod finish_reason;
pub mod model;

// Re-exports
pub use chat_completion::{ChatCompletion, Choice, CompletionMessage};
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, ChunkDelta, GroqChunkExtra};
pub use chat_completion_create_params::ChatCompletionCreateParams;
pub use chat_turn::{ChatTurn, TurnRole};
pub use completion_usage::CompletionUsage;
pub use finish_reason::FinishReason;
pub use model::{KnownModel, Model};
