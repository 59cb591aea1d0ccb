use serde::{Deserialize, Serialize};

use crate::types::{ChatTurn, Model};

/// Parameters for a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionCreateParams {
    /// The conversation so far, oldest first, ending with the new user turn.
    pub messages: Vec<ChatTurn>,

    /// The model that will complete the conversation.
    pub model: Model,

    /// Whether the response is delivered as a stream of chunks.
    pub stream: bool,
}

impl ChatCompletionCreateParams {
    /// Create non-streaming parameters.
    pub fn new(messages: Vec<ChatTurn>, model: Model) -> Self {
        Self {
            messages,
            model,
            stream: false,
        }
    }

    /// Create streaming parameters.
    pub fn new_streaming(messages: Vec<ChatTurn>, model: Model) -> Self {
        Self {
            messages,
            model,
            stream: true,
        }
    }

    /// Set whether the response should be streamed.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
