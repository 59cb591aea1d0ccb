use serde::{Deserialize, Serialize};

/// Token accounting reported by the service for a completed request.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionUsage {
    /// Tokens consumed by the request messages.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Tokens generated for the response.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Sum of prompt and completion tokens.
    #[serde(default)]
    pub total_tokens: u64,
}

impl CompletionUsage {
    /// Create a new `CompletionUsage`; the total is derived.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}
