use serde::{Deserialize, Serialize};

use crate::types::{CompletionUsage, FinishReason, TurnRole};

/// A complete, non-streaming chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Unique identifier for the completion.
    #[serde(default)]
    pub id: String,

    /// The model that produced the completion.
    #[serde(default)]
    pub model: String,

    /// Unix timestamp of creation, in seconds.
    #[serde(default)]
    pub created: u64,

    /// Alternative completions; this client only ever asks for one.
    pub choices: Vec<Choice>,

    /// Token accounting, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

/// One alternative in a [`ChatCompletion`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: CompletionMessage,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// The message carried by a [`Choice`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionMessage {
    /// Always the assistant in practice.
    pub role: TurnRole,

    /// The generated text; absent or null when the model produced none.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Create a completion with a single assistant choice.
    pub fn new(content: Option<String>) -> Self {
        Self {
            id: String::new(),
            model: String::new(),
            created: 0,
            choices: vec![Choice {
                index: 0,
                message: CompletionMessage {
                    role: TurnRole::Assistant,
                    content,
                },
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: None,
        }
    }

    /// The first choice, if the service returned any.
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    /// The text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|choice| choice.message.content.as_deref())
    }
}
