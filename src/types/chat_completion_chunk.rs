use serde::{Deserialize, Serialize};

use crate::types::{CompletionUsage, FinishReason, TurnRole};

/// One incremental piece of a streamed chat completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Identifier shared by every chunk of one completion.
    #[serde(default)]
    pub id: String,

    /// The model producing the stream.
    #[serde(default)]
    pub model: String,

    /// Unix timestamp of creation, in seconds.
    #[serde(default)]
    pub created: u64,

    /// Per-choice deltas.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Groq reports usage for the whole stream inside `x_groq` on the last chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_groq: Option<GroqChunkExtra>,
}

/// The delta for one choice within a chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Position of the choice this delta belongs to.
    #[serde(default)]
    pub index: u32,

    /// The incremental update.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Set on the final chunk of a choice.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// Incremental message content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkDelta {
    /// Present on the first chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<TurnRole>,

    /// The next fragment of text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Groq-specific trailer carried by streaming chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroqChunkExtra {
    /// Request identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// Usage for the whole stream, present on the final chunk.
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

impl ChatCompletionChunk {
    /// Create a chunk carrying one text fragment for choice 0.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: Some(text.into()),
                },
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    /// The text fragment of the first choice, if this chunk carries one.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }

    /// Usage reported on the final chunk, if any.
    pub fn usage(&self) -> Option<CompletionUsage> {
        self.x_groq.as_ref().and_then(|extra| extra.usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_chunk_has_role_and_empty_content() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1733000000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "delta": {"role": "assistant", "content": ""},
                "logprobs": null,
                "finish_reason": null
            }],
            "x_groq": {"id": "req_01"}
        }))
        .unwrap();
        assert_eq!(chunk.text(), Some(""));
        assert_eq!(chunk.choices[0].delta.role, Some(TurnRole::Assistant));
        assert!(chunk.usage().is_none());
    }

    #[test]
    fn final_chunk_carries_usage() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "delta": {},
                "finish_reason": "stop"
            }],
            "x_groq": {
                "id": "req_01",
                "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
            }
        }))
        .unwrap();
        assert_eq!(chunk.text(), None);
        assert_eq!(chunk.choices[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(chunk.usage(), Some(CompletionUsage::new(3, 4)));
    }

    #[test]
    fn with_text_builds_a_fragment() {
        let chunk = ChatCompletionChunk::with_text("Hel");
        assert_eq!(chunk.text(), Some("Hel"));
    }
}
