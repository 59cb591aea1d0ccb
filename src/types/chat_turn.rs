use serde::{Deserialize, Serialize};

/// Role of a turn in the conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message in a conversation.
///
/// The same shape is persisted in the history file and sent to the service as
/// a request message.  `content` is `None` when the service produced no text;
/// it serializes as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced this turn.
    pub role: TurnRole,

    /// The text of the turn.
    pub content: Option<String>,
}

impl ChatTurn {
    /// Create a new `ChatTurn`.
    pub fn new(role: TurnRole, content: Option<String>) -> Self {
        Self { role, content }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, Some(content.into()))
    }

    /// Create an assistant turn.  Pass `None` when the service returned no text.
    pub fn assistant(content: impl Into<Option<String>>) -> Self {
        Self::new(TurnRole::Assistant, content.into())
    }

    /// The content as a string slice, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
