use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Groq model identifier.
///
/// This can be a predefined model or a custom string value for models that
/// are not listed here.  Either way it serializes as the bare model name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Known Groq-hosted models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Llama 3.3 70B, versatile.
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama3370bVersatile,

    /// Llama 3.1 8B, instant.
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama318bInstant,

    /// Llama 3 70B with an 8k context.
    #[serde(rename = "llama3-70b-8192")]
    Llama370b8192,

    /// Llama 3 8B with an 8k context.
    #[serde(rename = "llama3-8b-8192")]
    Llama38b8192,

    /// Gemma 2 9B, instruction tuned.
    #[serde(rename = "gemma2-9b-it")]
    Gemma29bIt,

    /// Mixtral 8x7B with a 32k context.
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b32768,
}

impl KnownModel {
    /// Every known model, in display order.
    pub const ALL: [KnownModel; 6] = [
        KnownModel::Llama3370bVersatile,
        KnownModel::Llama318bInstant,
        KnownModel::Llama370b8192,
        KnownModel::Llama38b8192,
        KnownModel::Gemma29bIt,
        KnownModel::Mixtral8x7b32768,
    ];

    /// The wire name of the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Llama3370bVersatile => "llama-3.3-70b-versatile",
            KnownModel::Llama318bInstant => "llama-3.1-8b-instant",
            KnownModel::Llama370b8192 => "llama3-70b-8192",
            KnownModel::Llama38b8192 => "llama3-8b-8192",
            KnownModel::Gemma29bIt => "gemma2-9b-it",
            KnownModel::Mixtral8x7b32768 => "mixtral-8x7b-32768",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Llama3370bVersatile)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    /// Known names resolve to [`Model::Known`]; anything else is passed through.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
