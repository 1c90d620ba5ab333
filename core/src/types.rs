//! Core data types for Callsight completions

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message
    #[serde(default)]
    pub role: Role,
    /// Message text
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// Providers send `"content": null` for tool calls and refusals.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-call overrides layered over the client defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Model identifier for this call only
    pub model: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Nucleus sampling; omitted from the wire unless set
    pub top_p: Option<f32>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Wire-ready chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub stream: bool,
}

/// Chat completion response as returned by an OpenAI-compatible endpoint.
///
/// Every field tolerates absence so that a thin or partial reply still
/// decodes; `choices` in particular may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: String,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

impl CompletionResponse {
    /// Creation time, when the provider supplied a valid timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.created <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.created, 0).single()
    }
}

/// One generated alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token accounting for a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Outcome of intent classification.
///
/// Holds the model's JSON reply verbatim. Keys may be missing or mistyped;
/// the accessors read what is there without validating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult(pub serde_json::Value);

impl ClassificationResult {
    pub fn new(intent: impl Into<String>, confidence: f64) -> Self {
        Self(json!({ "intent": intent.into(), "confidence": confidence }))
    }

    /// Value used when the model reply cannot be parsed
    pub fn fallback() -> Self {
        Self::new("other", 0.5)
    }

    /// Chosen category label, when the reply carries a string `intent`
    pub fn intent(&self) -> Option<&str> {
        self.0.get("intent").and_then(serde_json::Value::as_str)
    }

    /// Confidence (0.0 to 1.0 by convention), passed through unchecked
    pub fn confidence(&self) -> Option<f64> {
        self.0.get("confidence").and_then(serde_json::Value::as_f64)
    }

    /// The reply as received
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Sentiment label.
///
/// Labels outside the three documented ones are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    #[serde(untagged)]
    Other(String),
}

impl From<&str> for Sentiment {
    fn from(label: &str) -> Self {
        match label {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "neutral" => Sentiment::Neutral,
            other => Sentiment::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Outcome of sentiment analysis.
///
/// Holds the model's JSON reply verbatim, like [`ClassificationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentResult(pub serde_json::Value);

impl SentimentResult {
    pub fn new(sentiment: Sentiment, score: f64) -> Self {
        Self(json!({ "sentiment": sentiment.to_string(), "score": score }))
    }

    /// Value used when the model reply cannot be parsed
    pub fn fallback() -> Self {
        Self::new(Sentiment::Neutral, 0.0)
    }

    /// Sentiment label, when the reply carries a string `sentiment`
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.0
            .get("sentiment")
            .and_then(serde_json::Value::as_str)
            .map(Sentiment::from)
    }

    /// Signed magnitude (-1.0 to 1.0 by convention), passed through unchecked
    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(serde_json::Value::as_f64)
    }

    /// The reply as received
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}
