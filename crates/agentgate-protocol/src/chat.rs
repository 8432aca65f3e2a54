use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a canonical chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Canonical inbound request for the budget-gated consume operation.
///
/// `options` is an opaque key -> JSON value table forwarded to the upstream
/// provider after schema-driven renaming; the gateway never interprets the
/// values themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeRequest {
    pub model_key: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub options: Map<String, Value>,
    pub max_cost: f64,
}

/// Canonical provider-agnostic chat response.
///
/// Every field is defaultable so the schema-less fallback parse accepts
/// partial provider bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub finish_reason: String,
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
}
