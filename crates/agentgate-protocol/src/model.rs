use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A stored model routable through the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub model_key: String,
    pub name: String,
    pub description: String,
    pub provider_id: i64,
    pub request_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Input for registering a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub model_key: String,
    pub name: String,
    pub description: String,
    pub provider_id: i64,
    pub request_url: String,
}
