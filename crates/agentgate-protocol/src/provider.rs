use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authentication convention used when calling the upstream provider.
///
/// Anything the gateway does not recognize falls back to bearer semantics,
/// so stored configs survive forward-compatible additions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Raw API key under a provider-named header, no `Bearer` prefix.
    ApiKey,
    #[default]
    Bearer,
    #[serde(other)]
    Other,
}

/// Per-provider translation and dispatch configuration.
///
/// A provider row may carry no config at all; every consumer of this type
/// must fall back to OpenAI-compatible defaults in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub auth_header: String,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    /// Applied after the request is built, only for keys not already set.
    #[serde(default)]
    pub request_defaults: Map<String, Value>,
    /// Canonical response field name -> extraction path.
    #[serde(default)]
    pub response_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub request_schema: Option<RequestSchema>,
}

/// Declarative shape of the upstream request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSchema {
    /// Key carrying the model name. Empty means omit the model field.
    #[serde(default = "default_model_field")]
    pub model_field: String,
    /// Key carrying the messages array. Empty means the default `messages`.
    #[serde(default = "default_messages_field")]
    pub messages_field: String,
    #[serde(default)]
    pub message: Option<MessageTransform>,
    /// When set, all transformed options nest under this single key.
    #[serde(default)]
    pub options_wrapper: Option<String>,
    #[serde(default)]
    pub options_rename: BTreeMap<String, String>,
    #[serde(default)]
    pub options_omit: BTreeSet<String>,
}

impl Default for RequestSchema {
    /// The OpenAI-compatible wire shape: `model`, `messages`, flat options.
    fn default() -> Self {
        Self {
            model_field: default_model_field(),
            messages_field: default_messages_field(),
            message: None,
            options_wrapper: None,
            options_rename: BTreeMap::new(),
            options_omit: BTreeSet::new(),
        }
    }
}

fn default_model_field() -> String {
    "model".to_string()
}

fn default_messages_field() -> String {
    "messages".to_string()
}

/// Per-message shape of the upstream messages array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageTransform {
    /// Key carrying the role. Empty means the default `role`.
    #[serde(default)]
    pub role_field: String,
    /// Where the content goes. A single `"arr[].field"` marker nests the
    /// content as the sole element of an array. Empty means `content`.
    #[serde(default)]
    pub content_path: String,
    /// Literal role renames, e.g. `assistant` -> `model`.
    #[serde(default)]
    pub role_map: BTreeMap<String, String>,
}

/// Everything needed to dispatch one upstream call, resolved in a single
/// read-only lookup. The API key is a secret and must never be logged or
/// echoed in errors.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub model_key: String,
    pub request_url: String,
    pub api_key: String,
    /// Authoritative at resolution time; never decremented here.
    pub tokens_available: i64,
    pub provider_name: String,
    pub config: Option<ProviderConfig>,
}
