//! Canonical request -> provider wire shape.
//!
//! The builder always receives a fully-populated [`RequestSchema`]; callers
//! resolve the OpenAI-compatible default at the boundary when a provider
//! carries no schema.

use agentgate_protocol::{ChatMessage, MessageTransform, RequestSchema};
use serde_json::{json, Map, Value};

/// Marker splitting a content path into array field and nested field.
const ARRAY_MARKER: &str = "[].";

/// Build the upstream request body for one provider call.
///
/// Request defaults are not applied here; the orchestrator layers them on
/// with [`apply_request_defaults`] after the body is built.
pub fn build_provider_request(
    model_key: &str,
    messages: &[ChatMessage],
    options: &Map<String, Value>,
    schema: &RequestSchema,
) -> Map<String, Value> {
    let mut out = Map::new();

    if !schema.model_field.is_empty() {
        out.insert(
            schema.model_field.clone(),
            Value::String(model_key.to_string()),
        );
    }

    let message_transform = schema.message.clone().unwrap_or_default();
    let rendered = messages
        .iter()
        .map(|message| Value::Object(transform_message(message, &message_transform)))
        .collect();
    let messages_field = non_empty_or(&schema.messages_field, "messages");
    out.insert(messages_field.to_string(), Value::Array(rendered));

    let options = transform_options(options, schema);
    match schema.options_wrapper.as_deref() {
        Some(wrapper) if !wrapper.is_empty() && !options.is_empty() => {
            out.insert(wrapper.to_string(), Value::Object(options));
        }
        _ => {
            for (key, value) in options {
                out.insert(key, value);
            }
        }
    }

    out
}

/// Merge provider defaults into an already-built request body.
///
/// Defaults never override keys set while building.
pub fn apply_request_defaults(request: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, value) in defaults {
        if !request.contains_key(key) {
            request.insert(key.clone(), value.clone());
        }
    }
}

fn transform_message(message: &ChatMessage, transform: &MessageTransform) -> Map<String, Value> {
    let literal = message.role.as_str();
    let role = transform
        .role_map
        .get(literal)
        .map(String::as_str)
        .unwrap_or(literal);

    let mut out = Map::new();
    let role_field = non_empty_or(&transform.role_field, "role");
    out.insert(role_field.to_string(), Value::String(role.to_string()));

    let content_path = non_empty_or(&transform.content_path, "content");
    if let Some((array_field, nested_field)) = content_path.split_once(ARRAY_MARKER) {
        // Content becomes the sole element of an array under array_field.
        let element = json!({ nested_field: message.content });
        out.insert(array_field.to_string(), Value::Array(vec![element]));
    } else {
        out.insert(
            content_path.to_string(),
            Value::String(message.content.clone()),
        );
    }

    out
}

fn transform_options(options: &Map<String, Value>, schema: &RequestSchema) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in options {
        if schema.options_omit.contains(key) {
            continue;
        }
        let key = schema
            .options_rename
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.clone());
        out.insert(key, value.clone());
    }
    out
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
