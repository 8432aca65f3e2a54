//! Provider response body -> canonical [`ChatResponse`].
//!
//! The mapped path extracts fields one by one and degrades gracefully:
//! a malformed or non-matching path skips its field and never aborts the
//! whole response.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use agentgate_protocol::ChatResponse;
use serde_json::Value;

use crate::path::eval_path;

#[derive(Debug)]
pub enum ResponseTransformError {
    Parse(serde_json::Error),
}

impl fmt::Display for ResponseTransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseTransformError::Parse(err) => {
                write!(f, "failed to parse provider response: {err}")
            }
        }
    }
}

impl Error for ResponseTransformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResponseTransformError::Parse(err) => Some(err),
        }
    }
}

type FieldSetter = fn(&mut ChatResponse, &Value);

/// Closed set of canonical fields. Adding a field is one registration here.
const FIELD_SETTERS: &[(&str, FieldSetter)] = &[
    ("id", |r, v| set_string(&mut r.id, v)),
    ("model", |r, v| set_string(&mut r.model, v)),
    ("content", |r, v| set_string(&mut r.content, v)),
    ("role", |r, v| set_string(&mut r.role, v)),
    ("finish_reason", |r, v| set_string(&mut r.finish_reason, v)),
    ("prompt_tokens", |r, v| r.prompt_tokens = to_i64(v)),
    ("completion_tokens", |r, v| r.completion_tokens = to_i64(v)),
    ("total_tokens", |r, v| r.total_tokens = to_i64(v)),
];

/// Extract a canonical response using path-addressed field mappings.
///
/// Mapping entries with an empty path or the literal `"null"` are skipped,
/// as are unrecognized canonical field names.
pub fn transform_response(
    body: &[u8],
    mapping: &BTreeMap<String, String>,
) -> Result<ChatResponse, ResponseTransformError> {
    let doc: Value = serde_json::from_slice(body).map_err(ResponseTransformError::Parse)?;

    let mut response = ChatResponse::default();
    for (field, path) in mapping {
        if path.is_empty() || path == "null" {
            continue;
        }
        let Some(setter) = field_setter(field) else {
            continue;
        };
        let Some(value) = eval_path(&doc, path) else {
            continue;
        };
        setter(&mut response, value);
    }

    if response.total_tokens == 0
        && (response.prompt_tokens > 0 || response.completion_tokens > 0)
    {
        response.total_tokens = response.prompt_tokens + response.completion_tokens;
    }

    Ok(response)
}

/// Schema-less fallback: the body is already canonical-shaped JSON.
pub fn parse_response_fallback(body: &[u8]) -> Result<ChatResponse, ResponseTransformError> {
    serde_json::from_slice(body).map_err(ResponseTransformError::Parse)
}

fn field_setter(field: &str) -> Option<FieldSetter> {
    FIELD_SETTERS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, setter)| *setter)
}

fn set_string(target: &mut String, value: &Value) {
    if let Some(s) = value.as_str() {
        *target = s.to_string();
    }
}

fn to_i64(value: &Value) -> i64 {
    if let Some(i) = value.as_i64() {
        i
    } else if let Some(f) = value.as_f64() {
        f as i64
    } else {
        0
    }
}
