//! The consume pipeline: validate -> resolve -> gate -> build -> dispatch
//! -> classify -> transform. Linear, single attempt, no rollback needed
//! because nothing is mutated before a failure.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{error, warn};

use agentgate_protocol::{ChatResponse, ConsumeRequest, RequestSchema};
use agentgate_transform::{
    apply_request_defaults, build_provider_request, parse_response_fallback, transform_response,
};

use crate::budget::check_budget;
use crate::error::{GatewayError, GatewayResult};
use crate::headers::{header_set, set_provider_headers, Headers};
use crate::resolver::CredentialResolver;
use crate::upstream::UpstreamClient;

/// Orchestrator for budget-gated provider calls. Collaborators are
/// injected at construction so tests can substitute doubles; the engine
/// itself holds no per-call state.
pub struct ConsumeEngine {
    resolver: Arc<dyn CredentialResolver>,
    client: Arc<dyn UpstreamClient>,
}

impl ConsumeEngine {
    pub fn new(resolver: Arc<dyn CredentialResolver>, client: Arc<dyn UpstreamClient>) -> Self {
        Self { resolver, client }
    }

    pub async fn consume(&self, request: &ConsumeRequest) -> GatewayResult<ChatResponse> {
        validate(request)?;

        let creds = self
            .resolver
            .resolve(&request.model_key)
            .await
            .map_err(|err| {
                warn!(model_key = %request.model_key, error = %err, "credential resolution failed");
                GatewayError::Resolution(
                    "model not found or no API key available".to_string(),
                )
            })?;

        check_budget(creds.tokens_available, request.max_cost)?;

        // Absent config/schema collapses to the OpenAI-compatible default
        // here, so the builder never handles optionals.
        let schema = creds
            .config
            .as_ref()
            .and_then(|config| config.request_schema.clone())
            .unwrap_or_else(RequestSchema::default);

        let mut body = build_provider_request(
            &request.model_key,
            &request.messages,
            &request.options,
            &schema,
        );
        if let Some(config) = creds.config.as_ref() {
            apply_request_defaults(&mut body, &config.request_defaults);
        }

        let payload = serde_json::to_vec(&Value::Object(body))
            .map_err(|err| GatewayError::Build(err.to_string()))?;

        let mut headers = Headers::new();
        header_set(&mut headers, "Content-Type", "application/json");
        set_provider_headers(&mut headers, creds.config.as_ref(), &creds.api_key);

        let response = self
            .client
            .send(&creds.request_url, &headers, Bytes::from(payload))
            .await
            .map_err(|failure| {
                error!(
                    provider = %creds.provider_name,
                    kind = ?failure.kind,
                    error = %failure,
                    "failed to reach model provider"
                );
                GatewayError::Transport(failure.message)
            })?;

        if !(200..300).contains(&response.status) {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            error!(
                provider = %creds.provider_name,
                status_code = response.status,
                body = %body,
                "model provider returned error"
            );
            return Err(GatewayError::Upstream {
                status: response.status,
                body,
            });
        }

        let mapping = creds
            .config
            .as_ref()
            .map(|config| &config.response_mapping)
            .filter(|mapping| !mapping.is_empty());
        let transformed = match mapping {
            Some(mapping) => transform_response(&response.body, mapping),
            None => parse_response_fallback(&response.body),
        };
        transformed.map_err(|err| {
            error!(
                provider = %creds.provider_name,
                error = %err,
                body = %String::from_utf8_lossy(&response.body),
                "failed to transform provider response"
            );
            GatewayError::ResponseParse(err.to_string())
        })
    }
}

fn validate(request: &ConsumeRequest) -> GatewayResult<()> {
    if request.model_key.trim().is_empty() {
        return Err(GatewayError::Validation("model_key is required".to_string()));
    }
    if request.messages.is_empty() {
        return Err(GatewayError::Validation(
            "messages must contain at least one message".to_string(),
        ));
    }
    if request.messages.iter().any(|m| m.content.is_empty()) {
        return Err(GatewayError::Validation(
            "message content is required".to_string(),
        ));
    }
    // Also rejects NaN.
    if !(request.max_cost > 0.0) {
        return Err(GatewayError::Validation(
            "max_cost must be a positive number".to_string(),
        ));
    }
    Ok(())
}
