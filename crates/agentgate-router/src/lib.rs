//! Inbound HTTP surface. Every reply uses the `{error, msg, ...}`
//! envelope; gateway errors carry their own status mapping.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;

use agentgate_core::ConsumeEngine;
use agentgate_protocol::{ConsumeRequest, NewModel};
use agentgate_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConsumeEngine>,
    pub storage: Arc<dyn Storage>,
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ai/consume", post(consume_model))
        .route("/v1/models", get(list_models).post(create_model))
        .with_state(state)
}

fn failure(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(json!({"error": true, "msg": msg.into()}))).into_response()
}

async fn consume_model(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ConsumeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match state.engine.consume(&request).await {
        Ok(response) => (
            StatusCode::OK,
            Json(json!({"error": false, "msg": null, "response": response})),
        )
            .into_response(),
        Err(err) => failure(err.status(), err.to_string()),
    }
}

async fn list_models(State(state): State<AppState>) -> Response {
    match state.storage.list_models().await {
        Ok(models) => (
            StatusCode::OK,
            Json(json!({"error": false, "msg": null, "models": models})),
        )
            .into_response(),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn create_model(State(state): State<AppState>, body: Bytes) -> Response {
    let input: NewModel = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
    };
    if let Err(msg) = validate_new_model(&input) {
        return failure(StatusCode::BAD_REQUEST, msg);
    }

    match state.storage.create_model(&input).await {
        Ok(model) => (
            StatusCode::OK,
            Json(json!({"error": false, "msg": "model created successfully", "model": model})),
        )
            .into_response(),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn validate_new_model(input: &NewModel) -> Result<(), String> {
    if input.model_key.trim().is_empty() {
        return Err("model_key is required".to_string());
    }
    if input.name.trim().is_empty() {
        return Err("name is required".to_string());
    }
    if input.description.trim().is_empty() {
        return Err("description is required".to_string());
    }
    if input.request_url.trim().is_empty() {
        return Err("request_url is required".to_string());
    }
    if input.provider_id <= 0 {
        return Err("provider_id is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_model() -> NewModel {
        NewModel {
            model_key: "gpt-4".to_string(),
            name: "GPT-4".to_string(),
            description: "OpenAI GPT-4".to_string(),
            provider_id: 1,
            request_url: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }

    #[test]
    fn complete_input_passes() {
        assert!(validate_new_model(&new_model()).is_ok());
    }

    #[test]
    fn missing_fields_rejected() {
        let mut input = new_model();
        input.model_key = String::new();
        assert!(validate_new_model(&input).is_err());

        let mut input = new_model();
        input.request_url = "  ".to_string();
        assert!(validate_new_model(&input).is_err());

        let mut input = new_model();
        input.provider_id = 0;
        assert!(validate_new_model(&input).is_err());
    }
}
