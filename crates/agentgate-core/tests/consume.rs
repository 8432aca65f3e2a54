use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Map, Value};

use agentgate_core::{
    header_get, ConsumeEngine, CredentialResolver, GatewayError, Headers, ResolveError,
    TransportErrorKind, TransportFailure, UpstreamClient, UpstreamResponse,
};
use agentgate_protocol::{
    AuthType, ChatMessage, ChatRole, ConsumeRequest, MessageTransform, ProviderConfig,
    ProviderCredentials, RequestSchema,
};

struct StubResolver {
    creds: Option<ProviderCredentials>,
}

#[async_trait]
impl CredentialResolver for StubResolver {
    async fn resolve(&self, _model_key: &str) -> Result<ProviderCredentials, ResolveError> {
        self.creds
            .clone()
            .ok_or_else(|| ResolveError("model not found".to_string()))
    }
}

struct StubClient {
    response: Result<UpstreamResponse, TransportFailure>,
    seen: Mutex<Option<(String, Headers, Bytes)>>,
}

impl StubClient {
    fn ok(status: u16, body: &str) -> Self {
        Self {
            response: Ok(UpstreamResponse {
                status,
                body: Bytes::from(body.to_string()),
            }),
            seen: Mutex::new(None),
        }
    }

    fn unreachable() -> Self {
        Self {
            response: Err(TransportFailure {
                kind: TransportErrorKind::Connect,
                message: "connection refused".to_string(),
            }),
            seen: Mutex::new(None),
        }
    }

    fn sent(&self) -> Option<(String, Headers, Bytes)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for StubClient {
    async fn send(
        &self,
        url: &str,
        headers: &Headers,
        body: Bytes,
    ) -> Result<UpstreamResponse, TransportFailure> {
        *self.seen.lock().unwrap() = Some((url.to_string(), headers.clone(), body.clone()));
        self.response.clone()
    }
}

fn engine(resolver: StubResolver, client: Arc<StubClient>) -> ConsumeEngine {
    ConsumeEngine::new(Arc::new(resolver), client)
}

fn creds(config: Option<ProviderConfig>) -> ProviderCredentials {
    ProviderCredentials {
        model_key: "gpt-4".to_string(),
        request_url: "https://api.openai.com/v1/chat/completions".to_string(),
        api_key: "sk-test-key".to_string(),
        tokens_available: 1000,
        provider_name: "openai".to_string(),
        config,
    }
}

fn request() -> ConsumeRequest {
    ConsumeRequest {
        model_key: "gpt-4".to_string(),
        messages: vec![ChatMessage {
            role: ChatRole::User,
            content: "Hello".to_string(),
        }],
        options: Map::new(),
        max_cost: 100.0,
    }
}

fn openai_mapping() -> BTreeMap<String, String> {
    [
        ("id", "id"),
        ("model", "model"),
        ("content", "choices[0].message.content"),
        ("role", "choices[0].message.role"),
        ("finish_reason", "choices[0].finish_reason"),
        ("prompt_tokens", "usage.prompt_tokens"),
        ("completion_tokens", "usage.completion_tokens"),
        ("total_tokens", "usage.total_tokens"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

const OPENAI_BODY: &str = r#"{
    "id": "chatcmpl-123",
    "object": "chat.completion",
    "model": "gpt-4",
    "choices": [
        {"index": 0, "message": {"role": "assistant", "content": "Hi there!"}, "finish_reason": "stop"}
    ],
    "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
}"#;

#[tokio::test]
async fn successful_mapped_call() {
    let config = ProviderConfig {
        response_mapping: openai_mapping(),
        ..ProviderConfig::default()
    };
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(
        StubResolver {
            creds: Some(creds(Some(config))),
        },
        client.clone(),
    );

    let response = engine.consume(&request()).await.unwrap();
    assert_eq!(response.id, "chatcmpl-123");
    assert_eq!(response.content, "Hi there!");
    assert_eq!(response.total_tokens, 30);

    let (url, headers, body) = client.sent().unwrap();
    assert_eq!(url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(
        header_get(&headers, "authorization"),
        Some("Bearer sk-test-key")
    );
    assert_eq!(
        header_get(&headers, "content-type"),
        Some("application/json")
    );
    let sent: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(sent["model"], json!("gpt-4"));
    assert_eq!(sent["messages"][0]["content"], json!("Hello"));
}

#[tokio::test]
async fn fallback_parse_without_config() {
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(
        StubResolver {
            creds: Some(creds(None)),
        },
        client,
    );

    // Unknown fields are ignored; overlapping ones carry over.
    let response = engine.consume(&request()).await.unwrap();
    assert_eq!(response.id, "chatcmpl-123");
    assert_eq!(response.model, "gpt-4");
    assert_eq!(response.content, "");
}

#[tokio::test]
async fn insufficient_budget_skips_dispatch() {
    let mut credentials = creds(None);
    credentials.tokens_available = 100;
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(
        StubResolver {
            creds: Some(credentials),
        },
        client.clone(),
    );

    let mut req = request();
    req.max_cost = 1000.0;
    let err = engine.consume(&req).await.unwrap_err();
    assert!(matches!(err, GatewayError::InsufficientBudget { .. }));
    assert_eq!(err.status().as_u16(), 402);
    assert!(client.sent().is_none(), "no outbound call after gate failure");
}

#[tokio::test]
async fn budget_boundary_is_inclusive() {
    let mut credentials = creds(None);
    credentials.tokens_available = 100;
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(
        StubResolver {
            creds: Some(credentials),
        },
        client,
    );

    let mut req = request();
    req.max_cost = 100.0;
    assert!(engine.consume(&req).await.is_ok());
}

#[tokio::test]
async fn unknown_model_is_not_found() {
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(StubResolver { creds: None }, client);

    let err = engine.consume(&request()).await.unwrap_err();
    assert_eq!(err.status().as_u16(), 404);
    assert_eq!(err.to_string(), "model not found or no API key available");
}

#[tokio::test]
async fn unreachable_provider_is_bad_gateway() {
    let engine = engine(
        StubResolver {
            creds: Some(creds(None)),
        },
        Arc::new(StubClient::unreachable()),
    );

    let err = engine.consume(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.status().as_u16(), 502);
    assert_eq!(err.to_string(), "failed to reach model provider");
}

#[tokio::test]
async fn upstream_error_status_and_body_pass_through() {
    let engine = engine(
        StubResolver {
            creds: Some(creds(None)),
        },
        Arc::new(StubClient::ok(500, "boom")),
    );

    let err = engine.consume(&request()).await.unwrap_err();
    assert_eq!(err.status().as_u16(), 500);
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn unparseable_body_is_internal_error() {
    let engine = engine(
        StubResolver {
            creds: Some(creds(None)),
        },
        Arc::new(StubClient::ok(200, "invalid json")),
    );

    let err = engine.consume(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::ResponseParse(_)));
    assert_eq!(err.status().as_u16(), 500);
    assert_eq!(err.to_string(), "failed to parse provider response");
}

#[tokio::test]
async fn validation_failures_are_client_errors() {
    let engine = engine(
        StubResolver {
            creds: Some(creds(None)),
        },
        Arc::new(StubClient::ok(200, OPENAI_BODY)),
    );

    let mut req = request();
    req.messages.clear();
    let err = engine.consume(&req).await.unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
}

#[tokio::test]
async fn gemini_style_schema_end_to_end() {
    let config = ProviderConfig {
        auth_type: AuthType::ApiKey,
        auth_header: "x-goog-api-key".to_string(),
        request_defaults: Map::new(),
        response_mapping: [
            ("content", "candidates[0].content.parts[0].text"),
            ("finish_reason", "candidates[0].finishReason"),
            ("prompt_tokens", "usageMetadata.promptTokenCount"),
            ("completion_tokens", "usageMetadata.candidatesTokenCount"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        request_schema: Some(RequestSchema {
            model_field: String::new(),
            messages_field: "contents".to_string(),
            message: Some(MessageTransform {
                role_field: String::new(),
                content_path: "parts[].text".to_string(),
                role_map: BTreeMap::from([("assistant".to_string(), "model".to_string())]),
            }),
            options_wrapper: Some("generationConfig".to_string()),
            options_rename: BTreeMap::from([(
                "max_tokens".to_string(),
                "maxOutputTokens".to_string(),
            )]),
            options_omit: BTreeSet::from(["stream".to_string()]),
        }),
        ..ProviderConfig::default()
    };
    let mut credentials = creds(Some(config));
    credentials.request_url =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
            .to_string();

    let body = r#"{
        "candidates": [
            {"content": {"parts": [{"text": "Bonjour"}], "role": "model"}, "finishReason": "STOP"}
        ],
        "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2}
    }"#;
    let client = Arc::new(StubClient::ok(200, body));
    let engine = engine(
        StubResolver {
            creds: Some(credentials),
        },
        client.clone(),
    );

    let mut req = request();
    req.options.insert("max_tokens".to_string(), json!(256));
    req.options.insert("stream".to_string(), json!(true));

    let response = engine.consume(&req).await.unwrap();
    assert_eq!(response.content, "Bonjour");
    assert_eq!(response.finish_reason, "STOP");
    assert_eq!(response.total_tokens, 6);

    let (_, headers, sent_body) = client.sent().unwrap();
    assert_eq!(header_get(&headers, "x-goog-api-key"), Some("sk-test-key"));
    assert_eq!(header_get(&headers, "authorization"), None);

    let sent: Value = serde_json::from_slice(&sent_body).unwrap();
    assert!(sent.get("model").is_none());
    assert_eq!(
        sent["contents"][0],
        json!({"role": "user", "parts": [{"text": "Hello"}]})
    );
    assert_eq!(sent["generationConfig"], json!({"maxOutputTokens": 256}));
    assert!(sent.get("stream").is_none());
}

#[tokio::test]
async fn request_defaults_fill_missing_keys_only() {
    let mut defaults = Map::new();
    defaults.insert("stream".to_string(), json!(false));
    defaults.insert("temperature".to_string(), json!(1.0));
    let config = ProviderConfig {
        request_defaults: defaults,
        ..ProviderConfig::default()
    };
    let client = Arc::new(StubClient::ok(200, OPENAI_BODY));
    let engine = engine(
        StubResolver {
            creds: Some(creds(Some(config))),
        },
        client.clone(),
    );

    let mut req = request();
    req.options.insert("temperature".to_string(), json!(0.2));
    engine.consume(&req).await.unwrap();

    let (_, _, body) = client.sent().unwrap();
    let sent: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(sent["stream"], json!(false));
    assert_eq!(sent["temperature"], json!(0.2));
}
