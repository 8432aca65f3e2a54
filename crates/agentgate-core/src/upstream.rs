use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use wreq::{Client, Proxy};

use crate::headers::Headers;

/// Raw upstream reply. Non-2xx statuses are returned here, not mapped to
/// errors; classification is the orchestrator's job.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Dns,
    Tls,
    Other,
}

/// Network-level failure before any upstream status was received.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TransportFailure {}

/// Outbound transport collaborator. Single attempt per call; the
/// configured request timeout bounds the whole exchange, and dropping the
/// returned future aborts the in-flight request.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn send(
        &self,
        url: &str,
        headers: &Headers,
        body: Bytes,
    ) -> Result<UpstreamResponse, TransportFailure>;
}

#[derive(Debug, Clone)]
pub struct UpstreamClientConfig {
    /// Optional outbound proxy for upstream egress.
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// wreq-backed client, shared across calls for connection pooling.
#[derive(Clone)]
pub struct WreqUpstreamClient {
    client: Client,
}

impl WreqUpstreamClient {
    pub fn new(config: UpstreamClientConfig) -> Result<Self, wreq::Error> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        if let Some(proxy) = normalize_proxy(config.proxy) {
            builder = builder.proxy(Proxy::all(&proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl UpstreamClient for WreqUpstreamClient {
    async fn send(
        &self,
        url: &str,
        headers: &Headers,
        body: Bytes,
    ) -> Result<UpstreamResponse, TransportFailure> {
        let mut builder = self.client.post(url);
        for (k, v) in headers {
            builder = builder.header(k, v);
        }

        let resp = builder.body(body).send().await.map_err(map_wreq_error)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(map_wreq_error)?;

        Ok(UpstreamResponse { status, body })
    }
}

fn normalize_proxy(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn map_wreq_error(err: wreq::Error) -> TransportFailure {
    TransportFailure {
        kind: classify_wreq_error(&err),
        message: err.to_string(),
    }
}

fn classify_wreq_error(err: &wreq::Error) -> TransportErrorKind {
    let message = err.to_string().to_ascii_lowercase();
    if err.is_timeout() {
        return TransportErrorKind::Timeout;
    }
    if err.is_connect() {
        if message.contains("dns") || message.contains("resolve") {
            return TransportErrorKind::Dns;
        }
        if message.contains("tls") || message.contains("ssl") {
            return TransportErrorKind::Tls;
        }
        return TransportErrorKind::Connect;
    }
    if message.contains("tls") || message.contains("ssl") {
        return TransportErrorKind::Tls;
    }
    TransportErrorKind::Other
}
