use std::error::Error;
use std::fmt;

use http::StatusCode;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Terminal error for one consume call. No local recovery or retry.
///
/// Display output is what the caller sees; transport details and raw
/// bodies are logged where the error is raised, never secrets.
#[derive(Debug, Clone)]
pub enum GatewayError {
    Validation(String),
    Resolution(String),
    InsufficientBudget { available: i64, max_cost: f64 },
    Build(String),
    Transport(String),
    Upstream { status: u16, body: String },
    ResponseParse(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Resolution(_) => StatusCode::NOT_FOUND,
            GatewayError::InsufficientBudget { .. } => StatusCode::PAYMENT_REQUIRED,
            GatewayError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            // Provider-side errors pass through with the provider's status.
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::ResponseParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Validation(msg) => write!(f, "{msg}"),
            GatewayError::Resolution(msg) => write!(f, "{msg}"),
            GatewayError::InsufficientBudget { .. } => {
                write!(f, "insufficient tokens available")
            }
            GatewayError::Build(msg) => write!(f, "failed to build provider request: {msg}"),
            GatewayError::Transport(_) => write!(f, "failed to reach model provider"),
            GatewayError::Upstream { body, .. } => {
                write!(f, "model provider error: {body}")
            }
            GatewayError::ResponseParse(_) => write!(f, "failed to parse provider response"),
        }
    }
}

impl Error for GatewayError {}
