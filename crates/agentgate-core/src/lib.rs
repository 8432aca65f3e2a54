pub mod budget;
pub mod engine;
pub mod error;
pub mod headers;
pub mod resolver;
pub mod upstream;

pub use budget::check_budget;
pub use engine::ConsumeEngine;
pub use error::{GatewayError, GatewayResult};
pub use headers::{header_get, header_set, set_provider_headers, Headers};
pub use resolver::{CredentialResolver, ResolveError};
pub use upstream::{
    TransportErrorKind, TransportFailure, UpstreamClient, UpstreamClientConfig, UpstreamResponse,
    WreqUpstreamClient,
};
