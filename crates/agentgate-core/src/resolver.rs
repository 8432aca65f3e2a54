use std::error::Error;
use std::fmt;

use agentgate_protocol::ProviderCredentials;
use async_trait::async_trait;

/// Failure to look up credentials for a model key. The message is logged,
/// not surfaced; callers see a generic not-found condition.
#[derive(Debug)]
pub struct ResolveError(pub String);

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ResolveError {}

/// Resolves a model key to everything needed for one upstream call:
/// endpoint URL, API key, remaining token balance and provider config.
/// One read-only round trip per call; no caching contract.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, model_key: &str) -> Result<ProviderCredentials, ResolveError>;
}
