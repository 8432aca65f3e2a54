use async_trait::async_trait;

use agentgate_protocol::{Model, NewModel, ProviderCredentials};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("db error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("serde json error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("no API key on file for provider: {0}")]
    MissingApiKey(String),
}

/// Narrow persistence surface of the gateway: model registry writes/reads
/// plus the single read-only credential lookup the consume pipeline makes.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Entity-first schema sync. Runs once at bootstrap.
    async fn sync(&self) -> StorageResult<()>;

    async fn create_model(&self, input: &NewModel) -> StorageResult<Model>;
    async fn list_models(&self) -> StorageResult<Vec<Model>>;

    /// Resolve endpoint URL, API key, remaining balance and provider
    /// config for a model key in one lookup.
    async fn model_credentials(&self, model_key: &str) -> StorageResult<ProviderCredentials>;
}
