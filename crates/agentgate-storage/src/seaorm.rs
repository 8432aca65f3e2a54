use async_trait::async_trait;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Schema,
};
use time::OffsetDateTime;

use agentgate_core::{CredentialResolver, ResolveError};
use agentgate_protocol::{Model, NewModel, ProviderConfig, ProviderCredentials};

use crate::entities;
use crate::storage::{Storage, StorageError, StorageResult};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub async fn connect(dsn: &str) -> StorageResult<Self> {
        let db = Database::connect(dsn).await?;
        // Sqlite needs this for cascade + integrity.
        if db.get_database_backend() == DatabaseBackend::Sqlite {
            db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        }
        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn sync(&self) -> StorageResult<()> {
        Schema::new(self.db.get_database_backend())
            .builder()
            .register(entities::Providers)
            .register(entities::Models)
            .register(entities::ApiKeys)
            .sync(&self.db)
            .await?;
        Ok(())
    }

    async fn create_model(&self, input: &NewModel) -> StorageResult<Model> {
        use entities::models::ActiveModel as ModelActive;

        let now = OffsetDateTime::now_utc();
        let active = ModelActive {
            id: ActiveValue::NotSet,
            model_key: ActiveValue::Set(input.model_key.clone()),
            name: ActiveValue::Set(input.name.clone()),
            description: ActiveValue::Set(input.description.clone()),
            provider_id: ActiveValue::Set(input.provider_id),
            request_url: ActiveValue::Set(input.request_url.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(None),
        };
        let inserted = entities::Models::insert(active).exec(&self.db).await?;

        Ok(Model {
            id: inserted.last_insert_id,
            model_key: input.model_key.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            provider_id: input.provider_id,
            request_url: input.request_url.clone(),
            created_at: now,
            updated_at: None,
        })
    }

    async fn list_models(&self) -> StorageResult<Vec<Model>> {
        use entities::models::Column;

        let rows = entities::Models::find()
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Model {
                id: row.id,
                model_key: row.model_key,
                name: row.name,
                description: row.description,
                provider_id: row.provider_id,
                request_url: row.request_url,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn model_credentials(&self, model_key: &str) -> StorageResult<ProviderCredentials> {
        use entities::api_keys::Column as ApiKeyColumn;
        use entities::models::Column as ModelColumn;

        let model = entities::Models::find()
            .filter(ModelColumn::ModelKey.eq(model_key))
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::ModelNotFound(model_key.to_string()))?;

        let provider = entities::Providers::find_by_id(model.provider_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::ModelNotFound(model_key.to_string()))?;

        let api_key = entities::ApiKeys::find()
            .filter(ApiKeyColumn::ProviderId.eq(provider.id))
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::MissingApiKey(provider.name.clone()))?;

        let config: Option<ProviderConfig> = provider
            .config_json
            .map(serde_json::from_value)
            .transpose()?;

        Ok(ProviderCredentials {
            model_key: model.model_key,
            request_url: model.request_url,
            api_key: api_key.api_key,
            tokens_available: api_key.tokens_available,
            provider_name: provider.name,
            config,
        })
    }
}

#[async_trait]
impl CredentialResolver for SeaOrmStorage {
    async fn resolve(&self, model_key: &str) -> Result<ProviderCredentials, ResolveError> {
        self.model_credentials(model_key)
            .await
            .map_err(|err| ResolveError(err.to_string()))
    }
}
