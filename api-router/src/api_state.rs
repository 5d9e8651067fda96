use std::{sync::Arc, time::Duration};

use common::{
    storage::{db::SurrealDbClient, indexes::ensure_vector_index},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub embedder: Arc<EmbeddingProvider>,
    pub config: AppConfig,
}

impl ApiState {
    /// Connects to the database, bootstraps schema and vector index, and
    /// builds the embedding client. Everything downstream borrows from this
    /// state instead of constructing clients ad hoc.
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_username,
                &config.surrealdb_password,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        db.ensure_initialized().await?;

        let embedder = Arc::new(EmbeddingProvider::from_config(config, None)?);
        ensure_vector_index(&db, embedder.dimension(), config.recreate_index).await?;

        Ok(Self {
            db,
            embedder,
            config: config.clone(),
        })
    }

    /// Deadline applied to every upstream call made on behalf of a request.
    pub fn upstream_deadline(&self) -> Duration {
        Duration::from_secs(self.config.upstream_timeout_secs)
    }
}
