use api_router::{api_routes_v1, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Connect, bootstrap schema/indexes and build the embedding client
    let state = ApiState::new(&config).await?;
    info!(
        embedding_backend = state.embedder.backend_label(),
        embedding_dimension = state.embedder.dimension(),
        "Embedding provider initialized"
    );

    let app = Router::new()
        .nest("/api/v1", api_routes_v1(&state))
        .with_state(state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::storage::db::SurrealDbClient;
    use common::storage::indexes::ensure_vector_index;
    use common::utils::config::AppConfig;
    use common::utils::embedding::{EmbeddingBackend, EmbeddingProvider};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn smoke_test_config(namespace: &str, database: &str) -> AppConfig {
        AppConfig {
            openai_api_key: "test-key".into(),
            openai_base_url: "https://example.invalid/v1".into(),
            surrealdb_address: "mem://".into(),
            surrealdb_username: "root".into(),
            surrealdb_password: "root".into(),
            surrealdb_namespace: namespace.into(),
            surrealdb_database: database.into(),
            embedding_model: "text-embedding-3-small".into(),
            embedding_dimensions: 8,
            embedding_backend: EmbeddingBackend::Hashed,
            recreate_index: false,
            api_read_key: "read-key".into(),
            http_port: 0,
            data_file: "./all_drug_data.json".into(),
            upstream_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn smoke_startup_with_in_memory_surrealdb() {
        let namespace = "smoke_ns";
        let database = format!("smoke_db_{}", Uuid::new_v4());
        let config = smoke_test_config(namespace, &database);

        let db = Arc::new(
            SurrealDbClient::memory(namespace, &database)
                .await
                .expect("failed to start in-memory surrealdb"),
        );
        db.ensure_initialized().await.expect("schema bootstrap");
        ensure_vector_index(&db, 8, false)
            .await
            .expect("vector index bootstrap");

        let state = ApiState {
            db,
            embedder: Arc::new(EmbeddingProvider::new_hashed(8)),
            config,
        };

        let app = Router::new()
            .nest("/api/v1", api_routes_v1(&state))
            .with_state(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);
    }
}
