use std::sync::Arc;

use common::{
    storage::{db::SurrealDbClient, indexes::ensure_vector_index},
    utils::{config::get_config, embedding::EmbeddingProvider},
};
use ingestion_pipeline::{IngestionPipeline, LabelBatch};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Batch-loads a drug-label JSON dump (alias -> records) into the product
/// tables and the vector index. Per-record failures are reported and do not
/// fail the run; re-running is always safe.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

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

    let embedder = Arc::new(EmbeddingProvider::from_config(&config, None)?);
    ensure_vector_index(&db, embedder.dimension(), config.recreate_index).await?;
    info!(
        embedding_backend = embedder.backend_label(),
        embedding_dimension = embedder.dimension(),
        "Embedding provider initialized"
    );

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.data_file.clone());
    info!(path = %path, "Loading label dump");
    let raw = tokio::fs::read_to_string(&path).await?;
    let batch: LabelBatch = serde_json::from_str(&raw)?;
    info!(aliases = batch.len(), "Label dump loaded");

    let pipeline = IngestionPipeline::new(Arc::clone(&db), embedder);
    let report = pipeline.ingest_batch(&batch).await;

    for failure in &report.errors {
        warn!(
            item_seq = %failure.item_seq,
            reason = %failure.reason,
            "record failed during ingest"
        );
    }
    info!(
        processed = report.processed,
        skipped = report.skipped,
        failed = report.errors.len(),
        "Ingest finished"
    );

    Ok(())
}
