use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::{error::AppError, storage::db::SurrealDbClient};

const VECTOR_TABLE: &str = "chunk_embedding";
const VECTOR_INDEX: &str = "idx_chunk_embedding_hnsw";
const HNSW_OPTIONS: &str = "DIST COSINE TYPE F32 EFC 100 M 8";

/// Make sure the HNSW index over `chunk_embedding` exists with the requested
/// dimension and cosine distance. Idempotent; a dimension change overwrites
/// the index definition in place. When `recreate` is set the whole point
/// table is dropped first; that flag is for operator-driven full rebuilds
/// and must never be the default.
pub async fn ensure_vector_index(
    db: &SurrealDbClient,
    embedding_dimension: usize,
    recreate: bool,
) -> Result<(), AppError> {
    ensure_vector_index_inner(db, embedding_dimension, recreate)
        .await
        .map_err(|err| AppError::Index(format!("{err:#}")))
}

async fn ensure_vector_index_inner(
    db: &SurrealDbClient,
    dimension: usize,
    recreate: bool,
) -> Result<()> {
    if recreate {
        warn!(
            table = VECTOR_TABLE,
            "recreate_index set; dropping vector table and index"
        );
        db.client
            .query(format!(
                "REMOVE INDEX IF EXISTS {VECTOR_INDEX} ON TABLE {VECTOR_TABLE};
                 REMOVE TABLE IF EXISTS {VECTOR_TABLE};"
            ))
            .await
            .context("dropping vector table for recreate")?
            .check()
            .context("recreate cleanup failed")?;
    }

    // Surreal creates tables lazily; define it up front so the INFO probe
    // below has something to inspect on a fresh database.
    db.client
        .query(format!(
            "DEFINE TABLE IF NOT EXISTS {VECTOR_TABLE} SCHEMALESS;
             DEFINE INDEX IF NOT EXISTS idx_chunk_embedding_item ON TABLE {VECTOR_TABLE} FIELDS item_seq;"
        ))
        .await
        .context("defining vector table")?
        .check()
        .context("vector table definition failed")?;

    let definition = match current_index_dimension(db).await? {
        Some(existing) if existing == dimension as u64 => {
            format!(
                "DEFINE INDEX IF NOT EXISTS {VECTOR_INDEX} ON TABLE {VECTOR_TABLE} \
                 FIELDS embedding HNSW DIMENSION {dimension} {HNSW_OPTIONS};"
            )
        }
        Some(existing) => {
            info!(
                index = VECTOR_INDEX,
                existing_dimension = existing,
                target_dimension = dimension,
                "Overwriting HNSW index to match new embedding dimension"
            );
            format!(
                "DEFINE INDEX OVERWRITE {VECTOR_INDEX} ON TABLE {VECTOR_TABLE} \
                 FIELDS embedding HNSW DIMENSION {dimension} {HNSW_OPTIONS};"
            )
        }
        None => format!(
            "DEFINE INDEX IF NOT EXISTS {VECTOR_INDEX} ON TABLE {VECTOR_TABLE} \
             FIELDS embedding HNSW DIMENSION {dimension} {HNSW_OPTIONS};"
        ),
    };

    db.client
        .query(definition)
        .await
        .with_context(|| format!("creating index {VECTOR_INDEX} on {VECTOR_TABLE}"))?
        .check()
        .with_context(|| format!("index definition failed for {VECTOR_INDEX}"))?;

    Ok(())
}

/// Dimension of the currently defined HNSW index, if any. Readiness probes
/// use this to tell "store up, index missing" apart from "all good".
pub async fn vector_index_dimension(db: &SurrealDbClient) -> Result<Option<u64>, AppError> {
    current_index_dimension(db)
        .await
        .map_err(|err| AppError::Index(format!("{err:#}")))
}

/// Reads the currently defined HNSW dimension, if the index exists at all.
async fn current_index_dimension(db: &SurrealDbClient) -> Result<Option<u64>> {
    let mut response = db
        .client
        .query(format!("INFO FOR TABLE {VECTOR_TABLE};"))
        .await
        .context("fetching vector table info")?;

    let info: surrealdb::Value = response
        .take(0)
        .context("failed to take table info response")?;

    let info_json: Value =
        serde_json::to_value(info).context("serializing table info to JSON for parsing")?;

    let Some(definition) = info_json
        .get("Object")
        .and_then(|o| o.get("indexes"))
        .and_then(|i| i.get("Object"))
        .and_then(|i| i.get(VECTOR_INDEX))
        .and_then(|details| details.get("Strand"))
        .and_then(|v| v.as_str())
    else {
        return Ok(None);
    };

    Ok(extract_dimension(definition))
}

fn extract_dimension(definition: &str) -> Option<u64> {
    definition
        .split("DIMENSION")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|token| token.trim_end_matches(';').parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn memory_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        SurrealDbClient::memory("indexes_ns", &database)
            .await
            .expect("in-memory db")
    }

    #[test]
    fn extract_dimension_parses_value() {
        let definition = "DEFINE INDEX idx_chunk_embedding_hnsw ON TABLE chunk_embedding FIELDS embedding HNSW DIMENSION 1536 DIST COSINE TYPE F32 EFC 100 M 8;";
        assert_eq!(extract_dimension(definition), Some(1536));
    }

    #[tokio::test]
    async fn ensure_vector_index_is_idempotent() {
        let db = memory_db().await;

        ensure_vector_index(&db, 1536, false)
            .await
            .expect("initial index creation");
        ensure_vector_index(&db, 1536, false)
            .await
            .expect("second index creation");

        assert_eq!(
            current_index_dimension(&db).await.expect("info"),
            Some(1536)
        );
    }

    #[tokio::test]
    async fn ensure_vector_index_overwrites_on_dimension_change() {
        let db = memory_db().await;

        ensure_vector_index(&db, 1536, false)
            .await
            .expect("initial index creation");
        ensure_vector_index(&db, 128, false)
            .await
            .expect("overwritten index creation");

        assert_eq!(current_index_dimension(&db).await.expect("info"), Some(128));
    }

    #[tokio::test]
    async fn recreate_drops_existing_points() {
        let db = memory_db().await;

        ensure_vector_index(&db, 4, false).await.expect("bootstrap");
        db.client
            .query("CREATE chunk_embedding:probe SET embedding = [0.1, 0.2, 0.3, 0.4], item_seq = '1';")
            .await
            .expect("insert probe point")
            .check()
            .expect("probe insert failed");

        ensure_vector_index(&db, 4, true).await.expect("recreate");

        let mut res = db
            .client
            .query("SELECT count() AS count FROM chunk_embedding GROUP ALL;")
            .await
            .expect("count query");
        let rows: Vec<serde_json::Value> = res.take(0).expect("take count");
        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(|c| c.as_u64())
            .unwrap_or(0);
        assert_eq!(count, 0, "recreate must drop previously stored points");
    }
}
