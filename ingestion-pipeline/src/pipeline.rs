use std::{sync::Arc, time::Duration};

use futures::{stream, StreamExt};
use tracing::{info, instrument, warn};

use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{
            chunk_embedding::{ChunkEmbedding, ChunkPayload},
            label_chunk::LabelChunk,
            product::Product,
            product_alias::ProductAlias,
            product_ingredient::ProductIngredient,
            section::Section,
        },
    },
    utils::embedding::{embed_with_policy, EmbeddingProvider},
};

use crate::{
    chunker::{split_text, DEFAULT_MAX_CHUNK_CHARS},
    extract::extract_ingredients,
    source::{DrugLabelRecord, LabelBatch},
};

#[derive(Debug, Clone)]
pub struct IngestionTuning {
    pub max_chunk_chars: usize,
    /// Embedding/point upserts per section run concurrently up to this bound;
    /// records themselves are processed sequentially so writes to one item
    /// never interleave.
    pub embed_concurrency: usize,
    pub upstream_timeout: Duration,
}

impl Default for IngestionTuning {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            embed_concurrency: 4,
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// Batch outcome: how many records went through, how many lacked an item
/// identifier, and which ones failed with what reason. A failing record
/// never aborts the batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: Vec<RecordFailure>,
}

#[derive(Debug)]
pub struct RecordFailure {
    pub item_seq: String,
    pub reason: String,
}

enum RecordOutcome {
    Processed,
    Skipped,
}

/// Turns raw label records into product/alias/ingredient rows plus one
/// chunk and one embedding point per mapped section part. All writes key on
/// natural identifiers, so re-running a batch is a safe repair mechanism.
pub struct IngestionPipeline {
    db: Arc<SurrealDbClient>,
    embedder: Arc<EmbeddingProvider>,
    tuning: IngestionTuning,
}

impl IngestionPipeline {
    pub fn new(db: Arc<SurrealDbClient>, embedder: Arc<EmbeddingProvider>) -> Self {
        Self::with_tuning(db, embedder, IngestionTuning::default())
    }

    pub fn with_tuning(
        db: Arc<SurrealDbClient>,
        embedder: Arc<EmbeddingProvider>,
        tuning: IngestionTuning,
    ) -> Self {
        Self {
            db,
            embedder,
            tuning,
        }
    }

    #[instrument(skip_all, fields(aliases = batch.len()))]
    pub async fn ingest_batch(&self, batch: &LabelBatch) -> IngestReport {
        let mut report = IngestReport::default();

        for (alias, records) in batch {
            info!(alias = %alias, records = records.len(), "ingesting alias group");
            for record in records {
                match self.process_record(alias, record).await {
                    Ok(RecordOutcome::Processed) => report.processed += 1,
                    Ok(RecordOutcome::Skipped) => report.skipped += 1,
                    Err(err) => {
                        let item_seq = record.item_seq.clone().unwrap_or_default();
                        warn!(
                            alias = %alias,
                            item_seq = %item_seq,
                            error = %err,
                            "record ingest failed; continuing with batch"
                        );
                        report.errors.push(RecordFailure {
                            item_seq,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.errors.len(),
            "ingest batch finished"
        );

        report
    }

    async fn process_record(
        &self,
        alias: &str,
        record: &DrugLabelRecord,
    ) -> Result<RecordOutcome, AppError> {
        let Some(item_seq) = record.item_seq.as_deref().filter(|seq| !seq.is_empty()) else {
            warn!(alias = %alias, "source record has no itemSeq; skipping");
            return Ok(RecordOutcome::Skipped);
        };

        let raw_json = serde_json::to_value(record)?;
        Product::new(
            item_seq.to_string(),
            record.entp_name.clone(),
            record.item_name.clone(),
            record.item_image.clone(),
            record.bizrno.clone(),
            record.open_de.clone(),
            record.update_de.clone(),
            raw_json,
        )
        .upsert(&self.db)
        .await?;

        ProductAlias::new(alias, item_seq).upsert(&self.db).await?;

        for ingredient in extract_ingredients(record.item_name.as_deref().unwrap_or_default()) {
            ProductIngredient::new(item_seq, &ingredient)
                .upsert(&self.db)
                .await?;
        }

        // Read the sets back rather than using this pass's values alone, so
        // an item reachable under several aliases carries all of them on
        // every point it owns.
        let aliases = ProductAlias::list_for_item(item_seq, &self.db).await?;
        let ingredients = ProductIngredient::list_for_item(item_seq, &self.db).await?;

        for (section, text) in record.sections() {
            self.index_section(record, item_seq, section, text, &aliases, &ingredients)
                .await?;
        }

        Ok(RecordOutcome::Processed)
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn index_section(
        &self,
        record: &DrugLabelRecord,
        item_seq: &str,
        section: Section,
        text: &str,
        aliases: &[String],
        ingredients: &[String],
    ) -> Result<(), AppError> {
        let parts = split_text(text, self.tuning.max_chunk_chars);
        let keep_parts = parts.len() as u32;

        for (idx, part) in parts.iter().enumerate() {
            LabelChunk::new(item_seq, section, idx as u32, part.clone())
                .upsert(&self.db)
                .await?;
        }
        LabelChunk::delete_stale_parts(&self.db, item_seq, section, keep_parts).await?;

        let update_de: String = record
            .update_de
            .as_deref()
            .map(|raw| raw.chars().take(10).collect())
            .unwrap_or_default();

        let results: Vec<Result<(), AppError>> = stream::iter(parts.into_iter().enumerate())
            .map(|(idx, part)| {
                let payload = ChunkPayload {
                    item_seq: item_seq.to_string(),
                    section,
                    part_idx: idx as u32,
                    entp_name: record.entp_name.clone().unwrap_or_default(),
                    item_name: record.item_name.clone().unwrap_or_default(),
                    aliases: aliases.to_vec(),
                    ingredients: ingredients.to_vec(),
                    // The dataset covers the OTC label service only.
                    is_otc: true,
                    update_de: update_de.clone(),
                    text: part.clone(),
                };
                async move {
                    let embedding =
                        embed_with_policy(&self.embedder, &part, self.tuning.upstream_timeout)
                            .await?;
                    ChunkEmbedding::new(payload, embedding).upsert(&self.db).await
                }
            })
            .buffer_unordered(self.tuning.embed_concurrency.max(1))
            .collect()
            .await;
        for result in results {
            result?;
        }

        ChunkEmbedding::delete_stale_parts(&self.db, item_seq, section, keep_parts).await?;

        Ok(())
    }
}
