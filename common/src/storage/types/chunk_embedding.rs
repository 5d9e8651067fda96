use crate::{
    error::AppError,
    storage::db::SurrealDbClient,
    storage::types::{label_chunk::chunk_key, section::Section},
    stored_object,
};

stored_object!(ChunkEmbedding, "chunk_embedding", {
    item_seq: String,
    section: Section,
    part_idx: u32,
    /// Denormalized so search hits are self-contained without a join back
    /// to the product tables.
    entp_name: String,
    item_name: String,
    aliases: Vec<String>,
    ingredients: Vec<String>,
    is_otc: bool,
    update_de: String,
    text: String,
    embedding: Vec<f32>
});

/// Everything the point carries besides the vector itself.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    pub item_seq: String,
    pub section: Section,
    pub part_idx: u32,
    pub entp_name: String,
    pub item_name: String,
    pub aliases: Vec<String>,
    pub ingredients: Vec<String>,
    pub is_otc: bool,
    pub update_de: String,
    pub text: String,
}

impl ChunkEmbedding {
    /// Shares its record key with the owning `label_chunk`, which keeps the
    /// chunk/point mapping 1:1 across re-ingests.
    pub fn new(payload: ChunkPayload, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: chunk_key(payload.item_seq.as_str(), payload.section, payload.part_idx),
            created_at: now,
            updated_at: now,
            item_seq: payload.item_seq,
            section: payload.section,
            part_idx: payload.part_idx,
            entp_name: payload.entp_name,
            item_name: payload.item_name,
            aliases: payload.aliases,
            ingredients: payload.ingredients,
            is_otc: payload.is_otc,
            update_de: payload.update_de,
            text: payload.text,
            embedding,
        }
    }

    pub async fn upsert(self, db: &SurrealDbClient) -> Result<(), AppError> {
        db.upsert_item(self).await?;
        Ok(())
    }

    /// Mirror of `LabelChunk::delete_stale_parts` for the point table.
    pub async fn delete_stale_parts(
        db: &SurrealDbClient,
        item_seq: &str,
        section: Section,
        keep_parts: u32,
    ) -> Result<(), AppError> {
        db.client
            .query(format!(
                "DELETE {} WHERE item_seq = $item_seq AND section = $section AND part_idx >= $keep",
                Self::table_name()
            ))
            .bind(("item_seq", item_seq.to_string()))
            .bind(("section", section))
            .bind(("keep", keep_parts))
            .await?
            .check()?;

        Ok(())
    }
}
