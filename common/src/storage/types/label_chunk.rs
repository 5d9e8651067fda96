use crate::{
    error::AppError, storage::db::SurrealDbClient, storage::types::section::Section, stored_object,
};

stored_object!(LabelChunk, "label_chunk", {
    item_seq: String,
    section: Section,
    part_idx: u32,
    text: String
});

/// Natural key shared by a chunk and its embedding point; the 1:1 mapping
/// between the two tables hangs on both sides deriving the same key.
pub fn chunk_key(item_seq: &str, section: Section, part_idx: u32) -> String {
    format!("{item_seq}-{}-{part_idx}", section.as_str())
}

impl LabelChunk {
    pub fn new(item_seq: &str, section: Section, part_idx: u32, text: String) -> Self {
        let now = Utc::now();
        Self {
            id: chunk_key(item_seq, section, part_idx),
            created_at: now,
            updated_at: now,
            item_seq: item_seq.to_string(),
            section,
            part_idx,
            text,
        }
    }

    pub async fn upsert(self, db: &SurrealDbClient) -> Result<(), AppError> {
        db.upsert_item(self).await?;
        Ok(())
    }

    /// Drops parts at or beyond `keep_parts` for one (item, section), so that
    /// re-ingesting shorter text does not leave orphaned tail chunks behind.
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

    pub async fn list_for_item_section(
        db: &SurrealDbClient,
        item_seq: &str,
        section: Section,
    ) -> Result<Vec<Self>, AppError> {
        let mut response = db
            .client
            .query(format!(
                "SELECT * FROM {} WHERE item_seq = $item_seq AND section = $section ORDER BY part_idx",
                Self::table_name()
            ))
            .bind(("item_seq", item_seq.to_string()))
            .bind(("section", section))
            .await?;

        let rows: Vec<Self> = response.take(0)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn memory_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        SurrealDbClient::memory("chunk_ns", &database)
            .await
            .expect("in-memory db")
    }

    #[tokio::test]
    async fn reingest_updates_in_place() {
        let db = memory_db().await;

        LabelChunk::new("1", Section::Efficacy, 0, "해열 및 진통".to_string())
            .upsert(&db)
            .await
            .expect("first upsert");
        LabelChunk::new("1", Section::Efficacy, 0, "두통 완화".to_string())
            .upsert(&db)
            .await
            .expect("second upsert");

        let chunks = LabelChunk::list_for_item_section(&db, "1", Section::Efficacy)
            .await
            .expect("list");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks.first().map(|c| c.text.as_str()), Some("두통 완화"));
    }

    #[tokio::test]
    async fn delete_stale_parts_trims_the_tail() {
        let db = memory_db().await;

        for idx in 0..3 {
            LabelChunk::new("1", Section::Dosage, idx, format!("part {idx}"))
                .upsert(&db)
                .await
                .expect("upsert");
        }
        LabelChunk::new("1", Section::Efficacy, 0, "other section".to_string())
            .upsert(&db)
            .await
            .expect("upsert");

        LabelChunk::delete_stale_parts(&db, "1", Section::Dosage, 1)
            .await
            .expect("delete stale");

        let dosage = LabelChunk::list_for_item_section(&db, "1", Section::Dosage)
            .await
            .expect("list");
        assert_eq!(dosage.len(), 1);
        assert_eq!(dosage.first().map(|c| c.part_idx), Some(0));

        let efficacy = LabelChunk::list_for_item_section(&db, "1", Section::Efficacy)
            .await
            .expect("list");
        assert_eq!(efficacy.len(), 1, "other sections are untouched");
    }
}
