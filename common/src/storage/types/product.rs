use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(Product, "product", {
    entp_name: Option<String>,
    item_name: Option<String>,
    item_image: Option<String>,
    bizrno: Option<String>,
    open_de: Option<String>,
    update_de: Option<String>,
    /// Verbatim source payload, kept for auditability.
    raw_json: serde_json::Value
});

impl Product {
    /// The record key is the item identifier, which makes repeated ingest of
    /// the same product a full-replace upsert rather than a duplicate.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        item_seq: String,
        entp_name: Option<String>,
        item_name: Option<String>,
        item_image: Option<String>,
        bizrno: Option<String>,
        open_de: Option<String>,
        update_de: Option<String>,
        raw_json: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: item_seq,
            created_at: now,
            updated_at: now,
            entp_name,
            item_name,
            item_image,
            bizrno,
            open_de: open_de.map(truncate_date).filter(|d| !d.is_empty()),
            update_de: update_de.map(truncate_date).filter(|d| !d.is_empty()),
            raw_json,
        }
    }

    pub async fn upsert(self, db: &SurrealDbClient) -> Result<(), AppError> {
        db.upsert_item(self).await?;
        Ok(())
    }
}

/// Source dates arrive as "YYYY-MM-DD hh:mm:ss" strings; only the date part
/// is kept.
fn truncate_date(raw: String) -> String {
    raw.chars().take(10).collect()
}
