use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(ProductIngredient, "product_ingredient", {
    item_seq: String,
    ingredient: String
});

impl ProductIngredient {
    /// Derived data: re-extracted from the display name on every ingest, so
    /// the key is the (item, ingredient) pair and re-insertion is a no-op.
    pub fn new(item_seq: &str, ingredient: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{item_seq}:{ingredient}"),
            created_at: now,
            updated_at: now,
            item_seq: item_seq.to_string(),
            ingredient: ingredient.to_string(),
        }
    }

    pub async fn upsert(self, db: &SurrealDbClient) -> Result<(), AppError> {
        db.upsert_item(self).await?;
        Ok(())
    }

    pub async fn list_for_item(
        item_seq: &str,
        db: &SurrealDbClient,
    ) -> Result<Vec<String>, AppError> {
        #[derive(Deserialize)]
        struct IngredientRow {
            ingredient: String,
        }

        let mut response = db
            .client
            .query(format!(
                "SELECT ingredient FROM {} WHERE item_seq = $item_seq ORDER BY ingredient",
                Self::table_name()
            ))
            .bind(("item_seq", item_seq.to_string()))
            .await?;

        let rows: Vec<IngredientRow> = response.take(0)?;
        Ok(rows.into_iter().map(|row| row.ingredient).collect())
    }
}
