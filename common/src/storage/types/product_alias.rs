use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(ProductAlias, "product_alias", {
    alias: String,
    item_seq: String
});

impl ProductAlias {
    /// Record key derived from the (alias, item) pair so inserting the same
    /// association twice is a no-op.
    pub fn new(alias: &str, item_seq: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{alias}:{item_seq}"),
            created_at: now,
            updated_at: now,
            alias: alias.to_string(),
            item_seq: item_seq.to_string(),
        }
    }

    pub async fn upsert(self, db: &SurrealDbClient) -> Result<(), AppError> {
        db.upsert_item(self).await?;
        Ok(())
    }

    /// All aliases observed so far for one item, sorted for determinism.
    /// This is the accumulated set the embedding payload carries.
    pub async fn list_for_item(
        item_seq: &str,
        db: &SurrealDbClient,
    ) -> Result<Vec<String>, AppError> {
        #[derive(Deserialize)]
        struct AliasRow {
            alias: String,
        }

        let mut response = db
            .client
            .query(format!(
                "SELECT alias FROM {} WHERE item_seq = $item_seq ORDER BY alias",
                Self::table_name()
            ))
            .bind(("item_seq", item_seq.to_string()))
            .await?;

        let rows: Vec<AliasRow> = response.take(0)?;
        Ok(rows.into_iter().map(|row| row.alias).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn memory_db() -> SurrealDbClient {
        let database = Uuid::new_v4().to_string();
        SurrealDbClient::memory("alias_ns", &database)
            .await
            .expect("in-memory db")
    }

    #[tokio::test]
    async fn duplicate_insertion_is_a_noop() {
        let db = memory_db().await;

        ProductAlias::new("타이레놀", "195900043")
            .upsert(&db)
            .await
            .expect("first insert");
        ProductAlias::new("타이레놀", "195900043")
            .upsert(&db)
            .await
            .expect("second insert");

        let aliases = ProductAlias::list_for_item("195900043", &db)
            .await
            .expect("list");
        assert_eq!(aliases, vec!["타이레놀".to_string()]);
    }

    #[tokio::test]
    async fn aliases_accumulate_per_item() {
        let db = memory_db().await;

        ProductAlias::new("타이레놀", "195900043")
            .upsert(&db)
            .await
            .expect("insert");
        ProductAlias::new("타이레놀정", "195900043")
            .upsert(&db)
            .await
            .expect("insert");
        ProductAlias::new("게보린", "another-item")
            .upsert(&db)
            .await
            .expect("insert");

        let aliases = ProductAlias::list_for_item("195900043", &db)
            .await
            .expect("list");
        assert_eq!(
            aliases,
            vec!["타이레놀".to_string(), "타이레놀정".to_string()]
        );
    }
}
