use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use common::{error::AppError, storage::db::SurrealDbClient};

use crate::with_deadline;

/// Fixed page size for the exhaustive payload scan.
pub const SCROLL_PAGE_SIZE: usize = 100;

/// Every alias present in any indexed payload, deduplicated and sorted.
/// Drives the filter pickers, so it must scan to the end of the collection
/// rather than stopping at an arbitrary cap.
pub async fn list_aliases(
    db: &SurrealDbClient,
    deadline: Duration,
) -> Result<Vec<String>, AppError> {
    collect_distinct(db, "aliases", SCROLL_PAGE_SIZE, deadline).await
}

/// Every ingredient present in any indexed payload, deduplicated and sorted.
pub async fn list_ingredients(
    db: &SurrealDbClient,
    deadline: Duration,
) -> Result<Vec<String>, AppError> {
    collect_distinct(db, "ingredients", SCROLL_PAGE_SIZE, deadline).await
}

#[derive(Deserialize)]
struct ValuesRow {
    #[serde(default)]
    values: Vec<String>,
}

/// Pages through the point collection until a short page signals exhaustion,
/// unioning the requested string-set field.
pub(crate) async fn collect_distinct(
    db: &SurrealDbClient,
    field: &'static str,
    page_size: usize,
    deadline: Duration,
) -> Result<Vec<String>, AppError> {
    let page_size = page_size.max(1);
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut offset = 0usize;

    loop {
        let query = format!(
            "SELECT {field} AS values FROM chunk_embedding LIMIT {page_size} START {offset}"
        );
        let rows: Vec<ValuesRow> = with_deadline(deadline, "catalog scroll", async {
            let mut response = db.client.query(query).await?;
            Ok(response.take(0)?)
        })
        .await?;

        if rows.is_empty() {
            break;
        }

        let page_len = rows.len();
        for row in rows {
            seen.extend(row.values);
        }

        if page_len < page_size {
            break;
        }
        offset += page_size;
    }

    debug!(field, distinct = seen.len(), "catalog scan finished");

    Ok(seen.into_iter().collect())
}
