use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use common::{
    error::AppError,
    storage::{db::SurrealDbClient, types::section::Section},
    utils::embedding::{embed_with_policy, EmbeddingProvider},
};

use crate::with_deadline;

pub const DEFAULT_K: usize = 8;

/// HNSW search effort; also the floor for the candidate pool so that
/// post-filtering still has material to work with at small k.
const KNN_EF: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub section: Option<Section>,
    pub alias: Option<String>,
    pub ingredient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub k: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
            k: DEFAULT_K,
        }
    }
}

/// One ranked hit; carries the full denormalized payload so callers never
/// need a second lookup.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub score: f32,
    pub item_seq: String,
    pub section: Section,
    pub part_idx: u32,
    pub item_name: String,
    pub entp_name: String,
    pub aliases: Vec<String>,
    pub ingredients: Vec<String>,
    pub is_otc: bool,
    pub update_de: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
}

#[derive(Deserialize)]
struct SearchHit {
    item_seq: String,
    section: Section,
    part_idx: u32,
    #[serde(default)]
    item_name: String,
    #[serde(default)]
    entp_name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    is_otc: bool,
    #[serde(default)]
    update_de: String,
    distance: f32,
}

/// Embed the query and run a filtered top-k nearest-neighbour search over
/// the point collection. Embedding failures and timeouts propagate as-is;
/// an empty result set is a valid answer, not an error.
#[instrument(skip_all, fields(k = request.k))]
pub async fn search(
    db: &SurrealDbClient,
    embedder: &EmbeddingProvider,
    request: &SearchRequest,
    deadline: Duration,
) -> Result<SearchResponse, AppError> {
    validate_k(request.k)?;

    let query_embedding = embed_with_policy(embedder, &request.query, deadline).await?;

    search_with_embedding(db, &query_embedding, request, deadline).await
}

/// Search with a precomputed query vector. Split out so callers (and tests)
/// can supply their own embedding.
pub async fn search_with_embedding(
    db: &SurrealDbClient,
    query_embedding: &[f32],
    request: &SearchRequest,
    deadline: Duration,
) -> Result<SearchResponse, AppError> {
    validate_k(request.k)?;

    // Overfetch from the index so conjunctive filters applied on top of the
    // nearest-neighbour candidates can still fill k results.
    let fetch_k = (request.k * 4).max(KNN_EF);
    let mut conditions = Vec::new();
    if request.filters.section.is_some() {
        conditions.push("section = $section".to_string());
    }
    if request.filters.alias.is_some() {
        conditions.push("aliases CONTAINS $alias".to_string());
    }
    if request.filters.ingredient.is_some() {
        conditions.push("ingredients CONTAINS $ingredient".to_string());
    }
    conditions.push(format!(
        "embedding <|{fetch_k},{KNN_EF}|> {query_embedding:?}"
    ));

    let query = format!(
        "SELECT item_seq, section, part_idx, item_name, entp_name, aliases, ingredients, \
         is_otc, update_de, vector::distance::knn() AS distance \
         FROM chunk_embedding WHERE {} ORDER BY distance LIMIT {}",
        conditions.join(" AND "),
        request.k
    );

    let filters = request.filters.clone();
    let hits: Vec<SearchHit> = with_deadline(deadline, "vector search", async move {
        let mut prepared = db.client.query(query);
        if let Some(section) = filters.section {
            prepared = prepared.bind(("section", section));
        }
        if let Some(alias) = filters.alias {
            prepared = prepared.bind(("alias", alias));
        }
        if let Some(ingredient) = filters.ingredient {
            prepared = prepared.bind(("ingredient", ingredient));
        }
        let mut response = prepared.await?;
        Ok(response.take(0)?)
    })
    .await?;

    debug!(hits = hits.len(), "vector search completed");

    let results: Vec<SearchResult> = hits
        .into_iter()
        .map(|hit| SearchResult {
            score: 1.0 - hit.distance,
            item_seq: hit.item_seq,
            section: hit.section,
            part_idx: hit.part_idx,
            item_name: hit.item_name,
            entp_name: hit.entp_name,
            aliases: hit.aliases,
            ingredients: hit.ingredients,
            is_otc: hit.is_otc,
            update_de: hit.update_de,
        })
        .collect();

    let total = results.len();
    Ok(SearchResponse { results, total })
}

fn validate_k(k: usize) -> Result<(), AppError> {
    if k == 0 {
        return Err(AppError::Validation(
            "k must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
