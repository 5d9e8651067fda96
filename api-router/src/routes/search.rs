use std::str::FromStr;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use common::storage::types::section::Section;
use retrieval_pipeline::search::{search, SearchFilters, SearchRequest};

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub ingredient: Option<String>,
    #[serde(default = "default_k")]
    pub k: i64,
}

fn default_k() -> i64 {
    retrieval_pipeline::DEFAULT_K as i64
}

/// Semantic search over indexed label chunks, optionally narrowed by
/// section, alias or ingredient. Input problems are rejected here before
/// any upstream call is made.
pub async fn search_medications(
    State(state): State<ApiState>,
    Json(body): Json<SearchBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ApiError::ValidationError("query must not be empty".to_string()));
    }
    if body.k <= 0 {
        return Err(ApiError::ValidationError(
            "k must be a positive integer".to_string(),
        ));
    }

    let section = body
        .section
        .as_deref()
        .map(Section::from_str)
        .transpose()
        .map_err(ApiError::from)?;

    #[allow(clippy::cast_sign_loss)]
    let request = SearchRequest {
        query: body.query,
        filters: SearchFilters {
            section,
            alias: body.alias,
            ingredient: body.ingredient,
        },
        k: body.k as usize,
    };

    let response = search(
        &state.db,
        &state.embedder,
        &request,
        state.upstream_deadline(),
    )
    .await?;

    Ok(Json(response))
}
