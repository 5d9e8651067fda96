use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use common::storage::types::section::Section;
use retrieval_pipeline::catalog::{list_aliases, list_ingredients};

use crate::{api_state::ApiState, error::ApiError};

/// All aliases present in the index; feeds the alias filter picker.
pub async fn get_aliases(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let aliases = list_aliases(&state.db, state.upstream_deadline()).await?;
    Ok(Json(json!({ "aliases": aliases })))
}

/// All ingredients present in the index; feeds the ingredient filter picker.
pub async fn get_ingredients(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredients = list_ingredients(&state.db, state.upstream_deadline()).await?;
    Ok(Json(json!({ "ingredients": ingredients })))
}

/// The fixed section enumeration, exposed read-only.
pub async fn get_sections() -> impl IntoResponse {
    let sections: Vec<&'static str> = Section::ALL.iter().map(|s| s.as_str()).collect();
    Json(json!({ "sections": sections }))
}
