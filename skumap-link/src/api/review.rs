//! Duplicate-link review endpoint

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::review::{duplicate_links, DuplicateLink};
use crate::AppState;

/// GET /api/review/duplicates
pub async fn get_duplicates(State(state): State<AppState>) -> ApiResult<Json<Vec<DuplicateLink>>> {
    Ok(Json(duplicate_links(&state.store).await?))
}
