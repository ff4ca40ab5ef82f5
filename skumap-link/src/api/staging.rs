//! Stage and commit endpoints
//!
//! `POST /api/commit` takes the preview the operator reviewed (as returned by
//! `POST /api/stage` or `GET /api/preview`). Sending the same body again
//! appends the same rows again.

use axum::{extract::State, Json};
use skumap_common::MergedRow;

use crate::error::ApiResult;
use crate::staging::{CommitReceipt, PreviewSnapshot};
use crate::AppState;

/// POST /api/stage
pub async fn stage_buffer(State(state): State<AppState>) -> ApiResult<Json<PreviewSnapshot>> {
    let mut session = state.session.lock().await;
    Ok(Json(session.stage(&state.staging).await?))
}

/// GET /api/preview
pub async fn get_preview(State(state): State<AppState>) -> ApiResult<Json<PreviewSnapshot>> {
    Ok(Json(state.staging.preview().await?))
}

/// POST /api/commit
pub async fn commit_preview(
    State(state): State<AppState>,
    Json(reviewed): Json<PreviewSnapshot>,
) -> ApiResult<Json<CommitReceipt>> {
    let mut session = state.session.lock().await;
    Ok(Json(session.commit(&state.staging, &reviewed).await?))
}

/// GET /api/merged
pub async fn get_merged(State(state): State<AppState>) -> ApiResult<Json<Vec<MergedRow>>> {
    Ok(Json(state.store.load_merged().await?))
}
