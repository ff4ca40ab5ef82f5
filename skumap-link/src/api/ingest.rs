//! Feed re-ingestion endpoint

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::ingest::{ingest_all, IngestReport};
use crate::AppState;

/// POST /api/ingest
///
/// Reloads POS and WEB from the configured feeds, then re-runs the session's
/// current filters so its views show the new rows.
pub async fn run_ingest(State(state): State<AppState>) -> ApiResult<Json<IngestReport>> {
    let mut session = state.session.lock().await;
    let report = ingest_all(&state.store, &state.feeds).await?;
    session.refresh(&state.store).await?;
    Ok(Json(report))
}
