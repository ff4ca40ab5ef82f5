//! Table listing with row counts

use axum::{extract::State, Json};
use skumap_common::db::TableInfo;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/tables
///
/// Row counts of POS, WEB, PREVIEW and MERGED.
pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Json<Vec<TableInfo>>> {
    Ok(Json(state.store.table_counts().await?))
}
