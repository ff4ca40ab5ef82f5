//! Current filtered view of a catalog side

use axum::{
    extract::{Path, State},
    Json,
};
use skumap_common::CatalogSide;

use crate::error::ApiResult;
use crate::session::CatalogView;
use crate::AppState;

/// GET /api/view/:side
///
/// Row indexes in this response are the ones `POST /api/select/:side` accepts.
pub async fn get_view(
    State(state): State<AppState>,
    Path(side): Path<String>,
) -> ApiResult<Json<CatalogView>> {
    let side: CatalogSide = side.parse()?;
    let session = state.session.lock().await;
    Ok(Json(session.view(side).clone()))
}
