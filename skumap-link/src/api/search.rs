//! Operator searches over one catalog side
//!
//! A successful search replaces the side's view and returns it. A rejected
//! search (no usable terms) leaves the view as it was.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use skumap_common::CatalogSide;

use crate::error::ApiResult;
use crate::filter::SearchRequest;
use crate::session::CatalogView;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IdentifierSearch {
    #[serde(default)]
    pub substring: String,
}

#[derive(Debug, Deserialize)]
pub struct NameSearch {
    /// Up to three terms; empty entries are ignored
    #[serde(default)]
    pub terms: Vec<String>,
}

async fn run_search(
    state: &AppState,
    side: &str,
    request: SearchRequest,
) -> ApiResult<Json<CatalogView>> {
    let side: CatalogSide = side.parse()?;
    let mut session = state.session.lock().await;
    let view = session.search(&state.store, side, &request).await?;
    Ok(Json(view.clone()))
}

/// POST /api/search/:side/identifier
pub async fn search_by_identifier(
    State(state): State<AppState>,
    Path(side): Path<String>,
    Json(body): Json<IdentifierSearch>,
) -> ApiResult<Json<CatalogView>> {
    run_search(&state, &side, SearchRequest::Identifier { substring: body.substring }).await
}

/// POST /api/search/:side/name
pub async fn search_by_name(
    State(state): State<AppState>,
    Path(side): Path<String>,
    Json(body): Json<NameSearch>,
) -> ApiResult<Json<CatalogView>> {
    run_search(&state, &side, SearchRequest::Name { terms: body.terms }).await
}

/// POST /api/search/:side/reset
pub async fn reset_search(
    State(state): State<AppState>,
    Path(side): Path<String>,
) -> ApiResult<Json<CatalogView>> {
    let side: CatalogSide = side.parse()?;
    let mut session = state.session.lock().await;
    let view = session.reset(&state.store, side).await?;
    Ok(Json(view.clone()))
}
