//! Row selection into the pairing buffer

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skumap_common::CatalogSide;
use uuid::Uuid;

use crate::buffer::BufferSnapshot;
use crate::error::ApiResult;
use crate::session::LinkSession;
use crate::staging::StagingPhase;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Index into the side's current view
    pub row_index: usize,
}

#[derive(Debug, Serialize)]
pub struct BufferResponse {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub phase: StagingPhase,
    pub fields: BufferSnapshot,
}

impl From<&LinkSession> for BufferResponse {
    fn from(session: &LinkSession) -> Self {
        Self {
            session_id: session.id(),
            started_at: session.started_at(),
            phase: session.phase(),
            fields: session.buffer().snapshot(),
        }
    }
}

/// POST /api/select/:side
pub async fn select_row(
    State(state): State<AppState>,
    Path(side): Path<String>,
    Json(body): Json<SelectRequest>,
) -> ApiResult<Json<BufferResponse>> {
    let side: CatalogSide = side.parse()?;
    let mut session = state.session.lock().await;
    session.select(side, body.row_index)?;
    Ok(Json(BufferResponse::from(&*session)))
}

/// GET /api/buffer
pub async fn get_buffer(State(state): State<AppState>) -> Json<BufferResponse> {
    let session = state.session.lock().await;
    Json(BufferResponse::from(&*session))
}
