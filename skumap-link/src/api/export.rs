//! Mapping export endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiResult;
use crate::export::{export_mapping, export_to_path, to_csv_string, ExportSummary};
use crate::AppState;

/// GET /api/export
///
/// The mapping as a `text/csv` download; nothing is written to disk.
pub async fn download_export(State(state): State<AppState>) -> ApiResult<Response> {
    let pairs = export_mapping(&state.store).await?;
    let body = to_csv_string(&pairs)?;

    let file_name = state
        .export_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sku2sku.csv".to_string());

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
    ];

    Ok((headers, body).into_response())
}

/// POST /api/export
///
/// Regenerates the configured export file.
pub async fn write_export(State(state): State<AppState>) -> ApiResult<Json<ExportSummary>> {
    Ok(Json(export_to_path(&state.store, &state.export_path).await?))
}
