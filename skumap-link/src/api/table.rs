//! Table viewing API with pagination and sorting

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use skumap_common::db::models::Row;
use skumap_common::db::{Predicate, SortOrder, TableQuery};
use skumap_common::CatalogTable;

use crate::error::ApiResult;
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Query parameters for table viewing
#[derive(Debug, Deserialize)]
pub struct TableParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Column to sort by (optional)
    pub sort: Option<String>,

    /// Sort order: "asc" or "desc"
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct TableDataResponse {
    pub table_name: String,
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// GET /api/table/:name
///
/// Unsorted pages follow insertion order. Table and sort column must be
/// declared in the schema.
pub async fn get_table_data(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<TableParams>,
) -> ApiResult<Json<TableDataResponse>> {
    let table: CatalogTable = table_name.parse()?;

    let total_rows = state.store.count(table, &Predicate::all()).await?;
    let pagination = calculate_pagination(total_rows, params.page);

    let mut query = TableQuery::all().page(PAGE_SIZE, pagination.offset);
    if let Some(column) = params.sort {
        query = query.sorted_by(column, params.order);
    }

    let set = state.store.query(table, &query).await?;

    Ok(Json(TableDataResponse {
        table_name: table.name().to_string(),
        total_rows,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        columns: set.columns,
        rows: set.rows,
    }))
}
