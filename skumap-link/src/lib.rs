//! skumap-link library - catalog linkage service
//!
//! Operators narrow the POS and WEB catalogs by search, select one row per
//! side into a pairing buffer, stage it to PREVIEW, and commit it to the
//! MERGED history. The history exports as a WEB-to-POS identifier file.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use skumap_common::{CatalogStore, Result};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod buffer;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod pagination;
pub mod review;
pub mod session;
pub mod staging;

use ingest::FeedSources;
use session::LinkSession;
use staging::StagingCoordinator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: CatalogStore,
    pub staging: StagingCoordinator,
    /// The operator's session; one per server process
    pub session: Arc<Mutex<LinkSession>>,
    pub feeds: FeedSources,
    pub export_path: PathBuf,
}

impl AppState {
    /// Create application state with a freshly opened session
    pub async fn new(
        store: CatalogStore,
        feeds: FeedSources,
        export_path: PathBuf,
    ) -> Result<Self> {
        let session = LinkSession::open(&store).await?;

        Ok(Self {
            staging: StagingCoordinator::new(store.clone()),
            store,
            session: Arc::new(Mutex::new(session)),
            feeds,
            export_path,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let catalog: Router<AppState> = Router::new()
        .route("/api/tables", get(api::list_tables))
        .route("/api/table/:name", get(api::get_table_data))
        .route("/api/ingest", post(api::run_ingest))
        .route("/api/view/:side", get(api::get_view))
        .route("/api/search/:side/identifier", post(api::search_by_identifier))
        .route("/api/search/:side/name", post(api::search_by_name))
        .route("/api/search/:side/reset", post(api::reset_search));

    let linkage: Router<AppState> = Router::new()
        .route("/api/select/:side", post(api::select_row))
        .route("/api/buffer", get(api::get_buffer))
        .route("/api/stage", post(api::stage_buffer))
        .route("/api/preview", get(api::get_preview))
        .route("/api/commit", post(api::commit_preview))
        .route("/api/merged", get(api::get_merged))
        .route("/api/export", get(api::download_export).post(api::write_export))
        .route("/api/review/duplicates", get(api::get_duplicates));

    Router::new()
        .merge(catalog)
        .merge(linkage)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
