//! HTTP API handlers for skumap-link

pub mod export;
pub mod health;
pub mod ingest;
pub mod review;
pub mod search;
pub mod selection;
pub mod staging;
pub mod table;
pub mod tables;
pub mod view;

pub use export::{download_export, write_export};
pub use health::health_routes;
pub use ingest::run_ingest;
pub use review::get_duplicates;
pub use search::{reset_search, search_by_identifier, search_by_name};
pub use selection::{get_buffer, select_row};
pub use staging::{commit_preview, get_merged, get_preview, stage_buffer};
pub use table::get_table_data;
pub use tables::list_tables;
pub use view::get_view;
