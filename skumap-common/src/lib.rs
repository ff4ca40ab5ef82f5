//! # SKUMAP Common Library
//!
//! Shared code for the catalog linkage tools including:
//! - Error taxonomy shared by every operator-facing action
//! - Configuration loading and root folder resolution
//! - Database initialization and declarative table schemas
//! - The Catalog Store (POS, WEB, PREVIEW and MERGED tables)

pub mod config;
pub mod db;
pub mod error;

pub use db::catalog::CatalogStore;
pub use db::models::{
    CatalogRecord, CatalogSide, CatalogTable, CellValue, LinkRow, MergedRow, RowSet,
};
pub use error::{Error, Result};
