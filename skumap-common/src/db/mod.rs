//! Database access for the catalog tables

pub mod catalog;
pub mod init;
pub mod models;
pub mod predicate;
pub mod schema;
pub mod table_schemas;

pub use catalog::{CatalogStore, SortKey, SortOrder, StoreTransaction, TableInfo, TableQuery};
pub use init::{init_database, init_in_memory};
pub use predicate::Predicate;
