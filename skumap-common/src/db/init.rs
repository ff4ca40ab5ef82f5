//! Database initialization
//!
//! Opens (or creates) the catalog database and brings the four tables into
//! existence. A pre-existing database whose tables drifted from the declared
//! schema is rejected with a column mismatch instead of being migrated.

use crate::db::table_schemas::ensure_catalog_schemas;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets display reads proceed while a stage/commit transaction writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    ensure_catalog_schemas(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the catalog tables
///
/// Held on a single connection that never expires, since every new
/// connection to `sqlite::memory:` would see an empty database.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    ensure_catalog_schemas(&pool).await?;

    Ok(pool)
}
