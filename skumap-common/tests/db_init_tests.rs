//! Integration tests for database initialization and schema verification
//!
//! Covers:
//! - Automatic database creation with the four catalog tables
//! - Reopening an existing database
//! - Column drift in a pre-existing table surfaced as a mismatch

use skumap_common::db::init::init_database;
use skumap_common::db::{CatalogStore, Predicate};
use skumap_common::{CatalogRecord, CatalogSide, CatalogTable, Error};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("skus.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");

    let store = CatalogStore::new(pool.unwrap());
    let counts = store.table_counts().await.unwrap();
    assert_eq!(counts.len(), 4);
    assert!(counts.iter().all(|t| t.row_count == 0));
}

#[tokio::test]
async fn test_database_reopen_keeps_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("skus.db");

    {
        let store = CatalogStore::new(init_database(&db_path).await.unwrap());
        let records = vec![CatalogRecord::new(CatalogSide::Web, "W1", "Widget Pro", 9.99)];
        store
            .replace_table(CatalogTable::Web, &CatalogRecord::row_set(CatalogSide::Web, &records))
            .await
            .unwrap();
        store.pool().close().await;
    }

    let store = CatalogStore::new(init_database(&db_path).await.unwrap());
    let records = store.load_catalog(CatalogSide::Web, &Predicate::all()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier, "W1");
    assert_eq!(records[0].price, 9.99);
}

#[tokio::test]
async fn test_drifted_table_is_column_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("skus.db");

    // A legacy file whose POS table has its columns in the wrong order
    {
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new().connect(&url).await.unwrap();
        sqlx::query("CREATE TABLE POS (NAME_P TEXT, SKU_P TEXT, PRICE_P REAL, USE_P INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let err = init_database(&db_path).await.unwrap_err();
    match err {
        Error::SchemaMismatch { table, expected, actual } => {
            assert_eq!(table, "POS");
            assert_eq!(expected[0], "SKU_P");
            assert_eq!(actual[0], "NAME_P");
        }
        other => panic!("Expected SchemaMismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_numeric_identifiers_in_legacy_file_read_as_text() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("skus.db");

    // Older exports stored ProdNo as an integer column
    {
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new().connect(&url).await.unwrap();
        sqlx::query("CREATE TABLE POS (SKU_P INTEGER, NAME_P TEXT, PRICE_P REAL, USE_P INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO POS VALUES (123, 'Widget', 9.99, 0)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let store = CatalogStore::new(init_database(&db_path).await.unwrap());
    let records = store.load_catalog(CatalogSide::Pos, &Predicate::all()).await.unwrap();
    assert_eq!(records[0].identifier, "123");
}
