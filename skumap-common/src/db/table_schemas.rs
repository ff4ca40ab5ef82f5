//! Table Schema Definitions
//!
//! Single source of truth for the four catalog tables. Column names carry the
//! `_P` (POS) and `_W` (WEB) suffixes used by existing `skus.db` files.

use crate::db::models::CatalogTable;
use crate::db::schema::{ColumnDefinition, SchemaVerifier, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

pub const SKU_P: &str = "SKU_P";
pub const NAME_P: &str = "NAME_P";
pub const PRICE_P: &str = "PRICE_P";
pub const USE_P: &str = "USE_P";
pub const SKU_W: &str = "SKU_W";
pub const NAME_W: &str = "NAME_W";
pub const PRICE_W: &str = "PRICE_W";
pub const USE_W: &str = "USE_W";
/// Surrogate identifier of MERGED
pub const MERGED_ID: &str = "ID";

/// POS catalog table schema
pub struct PosTableSchema;

impl TableSchema for PosTableSchema {
    fn table_name() -> &'static str {
        "POS"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(SKU_P, "TEXT"),
            ColumnDefinition::new(NAME_P, "TEXT"),
            ColumnDefinition::new(PRICE_P, "REAL"),
            ColumnDefinition::new(USE_P, "INTEGER"),
        ]
    }
}

/// WEB catalog table schema
pub struct WebTableSchema;

impl TableSchema for WebTableSchema {
    fn table_name() -> &'static str {
        "WEB"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(SKU_W, "TEXT"),
            ColumnDefinition::new(NAME_W, "TEXT"),
            ColumnDefinition::new(PRICE_W, "REAL"),
            ColumnDefinition::new(USE_W, "INTEGER"),
        ]
    }
}

fn link_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new(SKU_P, "TEXT"),
        ColumnDefinition::new(SKU_W, "TEXT"),
        ColumnDefinition::new(NAME_P, "TEXT"),
        ColumnDefinition::new(NAME_W, "TEXT"),
        ColumnDefinition::new(PRICE_P, "REAL"),
        ColumnDefinition::new(PRICE_W, "REAL"),
    ]
}

/// PREVIEW table schema: the pairing about to be committed
pub struct PreviewTableSchema;

impl TableSchema for PreviewTableSchema {
    fn table_name() -> &'static str {
        "PREVIEW"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        link_columns()
    }
}

/// MERGED table schema: append-only history with a never-reused surrogate id
pub struct MergedTableSchema;

impl TableSchema for MergedTableSchema {
    fn table_name() -> &'static str {
        "MERGED"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![ColumnDefinition::new(MERGED_ID, "INTEGER")
            .not_null()
            .primary_key()
            .autoincrement()];
        columns.extend(link_columns());
        columns
    }
}

impl CatalogTable {
    /// Every column in storage order, surrogate included
    pub fn expected_columns(self) -> Vec<ColumnDefinition> {
        match self {
            CatalogTable::Pos => PosTableSchema::expected_columns(),
            CatalogTable::Web => WebTableSchema::expected_columns(),
            CatalogTable::Preview => PreviewTableSchema::expected_columns(),
            CatalogTable::Merged => MergedTableSchema::expected_columns(),
        }
    }

    /// Columns supplied by callers on replace/append
    pub fn data_columns(self) -> Vec<String> {
        match self {
            CatalogTable::Pos => PosTableSchema::data_columns(),
            CatalogTable::Web => WebTableSchema::data_columns(),
            CatalogTable::Preview => PreviewTableSchema::data_columns(),
            CatalogTable::Merged => MergedTableSchema::data_columns(),
        }
    }

    /// True if `column` is declared on this table
    pub fn has_column(self, column: &str) -> bool {
        self.expected_columns().iter().any(|c| c.name == column)
    }
}

/// Create any missing table, then verify all four against their definitions
pub async fn ensure_catalog_schemas(pool: &SqlitePool) -> Result<()> {
    SchemaVerifier::create_table::<PosTableSchema>(pool).await?;
    SchemaVerifier::create_table::<WebTableSchema>(pool).await?;
    SchemaVerifier::create_table::<PreviewTableSchema>(pool).await?;
    SchemaVerifier::create_table::<MergedTableSchema>(pool).await?;

    SchemaVerifier::verify_table::<PosTableSchema>(pool).await?;
    SchemaVerifier::verify_table::<WebTableSchema>(pool).await?;
    SchemaVerifier::verify_table::<PreviewTableSchema>(pool).await?;
    SchemaVerifier::verify_table::<MergedTableSchema>(pool).await?;

    info!("Catalog tables ready (POS, WEB, PREVIEW, MERGED)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_extends_preview_with_surrogate() {
        let merged = CatalogTable::Merged.expected_columns();
        assert!(merged[0].is_surrogate());
        assert_eq!(CatalogTable::Merged.data_columns(), CatalogTable::Preview.data_columns());
    }

    #[test]
    fn test_catalog_tables_have_no_surrogate() {
        assert_eq!(CatalogTable::Pos.data_columns(), vec!["SKU_P", "NAME_P", "PRICE_P", "USE_P"]);
        assert_eq!(CatalogTable::Web.data_columns(), vec!["SKU_W", "NAME_W", "PRICE_W", "USE_W"]);
    }

    #[test]
    fn test_has_column() {
        assert!(CatalogTable::Merged.has_column("ID"));
        assert!(!CatalogTable::Preview.has_column("ID"));
        assert!(!CatalogTable::Pos.has_column("SKU_W"));
    }
}
