//! Declarative schema definitions and drift detection
//!
//! Table DDL is generated from the column definitions, and an existing table
//! is introspected with `PRAGMA table_info` on startup. Column-name or
//! column-order drift is reported as [`Error::SchemaMismatch`]; nothing is
//! renamed, reordered or added behind the operator's back.
//!
//! # Usage
//!
//! ```rust,ignore
//! SchemaVerifier::create_table::<PosTableSchema>(&pool).await?;
//! SchemaVerifier::verify_table::<PosTableSchema>(&pool).await?;
//! ```

use crate::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// AUTOINCREMENT (only meaningful on an INTEGER PRIMARY KEY)
    pub autoincrement: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            autoincrement: false,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark column as a monotonic surrogate identifier
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// True for store-assigned columns that callers never supply
    pub fn is_surrogate(&self) -> bool {
        self.primary_key && self.autoincrement
    }

    fn ddl(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.autoincrement {
            sql.push_str(" AUTOINCREMENT");
        }
        sql
    }
}

/// Actual column from database introspection (PRAGMA table_info result)
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Column ID (position in table)
    pub cid: i32,
    /// Column name
    pub name: String,
    /// SQL type from PRAGMA table_info
    pub type_name: String,
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions, in storage order
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// Columns a caller supplies on write (surrogate excluded)
    fn data_columns() -> Vec<String> {
        Self::expected_columns()
            .into_iter()
            .filter(|c| !c.is_surrogate())
            .map(|c| c.name)
            .collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement derived from the definitions
    fn create_sql() -> String {
        let columns: Vec<String> =
            Self::expected_columns().iter().map(ColumnDefinition::ddl).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            Self::table_name(),
            columns.join(", ")
        )
    }
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns from database table using PRAGMA table_info
    ///
    /// Returns columns in database order (by cid)
    pub async fn introspect_table(
        pool: &SqlitePool,
        table_name: &str,
    ) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
            })
            .collect();

        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    /// Check if table exists
    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Schema comparison between expected and actual definitions
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare column names (and their order) exactly
    pub fn columns_match(expected: &[String], actual: &[String]) -> bool {
        expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| e == a)
    }

    /// Check if SQL types are compatible (SQLite type affinity rules)
    pub fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        let affinity = |t: &str| {
            if t.contains("INT") {
                "INTEGER"
            } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
                "TEXT"
            } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
                "REAL"
            } else {
                "NUMERIC"
            }
        };

        affinity(&exp) == affinity(&act)
    }
}

/// Create and verify tables against their declared schema
pub struct SchemaVerifier;

impl SchemaVerifier {
    /// Create the table when missing
    pub async fn create_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
        sqlx::query(&T::create_sql()).execute(pool).await?;
        Ok(())
    }

    /// Fail with [`Error::SchemaMismatch`] when the on-disk column list drifted
    ///
    /// Type differences within the same SQLite affinity are tolerated; other
    /// type differences are logged but not fatal, since SQLite stores values
    /// by their runtime type anyway.
    pub async fn verify_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
        let table_name = T::table_name();
        let expected = T::expected_columns();

        if !SchemaIntrospector::table_exists(pool, table_name).await? {
            return Err(Error::NotFound(format!("Table '{}' does not exist", table_name)));
        }

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;

        let expected_names: Vec<String> = expected.iter().map(|c| c.name.clone()).collect();
        let actual_names: Vec<String> = actual.iter().map(|c| c.name.clone()).collect();

        if !SchemaDiff::columns_match(&expected_names, &actual_names) {
            return Err(Error::SchemaMismatch {
                table: table_name.to_string(),
                expected: expected_names,
                actual: actual_names,
            });
        }

        for (exp, act) in expected.iter().zip(&actual) {
            if !SchemaDiff::types_compatible(&exp.sql_type, &act.type_name) {
                warn!(
                    "Type mismatch in {}.{}: expected '{}', found '{}'",
                    table_name, exp.name, exp.sql_type, act.type_name
                );
            }
        }

        info!("Schema verified for '{}'", table_name);
        Ok(())
    }
}
