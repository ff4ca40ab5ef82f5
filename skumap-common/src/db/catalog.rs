//! Catalog Store
//!
//! Read/replace/append access to the four named tables. Every mutation runs
//! inside a transaction and is visible to the next read as soon as the call
//! returns. Row sets must carry exactly the table's data columns, in order;
//! anything else is a column mismatch.

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row as _, Sqlite, SqliteConnection, SqlitePool, Transaction, TypeInfo, ValueRef};
use tracing::debug;

use crate::db::models::{
    CatalogRecord, CatalogSide, CatalogTable, CellValue, LinkRow, MergedRow, Row, RowSet,
};
use crate::db::predicate::Predicate;
use crate::db::schema::SchemaDiff;
use crate::db::table_schemas::MERGED_ID;
use crate::{Error, Result};

/// Table name plus current row count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
}

/// Sort direction for caller-requested ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Ordering by a schema column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub order: SortOrder,
}

/// What to read from a table
///
/// Defaults to every row in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub predicate: Predicate,
    pub sort: Option<SortKey>,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl TableQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(predicate: Predicate) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortKey {
            column: column.into(),
            order,
        });
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = offset.max(0);
        self
    }
}

/// Persistent store for the POS, WEB, PREVIEW and MERGED tables
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction spanning several store operations
    pub async fn begin(&self) -> Result<StoreTransaction> {
        Ok(StoreTransaction {
            tx: self.pool.begin().await?,
        })
    }

    /// Atomically replace every row of `table` with `rows`
    ///
    /// Returns the number of rows written.
    pub async fn replace_table(&self, table: CatalogTable, rows: &RowSet) -> Result<u64> {
        let mut tx = self.begin().await?;
        let written = tx.replace_table(table, rows).await?;
        tx.commit().await?;
        Ok(written)
    }

    /// Append `rows` to `table`, returning the row id assigned to each
    pub async fn append_rows(&self, table: CatalogTable, rows: &RowSet) -> Result<Vec<i64>> {
        let mut tx = self.begin().await?;
        let ids = tx.append_rows(table, rows).await?;
        tx.commit().await?;
        Ok(ids)
    }

    /// Rows of `table` matching `query`, insertion order unless sorted
    pub async fn query(&self, table: CatalogTable, query: &TableQuery) -> Result<RowSet> {
        let mut conn = self.pool.acquire().await?;
        query_on(&mut conn, table, query).await
    }

    /// Number of rows of `table` matching `predicate`
    pub async fn count(&self, table: CatalogTable, predicate: &Predicate) -> Result<i64> {
        validate_predicate(table, predicate)?;

        let (where_sql, binds) = predicate.to_sql();
        let sql = format!("SELECT COUNT(*) FROM {}{}", table.name(), where_sql);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Row counts of the four tables, in declaration order
    pub async fn table_counts(&self) -> Result<Vec<TableInfo>> {
        let mut infos = Vec::with_capacity(CatalogTable::ALL.len());
        for table in CatalogTable::ALL {
            infos.push(TableInfo {
                name: table.name().to_string(),
                row_count: self.count(table, &Predicate::all()).await?,
            });
        }
        Ok(infos)
    }

    /// Typed read of one catalog side
    pub async fn load_catalog(
        &self,
        side: CatalogSide,
        predicate: &Predicate,
    ) -> Result<Vec<CatalogRecord>> {
        let set = self
            .query(side.table(), &TableQuery::filtered(predicate.clone()))
            .await?;

        Ok((0..set.len())
            .map(|i| CatalogRecord::from_row_set(side, &set, i))
            .collect())
    }

    /// Current PREVIEW contents
    pub async fn load_preview(&self) -> Result<Vec<LinkRow>> {
        let set = self.query(CatalogTable::Preview, &TableQuery::all()).await?;
        Ok(links_from(&set))
    }

    /// Full MERGED history in insertion order
    pub async fn load_merged(&self) -> Result<Vec<MergedRow>> {
        let set = self.query(CatalogTable::Merged, &TableQuery::all()).await?;
        Ok(merged_from(&set))
    }
}

/// A store transaction; dropped without `commit` it rolls back
pub struct StoreTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTransaction {
    pub async fn replace_table(&mut self, table: CatalogTable, rows: &RowSet) -> Result<u64> {
        replace_on(&mut self.tx, table, rows).await
    }

    pub async fn append_rows(&mut self, table: CatalogTable, rows: &RowSet) -> Result<Vec<i64>> {
        append_on(&mut self.tx, table, rows).await
    }

    pub async fn query(&mut self, table: CatalogTable, query: &TableQuery) -> Result<RowSet> {
        query_on(&mut self.tx, table, query).await
    }

    pub async fn load_preview(&mut self) -> Result<Vec<LinkRow>> {
        let set = self.query(CatalogTable::Preview, &TableQuery::all()).await?;
        Ok(links_from(&set))
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

fn links_from(set: &RowSet) -> Vec<LinkRow> {
    (0..set.len()).map(|i| LinkRow::from_row_set(set, i)).collect()
}

fn merged_from(set: &RowSet) -> Vec<MergedRow> {
    (0..set.len())
        .map(|i| MergedRow {
            id: match set.get(i, MERGED_ID) {
                Some(CellValue::Integer(id)) => *id,
                _ => 0,
            },
            link: LinkRow::from_row_set(set, i),
        })
        .collect()
}

/// Row sets must name exactly the table's data columns, in order
fn check_row_set(table: CatalogTable, rows: &RowSet) -> Result<()> {
    let expected = table.data_columns();
    if !SchemaDiff::columns_match(&expected, &rows.columns) {
        return Err(Error::SchemaMismatch {
            table: table.name().to_string(),
            expected,
            actual: rows.columns.clone(),
        });
    }

    let ragged = rows
        .rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != rows.columns.len());
    if let Some((i, row)) = ragged {
        return Err(Error::InvalidInput(format!(
            "Row {} has {} values but {} columns are declared",
            i,
            row.len(),
            rows.columns.len()
        )));
    }

    Ok(())
}

fn validate_predicate(table: CatalogTable, predicate: &Predicate) -> Result<()> {
    match predicate.clauses().iter().find(|c| !table.has_column(&c.column)) {
        Some(clause) => Err(Error::InvalidInput(format!(
            "Invalid column for {}: {}",
            table.name(),
            clause.column
        ))),
        None => Ok(()),
    }
}

fn insert_sql(table: CatalogTable, columns: &[String]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        columns.join(", "),
        placeholders
    )
}

fn bind_row<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    row: &'q Row,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for cell in row {
        query = match cell {
            None => query.bind(None::<String>),
            Some(CellValue::Text(s)) => query.bind(s.as_str()),
            Some(CellValue::Real(v)) => query.bind(*v),
            Some(CellValue::Integer(v)) => query.bind(*v),
        };
    }
    query
}

async fn replace_on(
    conn: &mut SqliteConnection,
    table: CatalogTable,
    rows: &RowSet,
) -> Result<u64> {
    check_row_set(table, rows)?;

    sqlx::query(&format!("DELETE FROM {}", table.name()))
        .execute(&mut *conn)
        .await?;

    let sql = insert_sql(table, &rows.columns);
    for row in &rows.rows {
        bind_row(sqlx::query(&sql), row).execute(&mut *conn).await?;
    }

    debug!(table = table.name(), rows = rows.len(), "Replaced table contents");
    Ok(rows.len() as u64)
}

async fn append_on(
    conn: &mut SqliteConnection,
    table: CatalogTable,
    rows: &RowSet,
) -> Result<Vec<i64>> {
    check_row_set(table, rows)?;

    let sql = insert_sql(table, &rows.columns);
    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows.rows {
        let result = bind_row(sqlx::query(&sql), row).execute(&mut *conn).await?;
        ids.push(result.last_insert_rowid());
    }

    debug!(table = table.name(), rows = rows.len(), "Appended rows");
    Ok(ids)
}

async fn query_on(
    conn: &mut SqliteConnection,
    table: CatalogTable,
    query: &TableQuery,
) -> Result<RowSet> {
    validate_predicate(table, &query.predicate)?;

    let columns = table.expected_columns();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

    let order_sql = match &query.sort {
        Some(key) => {
            if !table.has_column(&key.column) {
                return Err(Error::InvalidInput(format!("Invalid column: {}", key.column)));
            }
            format!(" ORDER BY {} {}, rowid ASC", key.column, key.order.sql())
        }
        None => " ORDER BY rowid ASC".to_string(),
    };

    let limit_sql = match query.limit {
        Some(limit) => format!(" LIMIT {} OFFSET {}", limit.max(0), query.offset.max(0)),
        None => String::new(),
    };

    let (where_sql, binds) = query.predicate.to_sql();
    let sql = format!(
        "SELECT {} FROM {}{}{}{}",
        names.join(", "),
        table.name(),
        where_sql,
        order_sql,
        limit_sql
    );

    let mut select = sqlx::query(&sql);
    for value in &binds {
        select = select.bind(value.as_str());
    }

    let rows = select.fetch_all(&mut *conn).await?;

    let mut set = RowSet::new(names);
    for row in &rows {
        let mut cells = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            cells.push(decode_cell(row, i, &column.sql_type)?);
        }
        set.rows.push(cells);
    }

    Ok(set)
}

/// Decode by the stored value's runtime type, then coerce to the declared type
///
/// Databases written by older tooling may hold numeric identifiers in TEXT
/// columns or integer prices in REAL columns.
fn decode_cell(row: &SqliteRow, index: usize, sql_type: &str) -> Result<Option<CellValue>> {
    let stored = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(None);
        }
        raw.type_info().name().to_string()
    };

    let cell = match stored.as_str() {
        "INTEGER" => CellValue::Integer(row.try_get::<i64, _>(index)?),
        "REAL" => CellValue::Real(row.try_get::<f64, _>(index)?),
        _ => CellValue::Text(row.try_get::<String, _>(index)?),
    };

    Ok(Some(match (sql_type, cell) {
        ("TEXT", CellValue::Integer(v)) => CellValue::Text(v.to_string()),
        ("TEXT", CellValue::Real(v)) => CellValue::Text(v.to_string()),
        ("REAL", CellValue::Integer(v)) => CellValue::Real(v as f64),
        (_, cell) => cell,
    }))
}
