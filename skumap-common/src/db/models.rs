//! Database models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::table_schemas::{
    NAME_P, NAME_W, PRICE_P, PRICE_W, SKU_P, SKU_W, USE_P, USE_W,
};
use crate::{Error, Result};

/// One of the two source catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSide {
    /// Point-of-sale export
    Pos,
    /// Web catalog export
    Web,
}

impl CatalogSide {
    pub const ALL: [CatalogSide; 2] = [CatalogSide::Pos, CatalogSide::Web];

    /// Table holding this side's ingested records
    pub fn table(self) -> CatalogTable {
        match self {
            CatalogSide::Pos => CatalogTable::Pos,
            CatalogSide::Web => CatalogTable::Web,
        }
    }

    pub fn identifier_column(self) -> &'static str {
        match self {
            CatalogSide::Pos => SKU_P,
            CatalogSide::Web => SKU_W,
        }
    }

    pub fn name_column(self) -> &'static str {
        match self {
            CatalogSide::Pos => NAME_P,
            CatalogSide::Web => NAME_W,
        }
    }

    pub fn price_column(self) -> &'static str {
        match self {
            CatalogSide::Pos => PRICE_P,
            CatalogSide::Web => PRICE_W,
        }
    }

    pub fn use_column(self) -> &'static str {
        match self {
            CatalogSide::Pos => USE_P,
            CatalogSide::Web => USE_W,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CatalogSide::Pos => "POS",
            CatalogSide::Web => "WEB",
        }
    }
}

impl fmt::Display for CatalogSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CatalogSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pos" => Ok(CatalogSide::Pos),
            "web" => Ok(CatalogSide::Web),
            other => Err(Error::InvalidInput(format!("Unknown catalog side: {}", other))),
        }
    }
}

/// The four persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CatalogTable {
    Pos,
    Web,
    /// Most recently staged pairing set (replaced on every stage)
    Preview,
    /// Append-only history of committed pairings
    Merged,
}

impl CatalogTable {
    pub const ALL: [CatalogTable; 4] = [
        CatalogTable::Pos,
        CatalogTable::Web,
        CatalogTable::Preview,
        CatalogTable::Merged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CatalogTable::Pos => "POS",
            CatalogTable::Web => "WEB",
            CatalogTable::Preview => "PREVIEW",
            CatalogTable::Merged => "MERGED",
        }
    }
}

impl fmt::Display for CatalogTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CatalogTable::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidInput(format!("Invalid table name: {}", s)))
    }
}

/// A non-null scalar stored in a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Real(v) => Some(*v),
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Text(_) => None,
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Real(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

/// A row of cells, `None` being SQL NULL
pub type Row = Vec<Option<CellValue>>;

/// Named columns plus ordered rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the column list
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidInput(format!(
                "Row has {} values but {} columns are declared",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (`row`, `column`), `None` for NULL or unknown positions
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_ref()
    }
}

/// A normalized product record from one catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub side: CatalogSide,
    /// Catalog-local product code
    pub identifier: String,
    pub name: String,
    pub price: f64,
    /// Whether this side should dominate a future automated reconciliation (unused)
    pub use_flag: bool,
}

impl CatalogRecord {
    pub fn new(
        side: CatalogSide,
        identifier: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            side,
            identifier: identifier.into(),
            name: name.into(),
            price,
            use_flag: false,
        }
    }

    /// Column names of a side's table, in storage order
    pub fn columns(side: CatalogSide) -> [&'static str; 4] {
        [
            side.identifier_column(),
            side.name_column(),
            side.price_column(),
            side.use_column(),
        ]
    }

    pub fn to_row(&self) -> Row {
        vec![
            Some(CellValue::Text(self.identifier.clone())),
            Some(CellValue::Text(self.name.clone())),
            Some(CellValue::Real(self.price)),
            Some(CellValue::Integer(i64::from(self.use_flag))),
        ]
    }

    /// Build the replacement row set for a side's table
    pub fn row_set(side: CatalogSide, records: &[CatalogRecord]) -> RowSet {
        let mut set = RowSet::new(Self::columns(side));
        set.rows = records.iter().map(CatalogRecord::to_row).collect();
        set
    }

    /// Decode row `index` of a set produced by querying `side`'s table
    pub fn from_row_set(side: CatalogSide, set: &RowSet, index: usize) -> Self {
        let text = |col: &str| {
            set.get(index, col)
                .and_then(CellValue::as_text)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            side,
            identifier: text(side.identifier_column()),
            name: text(side.name_column()),
            price: set
                .get(index, side.price_column())
                .and_then(CellValue::as_f64)
                .unwrap_or(0.0),
            use_flag: matches!(
                set.get(index, side.use_column()),
                Some(CellValue::Integer(v)) if *v != 0
            ),
        }
    }
}

/// One (possibly partial) POS/WEB pairing as stored in PREVIEW and MERGED
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkRow {
    pub pos_sku: Option<String>,
    pub web_sku: Option<String>,
    pub pos_name: Option<String>,
    pub web_name: Option<String>,
    pub pos_price: Option<f64>,
    pub web_price: Option<f64>,
}

impl LinkRow {
    /// Column names shared by PREVIEW and MERGED (surrogate id excluded)
    pub fn columns() -> [&'static str; 6] {
        [SKU_P, SKU_W, NAME_P, NAME_W, PRICE_P, PRICE_W]
    }

    pub fn to_row(&self) -> Row {
        vec![
            self.pos_sku.clone().map(CellValue::Text),
            self.web_sku.clone().map(CellValue::Text),
            self.pos_name.clone().map(CellValue::Text),
            self.web_name.clone().map(CellValue::Text),
            self.pos_price.map(CellValue::Real),
            self.web_price.map(CellValue::Real),
        ]
    }

    pub fn row_set(links: &[LinkRow]) -> RowSet {
        let mut set = RowSet::new(Self::columns());
        set.rows = links.iter().map(LinkRow::to_row).collect();
        set
    }

    pub fn from_row_set(set: &RowSet, index: usize) -> Self {
        let text = |col: &str| set.get(index, col).and_then(CellValue::as_text).map(str::to_string);
        let real = |col: &str| set.get(index, col).and_then(CellValue::as_f64);

        Self {
            pos_sku: text(SKU_P),
            web_sku: text(SKU_W),
            pos_name: text(NAME_P),
            web_name: text(NAME_W),
            pos_price: real(PRICE_P),
            web_price: real(PRICE_W),
        }
    }

    /// True when no field is populated
    pub fn is_blank(&self) -> bool {
        *self == LinkRow::default()
    }
}

/// A committed pairing with its surrogate identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub id: i64,
    #[serde(flatten)]
    pub link: LinkRow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parsing_is_case_insensitive() {
        assert_eq!("POS".parse::<CatalogSide>().unwrap(), CatalogSide::Pos);
        assert_eq!("web".parse::<CatalogSide>().unwrap(), CatalogSide::Web);
        assert!("merged".parse::<CatalogSide>().is_err());
    }

    #[test]
    fn test_table_parsing() {
        assert_eq!("merged".parse::<CatalogTable>().unwrap(), CatalogTable::Merged);
        assert!("sqlite_master".parse::<CatalogTable>().is_err());
    }

    #[test]
    fn test_row_set_rejects_wrong_width() {
        let mut set = RowSet::new(["A", "B"]);
        assert!(set.push(vec![None]).is_err());
        assert!(set.push(vec![None, Some(CellValue::from("x"))]).is_ok());
        assert_eq!(set.get(0, "B"), Some(&CellValue::Text("x".to_string())));
        assert_eq!(set.get(0, "A"), None);
    }

    #[test]
    fn test_cell_value_untagged_json() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[1, 9.99, "W1"]"#).unwrap();
        assert_eq!(
            cells,
            vec![CellValue::Integer(1), CellValue::Real(9.99), CellValue::Text("W1".to_string())]
        );
    }

    #[test]
    fn test_partial_link_row_keeps_nulls() {
        let link = LinkRow {
            pos_sku: Some("123".to_string()),
            pos_price: Some(9.99),
            ..LinkRow::default()
        };

        let set = LinkRow::row_set(std::slice::from_ref(&link));
        assert_eq!(set.rows[0][1], None);
        assert_eq!(LinkRow::from_row_set(&set, 0), link);
        assert!(!link.is_blank());
    }
}
