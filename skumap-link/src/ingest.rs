//! Source feed ingestion
//!
//! Reads the POS and WEB catalog exports, drops incomplete rows, and replaces
//! the POS and WEB tables wholesale. The POS export is Latin-1 text with a
//! banner before the data and no header row; the WEB export is UTF-8 with a
//! header row naming its columns.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skumap_common::config::{ResolvedPaths, TomlConfig};
use skumap_common::{CatalogRecord, CatalogSide, CatalogStore, CatalogTable, Error, Result};
use tracing::{info, warn};

/// Cell contents treated as missing values, the usual spreadsheet and
/// dataframe NA spellings
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// WEB feed header names consumed by ingestion
const WEB_SKU: &str = "sku";
const WEB_NAME: &str = "name";
const WEB_PRICE: &str = "price";

/// Where the two feeds live and how to read them
#[derive(Debug, Clone)]
pub struct FeedSources {
    pub pos_feed: PathBuf,
    pub web_feed: PathBuf,
    /// Banner lines preceding the POS data rows
    pub pos_skip_rows: usize,
}

impl FeedSources {
    pub fn from_config(config: &TomlConfig, paths: &ResolvedPaths) -> Self {
        Self {
            pos_feed: paths.pos_feed.clone(),
            web_feed: paths.web_feed.clone(),
            pos_skip_rows: config.pos_skip_rows,
        }
    }
}

/// Row counts for one feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedReport {
    pub side: CatalogSide,
    pub read: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl FeedReport {
    fn new(side: CatalogSide, read: usize, kept: usize) -> Self {
        Self {
            side,
            read,
            kept,
            dropped: read - kept,
        }
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub pos: FeedReport,
    pub web: FeedReport,
}

/// Trimmed cell text, `None` when blank or a missing-value marker
fn present(cell: Option<&str>) -> Option<&str> {
    let value = cell?.trim();
    if value.is_empty() || MISSING_MARKERS.contains(&value) {
        None
    } else {
        Some(value)
    }
}

/// Parsed price; unparseable text counts as missing
fn price(cell: Option<&str>) -> Option<f64> {
    present(cell)?.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Decode Latin-1: every byte is the code point of the same value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Drop the first `n` physical lines, blank ones included
fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

/// Parse a POS export
///
/// Columns are positional: product code, description, price. A row is kept
/// only when all three are present and the price is positive.
pub fn parse_pos_feed(bytes: &[u8], skip_rows: usize) -> Result<(Vec<CatalogRecord>, FeedReport)> {
    let text = decode_latin1(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(skip_lines(&text, skip_rows).as_bytes());

    let mut read = 0;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| Error::Feed(format!("POS feed: {}", e)))?;
        read += 1;

        let (Some(code), Some(description), Some(amount)) =
            (present(row.get(0)), present(row.get(1)), price(row.get(2)))
        else {
            continue;
        };

        if amount > 0.0 {
            records.push(CatalogRecord::new(CatalogSide::Pos, code, description, amount));
        }
    }

    let report = FeedReport::new(CatalogSide::Pos, read, records.len());
    Ok((records, report))
}

/// Parse a WEB export
///
/// Columns are located by header name; unknown columns are ignored. A row is
/// kept when identifier, name and price are all present.
pub fn parse_web_feed<R: Read>(reader: R) -> Result<(Vec<CatalogRecord>, FeedReport)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::Feed(format!("WEB feed: {}", e)))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Feed(format!("WEB feed has no '{}' column", name)))
    };
    let (sku_idx, name_idx, price_idx) = (column(WEB_SKU)?, column(WEB_NAME)?, column(WEB_PRICE)?);

    let mut read = 0;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| Error::Feed(format!("WEB feed: {}", e)))?;
        read += 1;

        if let (Some(sku), Some(name), Some(amount)) =
            (present(row.get(sku_idx)), present(row.get(name_idx)), price(row.get(price_idx)))
        {
            records.push(CatalogRecord::new(CatalogSide::Web, sku, name, amount));
        }
    }

    let report = FeedReport::new(CatalogSide::Web, read, records.len());
    Ok((records, report))
}

fn read_feed(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::Feed(format!("Read {} failed: {}", path.display(), e)))
}

/// Read both feeds and replace the POS and WEB tables in one transaction
pub async fn ingest_all(store: &CatalogStore, sources: &FeedSources) -> Result<IngestReport> {
    let (pos_records, pos) = parse_pos_feed(&read_feed(&sources.pos_feed)?, sources.pos_skip_rows)?;
    let (web_records, web) = parse_web_feed(read_feed(&sources.web_feed)?.as_slice())?;

    for report in [&pos, &web] {
        if report.dropped > 0 {
            warn!(
                side = %report.side,
                dropped = report.dropped,
                "Dropped incomplete feed rows"
            );
        }
    }

    let mut tx = store.begin().await?;
    tx.replace_table(CatalogTable::Pos, &CatalogRecord::row_set(CatalogSide::Pos, &pos_records))
        .await?;
    tx.replace_table(CatalogTable::Web, &CatalogRecord::row_set(CatalogSide::Web, &web_records))
        .await?;
    tx.commit().await?;

    info!(
        pos_read = pos.read,
        pos_kept = pos.kept,
        web_read = web.read,
        web_kept = web.kept,
        "Catalog feeds ingested"
    );

    Ok(IngestReport { pos, web })
}
