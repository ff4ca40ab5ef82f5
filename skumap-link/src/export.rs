//! Export Projector
//!
//! Projects MERGED onto `(web identifier, POS identifier)` pairs in insertion
//! order and writes them as header-less two-column CSV. Duplicates are kept;
//! a missing identifier from a partial pairing becomes an empty field.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skumap_common::{CatalogStore, Error, MergedRow, Result};
use tracing::info;

/// One line of the export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingPair {
    pub web_identifier: Option<String>,
    pub pos_identifier: Option<String>,
}

impl From<&MergedRow> for MappingPair {
    fn from(row: &MergedRow) -> Self {
        Self {
            web_identifier: row.link.web_sku.clone(),
            pos_identifier: row.link.pos_sku.clone(),
        }
    }
}

/// Written export file plus its row count
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Regenerate the mapping from MERGED
pub async fn export_mapping(store: &CatalogStore) -> Result<Vec<MappingPair>> {
    let merged = store.load_merged().await?;
    Ok(merged.iter().map(MappingPair::from).collect())
}

/// Write `pairs` as header-less CSV, web identifier first
pub fn write_csv<W: Write>(pairs: &[MappingPair], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    for pair in pairs {
        csv_writer
            .write_record([
                pair.web_identifier.as_deref().unwrap_or_default(),
                pair.pos_identifier.as_deref().unwrap_or_default(),
            ])
            .map_err(|e| Error::Io(e.into()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(pairs: &[MappingPair]) -> Result<String> {
    let mut out = Vec::new();
    write_csv(pairs, &mut out)?;
    String::from_utf8(out).map_err(|e| Error::Internal(format!("Export is not UTF-8: {}", e)))
}

/// Regenerate the mapping and write it to `path`
pub async fn export_to_path(store: &CatalogStore, path: &Path) -> Result<ExportSummary> {
    let pairs = export_mapping(store).await?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_csv(&pairs, File::create(path)?)?;

    info!(path = %path.display(), rows = pairs.len(), "Mapping exported");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: pairs.len(),
    })
}
