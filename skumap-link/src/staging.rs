//! Staging Coordinator
//!
//! Two transitions over the store:
//! - **Stage**: buffer snapshot replaces the PREVIEW row
//! - **Commit**: the reviewed PREVIEW rows are appended to MERGED
//!
//! Commit takes the preview the operator reviewed and checks its revision
//! against PREVIEW inside the same transaction. The revision is a SHA-256
//! of the stored values with prices hashed by bit pattern; only that string
//! has to survive a client round trip. PREVIEW is kept after a commit, so
//! committing the same snapshot again appends it again; that is history,
//! not an error. Either transition is all-or-nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skumap_common::{CatalogStore, CatalogTable, Error, LinkRow, Result};
use tracing::info;

use crate::buffer::PairingBuffer;

/// Where the session is in the stage/commit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingPhase {
    #[default]
    Idle,
    Staged,
    Committed,
}

/// The PREVIEW rows an operator reviewed before committing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewSnapshot {
    pub rows: Vec<LinkRow>,
    /// Hex SHA-256 of `rows`; the only part commit compares
    pub revision: String,
}

impl PreviewSnapshot {
    pub fn from_rows(rows: Vec<LinkRow>) -> Self {
        let revision = preview_revision(&rows);
        Self { rows, revision }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Digest of the exact row values, prices by bit pattern
fn preview_revision(rows: &[LinkRow]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        for text in [&row.pos_sku, &row.web_sku, &row.pos_name, &row.web_name] {
            match text {
                Some(v) => {
                    hasher.update([1u8]);
                    hasher.update((v.len() as u64).to_le_bytes());
                    hasher.update(v.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        for price in [row.pos_price, row.web_price] {
            match price {
                Some(p) => {
                    hasher.update([1u8]);
                    hasher.update(p.to_bits().to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Result of a successful commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitReceipt {
    /// Surrogate ids assigned to the appended rows, in order
    pub merged_ids: Vec<i64>,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StagingCoordinator {
    store: CatalogStore,
}

impl StagingCoordinator {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Replace PREVIEW with the buffer's current contents
    ///
    /// Staging the same buffer twice yields the same PREVIEW. MERGED is
    /// never touched.
    pub async fn stage(&self, buffer: &PairingBuffer) -> Result<PreviewSnapshot> {
        if buffer.is_empty() {
            return Err(Error::EmptyPairing);
        }

        let snapshot = PreviewSnapshot::from_rows(vec![buffer.to_link_row()]);

        self.store
            .replace_table(CatalogTable::Preview, &LinkRow::row_set(&snapshot.rows))
            .await?;

        info!(rows = snapshot.rows.len(), "Pairing staged");
        Ok(snapshot)
    }

    /// Current PREVIEW contents
    pub async fn preview(&self) -> Result<PreviewSnapshot> {
        Ok(PreviewSnapshot::from_rows(self.store.load_preview().await?))
    }

    /// Append `reviewed` to MERGED if it still matches PREVIEW
    pub async fn commit(&self, reviewed: &PreviewSnapshot) -> Result<CommitReceipt> {
        let mut tx = self.store.begin().await?;

        let current = PreviewSnapshot::from_rows(tx.load_preview().await?);
        if current.is_empty() {
            return Err(Error::NothingStaged);
        }
        if current.revision != reviewed.revision {
            return Err(Error::StalePreview);
        }

        let merged_ids = tx
            .append_rows(CatalogTable::Merged, &LinkRow::row_set(&current.rows))
            .await?;
        tx.commit().await?;

        info!(rows = merged_ids.len(), merged_ids = ?merged_ids, "Preview committed");

        Ok(CommitReceipt {
            merged_ids,
            committed_at: Utc::now(),
        })
    }
}
