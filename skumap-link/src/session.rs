//! Link session
//!
//! One operator's working state: the pairing buffer, the filtered view of
//! each catalog side, and where the stage/commit cycle stands. Selection
//! indexes refer to rows of the view currently shown for that side.

use chrono::{DateTime, Utc};
use serde::Serialize;
use skumap_common::db::Predicate;
use skumap_common::{CatalogRecord, CatalogSide, CatalogStore, Error, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::buffer::PairingBuffer;
use crate::filter::SearchRequest;
use crate::staging::{CommitReceipt, PreviewSnapshot, StagingCoordinator, StagingPhase};

/// Rows of one side under the filter that produced them
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub side: CatalogSide,
    pub filter: Predicate,
    pub rows: Vec<CatalogRecord>,
}

impl CatalogView {
    async fn load(store: &CatalogStore, side: CatalogSide, filter: Predicate) -> Result<Self> {
        let rows = store.load_catalog(side, &filter).await?;
        Ok(Self { side, filter, rows })
    }
}

#[derive(Debug)]
pub struct LinkSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    buffer: PairingBuffer,
    pos_view: CatalogView,
    web_view: CatalogView,
    phase: StagingPhase,
}

impl LinkSession {
    /// Start a session with an empty buffer and unfiltered views
    pub async fn open(store: &CatalogStore) -> Result<Self> {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            buffer: PairingBuffer::new(),
            pos_view: CatalogView::load(store, CatalogSide::Pos, Predicate::all()).await?,
            web_view: CatalogView::load(store, CatalogSide::Web, Predicate::all()).await?,
            phase: StagingPhase::Idle,
        };

        info!(session_id = %session.id, "Link session opened");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn buffer(&self) -> &PairingBuffer {
        &self.buffer
    }

    pub fn phase(&self) -> StagingPhase {
        self.phase
    }

    pub fn view(&self, side: CatalogSide) -> &CatalogView {
        match side {
            CatalogSide::Pos => &self.pos_view,
            CatalogSide::Web => &self.web_view,
        }
    }

    fn view_mut(&mut self, side: CatalogSide) -> &mut CatalogView {
        match side {
            CatalogSide::Pos => &mut self.pos_view,
            CatalogSide::Web => &mut self.web_view,
        }
    }

    /// Narrow `side`'s view; an invalid search leaves the view unchanged
    pub async fn search(
        &mut self,
        store: &CatalogStore,
        side: CatalogSide,
        request: &SearchRequest,
    ) -> Result<&CatalogView> {
        let filter = request.predicate(side)?;
        let view = CatalogView::load(store, side, filter).await?;
        debug!(side = %side, rows = view.rows.len(), "Search applied");

        let slot = self.view_mut(side);
        *slot = view;
        Ok(&*slot)
    }

    /// Restore the unfiltered view of `side`
    pub async fn reset(&mut self, store: &CatalogStore, side: CatalogSide) -> Result<&CatalogView> {
        let view = CatalogView::load(store, side, Predicate::all()).await?;
        let slot = self.view_mut(side);
        *slot = view;
        Ok(&*slot)
    }

    /// Re-run both views' filters, e.g. after re-ingestion
    pub async fn refresh(&mut self, store: &CatalogStore) -> Result<()> {
        for side in CatalogSide::ALL {
            let filter = self.view(side).filter.clone();
            *self.view_mut(side) = CatalogView::load(store, side, filter).await?;
        }
        Ok(())
    }

    /// Put row `row_index` of `side`'s current view into the buffer
    pub fn select(&mut self, side: CatalogSide, row_index: usize) -> Result<&PairingBuffer> {
        let view = self.view(side);
        let record = view.rows.get(row_index).cloned().ok_or_else(|| {
            Error::NotFound(format!(
                "{} row {} (view has {} rows)",
                side,
                row_index,
                view.rows.len()
            ))
        })?;

        self.buffer.set_side(&record);
        Ok(&self.buffer)
    }

    /// Stage the buffer through `staging`
    pub async fn stage(&mut self, staging: &StagingCoordinator) -> Result<PreviewSnapshot> {
        let snapshot = staging.stage(&self.buffer).await?;
        self.phase = StagingPhase::Staged;
        Ok(snapshot)
    }

    /// Commit the reviewed preview through `staging`
    pub async fn commit(
        &mut self,
        staging: &StagingCoordinator,
        reviewed: &PreviewSnapshot,
    ) -> Result<CommitReceipt> {
        let receipt = staging.commit(reviewed).await?;
        self.phase = StagingPhase::Committed;
        Ok(receipt)
    }
}
