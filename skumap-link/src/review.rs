//! Duplicate-link review
//!
//! MERGED accepts the same POS or WEB identifier more than once. This lists
//! every identifier linked in more than one MERGED row so an operator can
//! decide whether the repeat was intended.

use std::collections::BTreeMap;

use serde::Serialize;
use skumap_common::{CatalogSide, CatalogStore, Result};

/// An identifier that occurs in several MERGED rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateLink {
    pub side: CatalogSide,
    pub identifier: String,
    /// Surrogate ids of the MERGED rows involved, ascending
    pub merged_ids: Vec<i64>,
}

/// POS duplicates first, then WEB, each ordered by identifier
pub async fn duplicate_links(store: &CatalogStore) -> Result<Vec<DuplicateLink>> {
    let merged = store.load_merged().await?;

    let mut seen: BTreeMap<(CatalogSide, String), Vec<i64>> = BTreeMap::new();
    for row in &merged {
        let sides = [
            (CatalogSide::Pos, &row.link.pos_sku),
            (CatalogSide::Web, &row.link.web_sku),
        ];
        for (side, identifier) in sides {
            if let Some(identifier) = identifier {
                seen.entry((side, identifier.clone())).or_default().push(row.id);
            }
        }
    }

    Ok(seen
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((side, identifier), merged_ids)| DuplicateLink {
            side,
            identifier,
            merged_ids,
        })
        .collect())
}
