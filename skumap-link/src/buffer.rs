//! Pairing Buffer
//!
//! Holds at most one candidate per catalog side. Selecting a record
//! overwrites that side's three fields and leaves the other side alone.
//! Partial pairs are valid and become partial PREVIEW rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skumap_common::{CatalogRecord, CatalogSide, CellValue, LinkRow};

/// The six buffer slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferField {
    PosIdentifier,
    PosName,
    PosPrice,
    WebIdentifier,
    WebName,
    WebPrice,
}

impl BufferField {
    pub const ALL: [BufferField; 6] = [
        BufferField::PosIdentifier,
        BufferField::PosName,
        BufferField::PosPrice,
        BufferField::WebIdentifier,
        BufferField::WebName,
        BufferField::WebPrice,
    ];

    /// Identifier, name and price slots of `side`
    pub fn for_side(side: CatalogSide) -> [BufferField; 3] {
        match side {
            CatalogSide::Pos => {
                [BufferField::PosIdentifier, BufferField::PosName, BufferField::PosPrice]
            }
            CatalogSide::Web => {
                [BufferField::WebIdentifier, BufferField::WebName, BufferField::WebPrice]
            }
        }
    }
}

/// Buffer contents with unset fields as explicit nulls
pub type BufferSnapshot = BTreeMap<BufferField, Option<CellValue>>;

#[derive(Debug, Clone, PartialEq)]
pub struct PairingBuffer {
    fields: BufferSnapshot,
}

impl Default for PairingBuffer {
    fn default() -> Self {
        Self {
            fields: BufferField::ALL.into_iter().map(|f| (f, None)).collect(),
        }
    }
}

impl PairingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the fields of the record's side
    pub fn set_side(&mut self, record: &CatalogRecord) {
        let [identifier, name, price] = BufferField::for_side(record.side);
        self.fields.insert(identifier, Some(CellValue::Text(record.identifier.clone())));
        self.fields.insert(name, Some(CellValue::Text(record.name.clone())));
        self.fields.insert(price, Some(CellValue::Real(record.price)));
    }

    pub fn get(&self, field: BufferField) -> Option<&CellValue> {
        self.fields.get(&field)?.as_ref()
    }

    pub fn is_side_set(&self, side: CatalogSide) -> bool {
        BufferField::for_side(side).iter().any(|f| self.get(*f).is_some())
    }

    /// True while neither side has been selected
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Option::is_none)
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        self.fields.clone()
    }

    /// Project onto the PREVIEW/MERGED row shape
    pub fn to_link_row(&self) -> LinkRow {
        let text = |f: BufferField| self.get(f).and_then(CellValue::as_text).map(str::to_string);
        let real = |f: BufferField| self.get(f).and_then(CellValue::as_f64);

        LinkRow {
            pos_sku: text(BufferField::PosIdentifier),
            web_sku: text(BufferField::WebIdentifier),
            pos_name: text(BufferField::PosName),
            web_name: text(BufferField::WebName),
            pos_price: real(BufferField::PosPrice),
            web_price: real(BufferField::WebPrice),
        }
    }
}
