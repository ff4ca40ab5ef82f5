//! Filter Engine
//!
//! Builds predicates over a catalog side's identifier or name column. Terms
//! are bound as data and match literally: `%` and `_` in a term are not
//! wildcards. Matching is case-insensitive for ASCII letters only. An empty
//! search is an error, never an unfiltered query.

use serde::Deserialize;
use skumap_common::db::Predicate;
use skumap_common::{CatalogSide, Error, Result};

/// Maximum number of name terms in one search
pub const MAX_NAME_TERMS: usize = 3;

/// Predicate matching rows whose identifier contains `substring`
pub fn build_identifier_filter(side: CatalogSide, substring: &str) -> Result<Predicate> {
    let substring = substring.trim();
    if substring.is_empty() {
        return Err(Error::EmptyBarcode);
    }

    Ok(Predicate::all().and_contains(side.identifier_column(), substring))
}

/// Predicate matching rows whose name contains every non-empty term
///
/// Empty terms impose no constraint, so fewer than three terms still work.
pub fn build_name_filter<S: AsRef<str>>(side: CatalogSide, terms: &[S]) -> Result<Predicate> {
    if terms.len() > MAX_NAME_TERMS {
        return Err(Error::TooManySearchTerms {
            given: terms.len(),
            max: MAX_NAME_TERMS,
        });
    }

    let predicate = terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .fold(Predicate::all(), |p, term| p.and_contains(side.name_column(), term));

    if predicate.is_all() {
        return Err(Error::EmptySearchTerms);
    }

    Ok(predicate)
}

/// An operator search event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchRequest {
    Identifier { substring: String },
    Name { terms: Vec<String> },
}

impl SearchRequest {
    /// Validate and translate into a predicate for `side`
    pub fn predicate(&self, side: CatalogSide) -> Result<Predicate> {
        match self {
            SearchRequest::Identifier { substring } => build_identifier_filter(side, substring),
            SearchRequest::Name { terms } => build_name_filter(side, terms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_filter_targets_side_column() {
        let pos = build_identifier_filter(CatalogSide::Pos, "12").unwrap();
        assert_eq!(pos.clauses()[0].column, "SKU_P");
        assert_eq!(pos.clauses()[0].value, "12");

        let web = build_identifier_filter(CatalogSide::Web, "W").unwrap();
        assert_eq!(web.clauses()[0].column, "SKU_W");
    }

    #[test]
    fn test_empty_identifier_is_empty_barcode() {
        assert!(matches!(build_identifier_filter(CatalogSide::Pos, ""), Err(Error::EmptyBarcode)));
        assert!(matches!(
            build_identifier_filter(CatalogSide::Pos, "   "),
            Err(Error::EmptyBarcode)
        ));
    }

    #[test]
    fn test_name_filter_skips_empty_terms() {
        let predicate = build_name_filter(CatalogSide::Web, &["red", "shirt", ""]).unwrap();
        let values: Vec<&str> = predicate.clauses().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["red", "shirt"]);
        assert!(predicate.clauses().iter().all(|c| c.column == "NAME_W"));
    }

    #[test]
    fn test_all_empty_terms_rejected() {
        let err = build_name_filter(CatalogSide::Pos, &["", " ", ""]).unwrap_err();
        assert!(matches!(err, Error::EmptySearchTerms));
        assert!(err.is_empty_search());

        let none: [&str; 0] = [];
        assert!(matches!(build_name_filter(CatalogSide::Pos, &none), Err(Error::EmptySearchTerms)));
    }

    #[test]
    fn test_more_than_three_terms_rejected() {
        let err = build_name_filter(CatalogSide::Pos, &["a", "b", "c", "d"]).unwrap_err();
        assert!(matches!(err, Error::TooManySearchTerms { given: 4, max: 3 }));
    }

    #[test]
    fn test_search_request_json() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"kind":"name","terms":["red","shirt"]}"#).unwrap();
        assert_eq!(request.predicate(CatalogSide::Pos).unwrap().clauses().len(), 2);
    }
}
