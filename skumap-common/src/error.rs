//! Common error types for SKUMAP
//!
//! Every variant is recoverable at the operator boundary: it is reported once
//! for the action that triggered it and the session carries on.

use thiserror::Error;

/// Common result type for SKUMAP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SKUMAP crates
#[derive(Error, Debug)]
pub enum Error {
    /// Store unreachable, locked, or write rejected (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Row set or on-disk table does not carry the expected column list
    #[error(
        "Column mismatch on {table}: columns do not match (expected [{}], found [{}]), rearrange columns",
        .expected.join(", "),
        .actual.join(", ")
    )]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Identifier (barcode) search submitted without a search string
    #[error("No bar code entered")]
    EmptyBarcode,

    /// Name search submitted with every term empty
    #[error("No text entered")]
    EmptySearchTerms,

    /// Name search submitted with more terms than the engine accepts
    #[error("Too many search terms: {given} (at most {max})")]
    TooManySearchTerms { given: usize, max: usize },

    /// Stage requested while neither side of the buffer holds a selection
    #[error("Nothing selected: pick a POS or WEB row before staging")]
    EmptyPairing,

    /// Commit requested while the PREVIEW table is empty
    #[error("Nothing staged: stage a pairing before committing")]
    NothingStaged,

    /// Commit snapshot differs from what PREVIEW currently holds
    #[error("Preview changed since it was reviewed; reload the preview and try again")]
    StalePreview,

    /// Source feed could not be read or decoded
    #[error("Feed error: {0}")]
    Feed(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for both kinds of empty search (barcode and name terms)
    pub fn is_empty_search(&self) -> bool {
        matches!(self, Error::EmptyBarcode | Error::EmptySearchTerms)
    }

    /// Only persistence failures are worth re-issuing unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}
