//! Parameterized row predicates
//!
//! Search terms are always bound as parameters. `LIKE` metacharacters in a
//! term (`%`, `_`, `\`) are escaped, so a term matches literally. Matching
//! follows SQLite `LIKE`: case-insensitive for ASCII letters, case-sensitive
//! for everything else.

use serde::Serialize;

/// Escape character used in generated `LIKE ... ESCAPE` clauses
const LIKE_ESCAPE: char = '\\';

/// Column must contain `value` as a substring
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub column: String,
    pub value: String,
}

/// Conjunction of clauses; no clauses selects every row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Predicate matching every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and_contains(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render a `WHERE` fragment (empty when matching all rows) plus its bind values
    ///
    /// Column names are emitted verbatim; callers validate them against the
    /// table schema first.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        if self.clauses.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut fragments = Vec::with_capacity(self.clauses.len());
        let mut binds = Vec::with_capacity(self.clauses.len());

        for clause in &self.clauses {
            fragments.push(format!("{} LIKE ? ESCAPE '{}'", clause.column, LIKE_ESCAPE));
            binds.push(format!("%{}%", escape_like(&clause.value)));
        }

        (format!(" WHERE {}", fragments.join(" AND ")), binds)
    }
}

/// Escape `LIKE` metacharacters so the value matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
