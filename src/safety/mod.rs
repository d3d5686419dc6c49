//! Statement validation module.
//!
//! Parses SQL to check that registered statements are single read-only
//! queries and to count their positional placeholders.

mod parser;

pub use parser::SqlValidator;

use std::fmt;

/// The kind of top-level statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    /// A query (SELECT, set operation, VALUES) with no data-modifying parts.
    Query,
    /// A query whose body or CTEs modify data.
    ModifyingQuery,
    /// Any other statement, named by its leading keyword.
    Other(String),
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "SELECT"),
            Self::ModifyingQuery => write!(f, "data-modifying query"),
            Self::Other(keyword) => write!(f, "{keyword}"),
        }
    }
}

/// What the validator learned about one SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementProfile {
    /// The type of the (single) statement.
    pub statement_type: StatementType,
    /// Number of positional `?` placeholders.
    pub placeholders: usize,
}

impl StatementProfile {
    /// Returns true if the statement only reads data.
    pub fn is_read_only(&self) -> bool {
        self.statement_type == StatementType::Query
    }
}
