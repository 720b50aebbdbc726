//! Error taxonomy for schema graph operations
//!
//! Every variant is fatal to the operation that raised it. None of them are
//! retried: they describe structurally inconsistent input, not transient
//! conditions.

use std::fmt;

/// Kind of entity a failed lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    Column,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Errors raised while building, repairing or querying a schema graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A table or column lookup failed
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    /// A constraint definition did not match the foreign key grammar
    #[error("can not parse foreign key: {def}")]
    Parse { def: String },

    /// An unqualified table name matched zero or several qualified tables
    #[error("can not detect table name: {name} (candidates: {candidates:?})")]
    AmbiguousReference { name: String, candidates: Vec<String> },

    /// Cross-references of a schema snapshot are inconsistent
    #[error("invalid schema: {0}")]
    Validation(String),
}

impl SchemaError {
    /// Table lookup failure
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Table,
            name: name.into(),
        }
    }

    /// Column lookup failure, reported as `table.column`
    pub fn column_not_found(table: &str, column: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Column,
            name: format!("{}.{}", table, column),
        }
    }
}

/// Convenience alias for results of schema graph operations
pub type Result<T> = std::result::Result<T, SchemaError>;
