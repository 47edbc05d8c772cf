//! Error types for dbf-sql

use thiserror::Error;

/// SQL assembly and validation errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Predicate parse error (S001)
    #[error("[S001] Invalid predicate '{predicate}': {message}")]
    InvalidPredicate { predicate: String, message: String },

    /// Empty predicate (S002)
    #[error("[S002] Predicate is empty")]
    EmptyPredicate,

    /// Empty column list (S003)
    #[error("[S003] {context} requires at least one column")]
    EmptyColumns { context: &'static str },

    /// Invalid column name (S004)
    #[error("[S004] Invalid column name '{0}'")]
    InvalidColumn(String),

    /// Invalid sort order (S005)
    #[error("[S005] Invalid sort order '{0}', expected asc, ascending, desc or descending")]
    InvalidSortOrder(String),

    /// Invalid size argument (S006)
    #[error("[S006] {name} must be greater than zero")]
    InvalidSize { name: &'static str },

    /// Row width does not match column count (S007)
    #[error("[S007] Row {row} has {actual} values but {expected} columns were given")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Identifier rejected by dbf-core (S008)
    #[error("[S008] {0}")]
    Core(#[from] dbf_core::CoreError),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
