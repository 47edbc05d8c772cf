//! dbf-sql - SQL layer for dbframe
//!
//! This crate assembles the MySQL statements issued by the table helpers
//! and validates caller-supplied predicate fragments with sqlparser-rs
//! before they are interpolated into a query.

pub mod error;
pub mod filter;
pub mod predicate;
pub mod statements;

pub use error::{SqlError, SqlResult};
pub use filter::{Filter, Selection, SortKey, SortOrder, SortSpec};
pub use predicate::Predicate;
pub use statements::{JoinKind, KeyColumn, KeyKind, OnConflict};
