//! dbf-db - Database layer for dbframe
//!
//! This crate provides the `Database` trait, its MySQL implementation, the
//! connection/table/ops helpers, and conversion between query results and
//! Arrow record batches.

pub mod chunks;
pub mod database;
pub mod error;
pub mod frame;
pub mod mysql_backend;
pub mod ops;
pub mod result;
pub mod table;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use chunks::ChunkReader;
pub use database::{ensure_database, MySqlDatabase};
pub use error::{DbError, DbResult};
pub use mysql_backend::MySqlBackend;
pub use ops::MySqlOps;
pub use result::{ColumnKind, ColumnMeta, ResultSet};
pub use table::{ColumnTypes, IfExists, MySqlTable, TableOptions};
pub use traits::Database;
