//! Error types for dbf-db

use dbf_sql::KeyKind;
use thiserror::Error;

/// MySQL server error codes that get their own variant
const ER_DUP_ENTRY: u16 = 1062;
const ER_DUP_ENTRY_WITH_KEY_NAME: u16 = 1586;
const ER_NO_SUCH_TABLE: u16 = 1146;
const ER_TABLE_EXISTS_ERROR: u16 = 1050;
const ER_ACCESS_DENIED_ERROR: u16 = 1045;
const ER_BAD_DB_ERROR: u16 = 1049;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Table already exists (D004)
    #[error("[D004] Table '{0}' already exists")]
    TableExists(String),

    /// Column not found (D005)
    #[error("[D005] Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Unique or primary key violated by the driver (D006)
    #[error("[D006] Integrity constraint violated: {0}")]
    IntegrityViolation(String),

    /// Key could not be added because the data holds duplicates (D007)
    #[error(
        "[D007] Duplicate entries in column {columns}, remove_duplicates should be true \
         in case of duplicates before adding a {kind}"
    )]
    DuplicateEntries { kind: KeyKind, columns: String },

    /// Arrow type with no MySQL counterpart (D008)
    #[error("[D008] Unsupported column type for '{column}': {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// Value could not be converted between driver and frame (D009)
    #[error("[D009] Value conversion failed for column '{column}': {message}")]
    Conversion { column: String, message: String },

    /// Mutex poisoned (D010)
    #[error("[D010] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Invalid argument (D011)
    #[error("[D011] Invalid argument: {0}")]
    InvalidArgument(String),

    /// Statement assembly failed (D012)
    #[error("[D012] {0}")]
    Sql(#[from] dbf_sql::SqlError),

    /// Core validation failed (D013)
    #[error("[D013] {0}")]
    Core(#[from] dbf_core::CoreError),

    /// Arrow error while building or concatenating frames (D014)
    #[error("[D014] Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a driver error, attaching the statement for execution failures.
    pub(crate) fn from_mysql(err: mysql::Error, sql: &str) -> Self {
        match err {
            mysql::Error::MySqlError(server) => match server.code {
                ER_DUP_ENTRY | ER_DUP_ENTRY_WITH_KEY_NAME => {
                    DbError::IntegrityViolation(server.message)
                }
                ER_NO_SUCH_TABLE => DbError::TableNotFound(server.message),
                ER_TABLE_EXISTS_ERROR => DbError::TableExists(server.message),
                ER_ACCESS_DENIED_ERROR | ER_BAD_DB_ERROR => {
                    DbError::ConnectionError(server.message)
                }
                _ => DbError::ExecutionError(format!("{}: {}", server, sql)),
            },
            mysql::Error::IoError(e) => DbError::ConnectionError(e.to_string()),
            mysql::Error::DriverError(e) => DbError::ConnectionError(e.to_string()),
            mysql::Error::UrlError(e) => DbError::ConnectionError(e.to_string()),
            other => DbError::ExecutionError(format!("{}: {}", other, sql)),
        }
    }
}
