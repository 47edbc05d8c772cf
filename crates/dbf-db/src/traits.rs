//! Database trait definition

use crate::error::DbResult;
use crate::result::ResultSet;
use async_trait::async_trait;

/// Database abstraction used by the connection and table helpers
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a statement, returning affected rows. Any result set is discarded.
    async fn execute(&self, sql: &str) -> DbResult<u64>;

    /// Run a query and collect every row with column metadata
    async fn query(&self, sql: &str) -> DbResult<ResultSet>;

    /// Database the session is scoped to, if any
    fn database_name(&self) -> Option<&str>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
