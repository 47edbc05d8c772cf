//! Connection helper: open a session and make sure the target database exists

use crate::error::DbResult;
use crate::mysql_backend::MySqlBackend;
use crate::result::ResultSet;
use crate::table::TableOptions;
use crate::traits::Database;
use dbf_core::{flatten_rows, ConnectionParams};
use dbf_sql::statements;
use std::sync::Arc;

/// A session scoped to one database, created on connect when missing.
pub struct MySqlDatabase {
    params: ConnectionParams,
    backend: Arc<dyn Database>,
    options: TableOptions,
}

impl MySqlDatabase {
    /// Connect to the server, create `params.database` if absent, then open
    /// a session scoped to it.
    pub async fn connect(params: ConnectionParams, options: TableOptions) -> DbResult<Self> {
        let server = MySqlBackend::connect(&params, None)?;
        ensure_database(&server, &params.database).await?;
        drop(server);

        let backend = MySqlBackend::connect(&params, Some(&params.database))?;
        Ok(Self::from_backend(params, Arc::new(backend), options))
    }

    /// Wrap an already-open backend without touching the server
    pub fn from_backend(
        params: ConnectionParams,
        backend: Arc<dyn Database>,
        options: TableOptions,
    ) -> Self {
        Self {
            params,
            backend,
            options,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// The live session, for ad hoc statements
    pub fn backend(&self) -> Arc<dyn Database> {
        Arc::clone(&self.backend)
    }

    /// Execute an ad hoc statement on the session
    pub async fn execute(&self, sql: &str) -> DbResult<u64> {
        self.backend.execute(sql).await
    }

    /// Run an ad hoc query on the session
    pub async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        self.backend.query(sql).await
    }

    /// Names of every database visible to the session's user
    pub async fn list_databases(&self) -> DbResult<Vec<String>> {
        list_databases(self.backend.as_ref()).await
    }
}

async fn list_databases(server: &dyn Database) -> DbResult<Vec<String>> {
    let result = server.query(&statements::show_databases()).await?;
    let names = result
        .rows
        .iter()
        .map(|row| row.iter().filter_map(|v| v.as_text()).collect::<Vec<_>>());
    Ok(flatten_rows(names))
}

/// Create `name` unless `SHOW DATABASES` already lists it.
///
/// Names are compared case-insensitively, so `Sales` and `sales` count as the
/// same database whatever `lower_case_table_names` the server runs with.
/// Returns `true` when the database was created.
pub async fn ensure_database(server: &dyn Database, name: &str) -> DbResult<bool> {
    let existing = list_databases(server).await?;
    if existing.iter().any(|db| db.eq_ignore_ascii_case(name)) {
        log::debug!("Database {} already exists", name);
        return Ok(false);
    }

    server.execute(&statements::create_database(name)).await?;
    log::info!("Created database {}", name);
    Ok(true)
}

#[cfg(test)]
#[path = "database_test.rs"]
mod tests;
