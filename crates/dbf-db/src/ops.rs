//! Ops helper: one session handing out table helpers, plus cross-table reads

use crate::database::MySqlDatabase;
use crate::error::DbResult;
use crate::frame;
use crate::table::{MySqlTable, TableOptions};
use arrow::record_batch::RecordBatch;
use dbf_core::{ConnectionParams, TableName};
use dbf_sql::statements;
use dbf_sql::JoinKind;

/// Entry point composing the connection and table helpers
pub struct MySqlOps {
    database: MySqlDatabase,
}

impl MySqlOps {
    pub async fn connect(params: ConnectionParams, options: TableOptions) -> DbResult<Self> {
        Ok(Self::new(MySqlDatabase::connect(params, options).await?))
    }

    pub fn new(database: MySqlDatabase) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &MySqlDatabase {
        &self.database
    }

    /// Table helper sharing this session
    pub fn table(&self, name: &str) -> DbResult<MySqlTable> {
        MySqlTable::new(&self.database, name)
    }

    /// Join two tables on column pairs `(left_col, right_col)` and read the result
    pub async fn join_tables(
        &self,
        left: &str,
        right: &str,
        on: &[(String, String)],
        kind: JoinKind,
    ) -> DbResult<RecordBatch> {
        let left = TableName::new(left)?;
        let right = TableName::new(right)?;
        let sql = statements::join(&left, &right, on, kind)?;
        let result = self.database.query(&sql).await?;
        frame::result_to_batch(&result)
    }
}
