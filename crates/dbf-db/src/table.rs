//! Table helper: dataframe-style operations over one MySQL table

use crate::chunks::{check_chunk_size, ChunkReader};
use crate::database::MySqlDatabase;
use crate::error::{DbError, DbResult};
use crate::frame;
use crate::traits::Database;
use arrow::record_batch::RecordBatch;
use dbf_core::{Config, ConnectionParams, TableName};
use dbf_sql::statements::{self, KeyColumn, KeyKind, OnConflict};
use dbf_sql::{Filter, SortSpec};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Position of the `Key` column in `SHOW FIELDS` output
const SHOW_FIELDS_KEY: usize = 3;

/// Write tuning shared by every table of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Maximum rows per INSERT statement
    pub insert_batch_size: usize,
    /// Prefix length for text columns that take part in a key
    pub key_prefix_length: u32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            insert_batch_size: 1000,
            key_prefix_length: 255,
        }
    }
}

impl From<&Config> for TableOptions {
    fn from(config: &Config) -> Self {
        Self {
            insert_batch_size: config.insert_batch_size,
            key_prefix_length: config.key_prefix_length,
        }
    }
}

/// What a write does when the table already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IfExists {
    /// Refuse to write
    Fail,
    /// Drop and recreate from the frame's schema
    Replace,
    /// Insert into the existing table
    #[default]
    Append,
}

impl FromStr for IfExists {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(IfExists::Fail),
            "replace" => Ok(IfExists::Replace),
            "append" => Ok(IfExists::Append),
            other => Err(DbError::InvalidArgument(format!(
                "if_exists must be fail, replace or append, got '{other}'"
            ))),
        }
    }
}

/// Declared column types as reported by `SHOW FIELDS`, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes(Vec<(String, String)>);

impl ColumnTypes {
    /// Declared type of `column` (MySQL column names are case-insensitive)
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, ty)| ty.as_str())
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dataframe-style access to a single table.
///
/// Shares the session of the [`MySqlDatabase`] it was built from.
pub struct MySqlTable {
    name: TableName,
    backend: Arc<dyn Database>,
    options: TableOptions,
    primary_key_columns: Option<Vec<String>>,
    unique_columns: Option<Vec<String>>,
}

impl fmt::Debug for MySqlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlTable")
            .field("name", &self.name)
            .field("backend", &self.backend.db_type())
            .field("primary_key_columns", &self.primary_key_columns)
            .field("unique_columns", &self.unique_columns)
            .finish()
    }
}

impl MySqlTable {
    /// Bind a table on an existing session
    pub fn new(database: &MySqlDatabase, name: &str) -> DbResult<Self> {
        Ok(Self::with_backend(
            database.backend(),
            TableName::new(name)?,
            database.options().clone(),
        ))
    }

    /// Connect (creating the database if needed) and bind `name`
    pub async fn connect(
        params: ConnectionParams,
        name: &str,
        options: TableOptions,
    ) -> DbResult<Self> {
        let database = MySqlDatabase::connect(params, options).await?;
        Self::new(&database, name)
    }

    pub fn with_backend(backend: Arc<dyn Database>, name: TableName, options: TableOptions) -> Self {
        Self {
            name,
            backend,
            options,
            primary_key_columns: None,
            unique_columns: None,
        }
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Columns of the last primary key added through this helper
    pub fn primary_key_columns(&self) -> Option<&[String]> {
        self.primary_key_columns.as_deref()
    }

    /// Columns of the last unique key added through this helper
    pub fn unique_columns(&self) -> Option<&[String]> {
        self.unique_columns.as_deref()
    }

    /// Whether the table exists in the session's database
    pub async fn exists(&self) -> DbResult<bool> {
        let result = self.backend.query(&statements::table_exists(&self.name)).await?;
        Ok(result.scalar_count().unwrap_or(0) > 0)
    }

    /// Bulk-append a frame, creating the table from the frame's schema if needed.
    ///
    /// Returns the number of frame rows written.
    pub async fn populate_table(&self, frame: &RecordBatch, if_exists: IfExists) -> DbResult<u64> {
        self.write(frame, if_exists, OnConflict::Fail).await
    }

    /// Like [`populate_table`](Self::populate_table), but rows whose key already
    /// exists are updated column-wise instead of inserted.
    pub async fn update_table(&self, frame: &RecordBatch, if_exists: IfExists) -> DbResult<u64> {
        self.write(frame, if_exists, OnConflict::UpdateAll).await
    }

    async fn write(
        &self,
        frame: &RecordBatch,
        if_exists: IfExists,
        on_conflict: OnConflict,
    ) -> DbResult<u64> {
        let exists = self.exists().await?;
        match (exists, if_exists) {
            (true, IfExists::Fail) => return Err(DbError::TableExists(self.name.to_string())),
            (true, IfExists::Replace) => {
                self.backend
                    .execute(&statements::drop_table(&self.name))
                    .await?;
                self.create_from_schema(frame).await?;
            }
            (true, IfExists::Append) => {}
            (false, _) => self.create_from_schema(frame).await?,
        }

        let (columns, rows) = frame::batch_to_rows(frame)?;
        for chunk in rows.chunks(self.options.insert_batch_size.max(1)) {
            let sql = statements::insert(&self.name, &columns, chunk, on_conflict)?;
            self.backend.execute(&sql).await?;
        }
        log::debug!("Wrote {} rows to {}", rows.len(), self.name);
        Ok(rows.len() as u64)
    }

    async fn create_from_schema(&self, frame: &RecordBatch) -> DbResult<()> {
        let definitions = frame::column_definitions(&frame.schema())?;
        let sql = statements::create_table(&self.name, &definitions)?;
        self.backend.execute(&sql).await?;
        Ok(())
    }

    /// Column name to declared SQL type, in table order
    pub async fn get_data_type(&self) -> DbResult<ColumnTypes> {
        let result = self.backend.query(&statements::show_fields(&self.name)).await?;
        let types = result
            .rows
            .iter()
            .filter_map(|row| {
                let name = row.first()?.as_text()?;
                let ty = row.get(1)?.as_text()?;
                Some((name, ty))
            })
            .collect();
        Ok(ColumnTypes(types))
    }

    /// Rebuild the table keeping one arbitrary row per distinct `columns` value.
    ///
    /// Not atomic: if the process dies mid-way the original survives either
    /// under its own name or as `old_source_<table>`.
    pub async fn remove_duplicates(&self, columns: &[String]) -> DbResult<()> {
        log::warn!(
            "Removing duplicate entries from columns {} of {}",
            columns.join(","),
            self.name
        );
        let types = self.get_data_type().await?;
        self.require_columns(&types, columns)?;

        for sql in statements::dedup(&self.name, columns, &types.names())? {
            self.backend.execute(&sql).await?;
        }
        Ok(())
    }

    /// Add a (composite) primary key, optionally de-duplicating first
    pub async fn set_primary_key(
        &mut self,
        columns: &[String],
        remove_duplicates: bool,
    ) -> DbResult<()> {
        self.set_key(KeyKind::Primary, columns, remove_duplicates)
            .await?;
        self.primary_key_columns = Some(columns.to_vec());
        Ok(())
    }

    /// Add a (composite) unique key, optionally de-duplicating first
    pub async fn set_unique_keys(
        &mut self,
        columns: &[String],
        remove_duplicates: bool,
    ) -> DbResult<()> {
        self.set_key(KeyKind::Unique, columns, remove_duplicates)
            .await?;
        self.unique_columns = Some(columns.to_vec());
        Ok(())
    }

    async fn set_key(
        &self,
        kind: KeyKind,
        columns: &[String],
        remove_duplicates: bool,
    ) -> DbResult<()> {
        if remove_duplicates {
            self.remove_duplicates(columns).await?;
        }
        let types = self.get_data_type().await?;
        self.require_columns(&types, columns)?;

        let key_columns: Vec<KeyColumn> = columns
            .iter()
            .map(|c| KeyColumn {
                name: c.clone(),
                prefix: types
                    .get(c)
                    .filter(|ty| ty.to_ascii_lowercase().contains("text"))
                    .map(|_| self.options.key_prefix_length),
            })
            .collect();
        let sql = statements::add_key(&self.name, kind, &key_columns)?;

        match self.backend.execute(&sql).await {
            Ok(_) => Ok(()),
            Err(DbError::IntegrityViolation(_)) => Err(DbError::DuplicateEntries {
                kind,
                columns: key_columns
                    .iter()
                    .map(KeyColumn::to_sql)
                    .collect::<Vec<_>>()
                    .join(","),
            }),
            Err(e) => Err(e),
        }
    }

    fn require_columns(&self, types: &ColumnTypes, columns: &[String]) -> DbResult<()> {
        match columns.iter().find(|c| types.get(c).is_none()) {
            Some(missing) => Err(DbError::ColumnNotFound {
                table: self.name.to_string(),
                column: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Issue `SELECT * ... ORDER BY` on the session.
    ///
    /// The result is discarded and storage order is unchanged; read with a
    /// sorted [`Filter`] to get ordered rows back.
    pub async fn sort_table(&self, spec: &SortSpec) -> DbResult<()> {
        self.backend
            .execute(&statements::sort(&self.name, spec))
            .await?;
        Ok(())
    }

    /// Read the whole table into one frame
    pub async fn read_table(&self) -> DbResult<RecordBatch> {
        let result = self.backend.query(&statements::select_all(&self.name)).await?;
        frame::result_to_batch(&result)
    }

    /// Read the whole table lazily in frames of at most `chunk_size` rows.
    ///
    /// Chunks come back in primary-key order (every column in turn when the
    /// table has no primary key), so together they hold each row exactly once.
    pub async fn read_table_chunks(&self, chunk_size: usize) -> DbResult<ChunkReader> {
        self.table_filter_chunks(&Filter::new(), chunk_size).await
    }

    /// Read the rows matching `filter` into one frame
    pub async fn table_filter(&self, filter: &Filter) -> DbResult<RecordBatch> {
        let result = self
            .backend
            .query(&statements::select(&self.name, filter))
            .await?;
        frame::result_to_batch(&result)
    }

    /// Read the rows matching `filter` lazily in frames of at most `chunk_size` rows.
    ///
    /// The filter's ORDER BY is extended with the stable order of
    /// [`read_table_chunks`](Self::read_table_chunks) to break ties.
    pub async fn table_filter_chunks(
        &self,
        filter: &Filter,
        chunk_size: usize,
    ) -> DbResult<ChunkReader> {
        check_chunk_size(chunk_size)?;
        let order = self.stable_order_columns().await?;
        ChunkReader::new(
            Arc::clone(&self.backend),
            self.name.clone(),
            filter.clone().with_stable_order(&order),
            chunk_size,
        )
    }

    /// Columns that give every row one position: the primary key if the
    /// table has one, otherwise all columns in table order
    async fn stable_order_columns(&self) -> DbResult<Vec<String>> {
        let result = self.backend.query(&statements::show_fields(&self.name)).await?;
        let mut all = Vec::new();
        let mut primary = Vec::new();
        for row in &result.rows {
            let Some(name) = row.first().and_then(|v| v.as_text()) else {
                continue;
            };
            let key = row.get(SHOW_FIELDS_KEY).and_then(|v| v.as_text());
            if key.as_deref() == Some("PRI") {
                primary.push(name.clone());
            }
            all.push(name);
        }
        Ok(if primary.is_empty() { all } else { primary })
    }

    /// Flush an explicit transaction; a no-op under autocommit
    pub async fn commit(&self) -> DbResult<()> {
        self.backend.execute(&statements::commit()).await?;
        Ok(())
    }

    /// Stream the table in chunks and apply `f` to each, collecting the outputs
    pub async fn apply_on_table<F>(&self, chunk_size: usize, mut f: F) -> DbResult<Vec<RecordBatch>>
    where
        F: FnMut(RecordBatch) -> DbResult<RecordBatch>,
    {
        let mut reader = self.read_table_chunks(chunk_size).await?;
        let mut outputs = Vec::new();
        while let Some(chunk) = reader.next_chunk().await? {
            outputs.push(f(chunk)?);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
