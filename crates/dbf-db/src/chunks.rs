//! Lazy, paged reads

use crate::error::{DbError, DbResult};
use crate::frame;
use crate::traits::Database;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use dbf_core::TableName;
use dbf_sql::{statements, Filter};
use std::sync::Arc;

pub(crate) fn check_chunk_size(chunk_size: usize) -> DbResult<()> {
    if chunk_size == 0 {
        return Err(DbError::InvalidArgument(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Reads a filtered table back in bounded-size frames, one query per chunk.
///
/// Each page is the filter's own SELECT with `LIMIT size OFFSET n`. The
/// filter's ORDER BY must pin every row to one position for the pages to
/// be disjoint; the table helper extends it with the primary key, or with
/// every column when there is none. The filter's LIMIT caps the total.
/// Nothing is sent to the server before the first
/// [`next_chunk`](Self::next_chunk).
pub struct ChunkReader {
    backend: Arc<dyn Database>,
    table: TableName,
    filter: Filter,
    chunk_size: usize,
    offset: usize,
    schema: Option<SchemaRef>,
    done: bool,
}

impl ChunkReader {
    pub fn new(
        backend: Arc<dyn Database>,
        table: TableName,
        filter: Filter,
        chunk_size: usize,
    ) -> DbResult<Self> {
        check_chunk_size(chunk_size)?;
        Ok(Self {
            backend,
            table,
            filter,
            chunk_size,
            offset: 0,
            schema: None,
            done: false,
        })
    }

    /// The filter being paged through
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fetch the next chunk, or `None` once the result is exhausted.
    ///
    /// A short page, or reaching the filter's limit, ends the read without an
    /// extra round trip.
    pub async fn next_chunk(&mut self) -> DbResult<Option<RecordBatch>> {
        if self.done {
            return Ok(None);
        }

        let size = match self.filter.limit {
            Some(limit) => self.chunk_size.min(limit.saturating_sub(self.offset)),
            None => self.chunk_size,
        };
        let sql = statements::select_page(&self.table, &self.filter, size, self.offset);
        let result = self.backend.query(&sql).await?;
        let fetched = result.len();
        self.offset += fetched;
        let limit_reached = self.filter.limit.is_some_and(|limit| self.offset >= limit);
        if fetched < size || limit_reached {
            self.done = true;
        }

        let batch = frame::result_to_batch(&result)?;
        if self.schema.is_none() {
            self.schema = Some(batch.schema());
        }
        if fetched == 0 {
            return Ok(None);
        }
        Ok(Some(batch))
    }

    /// Drain the reader and concatenate every chunk into one frame
    pub async fn collect(mut self) -> DbResult<RecordBatch> {
        let mut batches = Vec::new();
        while let Some(batch) = self.next_chunk().await? {
            batches.push(batch);
        }
        match self.schema.take() {
            Some(schema) => frame::concat(schema, &batches),
            None => frame::result_to_batch(&Default::default()),
        }
    }
}
