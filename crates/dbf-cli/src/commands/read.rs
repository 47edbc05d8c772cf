//! Read command implementation

use anyhow::{Context, Result};
use arrow::csv::WriterBuilder;
use arrow::json::LineDelimitedWriter;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use dbf_sql::{Filter, SortKey};
use std::io::Write;

use crate::cli::{GlobalArgs, ReadArgs, ReadFormat};
use crate::commands::common::{open_table, split_columns};

/// Execute the read command
pub async fn execute(args: &ReadArgs, global: &GlobalArgs) -> Result<()> {
    let filter = build_filter(args)?;
    let table = open_table(global, &args.table).await?;

    match args.chunk_size {
        Some(size) => {
            let mut reader = table
                .table_filter_chunks(&filter, size)
                .await
                .context("Invalid chunk size")?;
            let mut first = true;
            while let Some(chunk) = reader
                .next_chunk()
                .await
                .with_context(|| format!("Failed to read {}", args.table))?
            {
                std::io::stdout().write_all(&render(&[chunk], args.format, first)?)?;
                first = false;
            }
        }
        None => {
            let frame = table
                .table_filter(&filter)
                .await
                .with_context(|| format!("Failed to read {}", args.table))?;
            std::io::stdout().write_all(&render(&[frame], args.format, true)?)?;
        }
    }
    Ok(())
}

/// Translate read flags into a validated filter
pub(crate) fn build_filter(args: &ReadArgs) -> Result<Filter> {
    let mut filter = Filter::new();
    if let Some(select) = &args.select {
        filter = filter.select(split_columns(select))?;
    }
    for predicate in &args.predicates {
        filter = filter.where_clause(predicate)?;
    }
    for key in &args.order_by {
        filter = filter.order_by(key.parse::<SortKey>()?);
    }
    if let Some(limit) = args.limit {
        filter = filter.limit(limit)?;
    }
    Ok(filter)
}

/// Render frames in the requested format; `header` controls the CSV header row
pub(crate) fn render(batches: &[RecordBatch], format: ReadFormat, header: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        ReadFormat::Table => {
            writeln!(out, "{}", pretty_format_batches(batches)?)?;
        }
        ReadFormat::Csv => {
            let mut writer = WriterBuilder::new().with_header(header).build(&mut out);
            for batch in batches {
                writer.write(batch)?;
            }
        }
        ReadFormat::Json => {
            let mut writer = LineDelimitedWriter::new(&mut out);
            for batch in batches {
                writer.write(batch)?;
            }
            writer.finish()?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "read_test.rs"]
mod tests;
