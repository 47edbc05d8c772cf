//! Load command implementation

use anyhow::{bail, Context, Result};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use dbf_db::IfExists;
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalArgs, IfExistsArg, LoadArgs};
use crate::commands::common::open_table;

/// Rows sampled for CSV type inference
const INFER_SCHEMA_ROWS: usize = 1000;

impl From<IfExistsArg> for IfExists {
    fn from(arg: IfExistsArg) -> Self {
        match arg {
            IfExistsArg::Fail => IfExists::Fail,
            IfExistsArg::Replace => IfExists::Replace,
            IfExistsArg::Append => IfExists::Append,
        }
    }
}

/// Execute the load command
pub async fn execute(args: &LoadArgs, global: &GlobalArgs) -> Result<()> {
    let frame = read_csv(&args.csv, !args.no_header, args.delimiter)?;
    let table = open_table(global, &args.table).await?;

    let if_exists = IfExists::from(args.if_exists);
    let written = if args.upsert {
        table.update_table(&frame, if_exists).await
    } else {
        table.populate_table(&frame, if_exists).await
    }
    .with_context(|| format!("Failed to write {}", args.table))?;

    println!("Wrote {} rows to {}", written, args.table);
    Ok(())
}

/// Read a whole CSV file into one frame, inferring column types
pub(crate) fn read_csv(path: &Path, has_header: bool, delimiter: char) -> Result<RecordBatch> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let format = Format::default()
        .with_header(has_header)
        .with_delimiter(delimiter as u8);
    let (schema, _) = format
        .infer_schema(&mut file, Some(INFER_SCHEMA_ROWS))
        .with_context(|| format!("Failed to infer schema of {}", path.display()))?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(file)?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(concat_batches(&schema, &batches)?)
}

#[cfg(test)]
#[path = "load_test.rs"]
mod tests;
