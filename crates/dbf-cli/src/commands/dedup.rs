//! Dedup command implementation

use anyhow::{bail, Context, Result};

use crate::cli::{DedupArgs, GlobalArgs};
use crate::commands::common::{open_table, split_columns};

/// Execute the dedup command
pub async fn execute(args: &DedupArgs, global: &GlobalArgs) -> Result<()> {
    let columns = split_columns(&args.columns);
    if columns.is_empty() {
        bail!("--columns must name at least one column");
    }

    let table = open_table(global, &args.table).await?;
    table
        .remove_duplicates(&columns)
        .await
        .with_context(|| format!("Failed to remove duplicates from {}", args.table))?;

    println!("Removed duplicates from {} on {}", args.table, columns.join(","));
    Ok(())
}
