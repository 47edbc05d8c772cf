//! Sort command implementation

use anyhow::{Context, Result};
use dbf_sql::{SortKey, SortSpec};

use crate::cli::{GlobalArgs, SortArgs};
use crate::commands::common::open_table;

/// Execute the sort command
pub async fn execute(args: &SortArgs, global: &GlobalArgs) -> Result<()> {
    let keys = args
        .by
        .iter()
        .map(|k| k.parse::<SortKey>())
        .collect::<Result<Vec<_>, _>>()?;
    let spec = SortSpec::keys(keys)?;

    let table = open_table(global, &args.table).await?;
    table
        .sort_table(&spec)
        .await
        .with_context(|| format!("Failed to sort {}", args.table))?;

    println!(
        "Ran ORDER BY over {}; storage order is unchanged, read with --order-by for sorted rows",
        args.table
    );
    Ok(())
}
