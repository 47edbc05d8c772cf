//! Set-key command implementation

use anyhow::{bail, Context, Result};

use crate::cli::{GlobalArgs, SetKeyArgs};
use crate::commands::common::{open_table, split_columns};

/// Execute the set-key command
pub async fn execute(args: &SetKeyArgs, global: &GlobalArgs) -> Result<()> {
    let columns = split_columns(&args.columns);
    if columns.is_empty() {
        bail!("--columns must name at least one column");
    }

    let mut table = open_table(global, &args.table).await?;
    let remove_duplicates = !args.no_dedup;
    let (result, kind) = if args.unique {
        (
            table.set_unique_keys(&columns, remove_duplicates).await,
            "unique key",
        )
    } else {
        (
            table.set_primary_key(&columns, remove_duplicates).await,
            "primary key",
        )
    };
    result.with_context(|| format!("Failed to add {} to {}", kind, args.table))?;

    println!("Added {} ({}) to {}", kind, columns.join(","), args.table);
    Ok(())
}
