//! Dtypes command implementation

use anyhow::{Context, Result};
use dbf_db::ColumnTypes;
use serde::Serialize;

use crate::cli::{DtypesArgs, DtypesOutput, GlobalArgs};
use crate::commands::common::open_table;

#[derive(Serialize)]
struct ColumnType<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    data_type: &'a str,
}

/// Execute the dtypes command
pub async fn execute(args: &DtypesArgs, global: &GlobalArgs) -> Result<()> {
    let table = open_table(global, &args.table).await?;
    let types = table
        .get_data_type()
        .await
        .with_context(|| format!("Failed to describe {}", args.table))?;

    match args.output {
        DtypesOutput::Table => print!("{}", render_table(&types)),
        DtypesOutput::Json => println!("{}", render_json(&types)?),
    }
    Ok(())
}

fn render_table(types: &ColumnTypes) -> String {
    let width = types.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    types
        .iter()
        .map(|(name, ty)| format!("{:<width$}  {}\n", name, ty, width = width))
        .collect()
}

fn render_json(types: &ColumnTypes) -> Result<String> {
    let columns: Vec<ColumnType> = types
        .iter()
        .map(|(name, data_type)| ColumnType { name, data_type })
        .collect();
    Ok(serde_json::to_string_pretty(&columns)?)
}
