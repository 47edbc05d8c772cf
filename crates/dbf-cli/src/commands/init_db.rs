//! Init-db command implementation

use anyhow::{Context, Result};
use dbf_db::{ensure_database, MySqlBackend};

use crate::cli::GlobalArgs;
use crate::commands::common::{connection_params, load_config};

/// Execute the init-db command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let params = connection_params(&config, global)?;

    let server = MySqlBackend::connect(&params, None).context("Failed to connect to server")?;
    let created = ensure_database(&server, &params.database)
        .await
        .with_context(|| format!("Failed to create database {}", params.database))?;

    if created {
        println!("Created database {}", params.database);
    } else {
        println!("Database {} already exists", params.database);
    }
    Ok(())
}
