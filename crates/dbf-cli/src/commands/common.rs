//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dbf_core::{Config, ConnectionConfig, ConnectionParams, CoreError};
use dbf_db::{MySqlOps, MySqlTable, TableOptions};
use std::path::Path;

use crate::cli::GlobalArgs;

/// Load the config named by `--config`, or `./dbframe.yml` when present.
///
/// Without either, defaults apply and the connection must come from flags.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match Config::load_from_dir(Path::new(".")) {
            Ok(config) => Ok(config),
            Err(CoreError::ConfigNotFound { .. }) => Ok(Config::default()),
            Err(e) => Err(e).context("Failed to load dbframe.yml"),
        },
    }
}

/// Connection flags as a partial connection config
fn flag_overrides(global: &GlobalArgs) -> ConnectionConfig {
    ConnectionConfig {
        host: global.host.clone(),
        port: global.port,
        user: global.user.clone(),
        password: global.password.clone(),
        password_env: None,
        database: global.database.clone(),
    }
}

/// Resolve connection parameters: config base, then `--target`, then flags
pub(crate) fn connection_params(config: &Config, global: &GlobalArgs) -> Result<ConnectionParams> {
    let base = config.connection_for(global.target.as_deref())?;
    base.merged_with(&flag_overrides(global))
        .resolve()
        .context("Incomplete connection settings (set them in dbframe.yml or pass flags)")
}

/// Open a session for the resolved connection
pub(crate) async fn connect(global: &GlobalArgs) -> Result<MySqlOps> {
    let config = load_config(global)?;
    let params = connection_params(&config, global)?;
    log::debug!("Connecting to {}", params);
    MySqlOps::connect(params, TableOptions::from(&config))
        .await
        .context("Failed to connect to database")
}

/// Open a session and bind one table on it
pub(crate) async fn open_table(global: &GlobalArgs, name: &str) -> Result<MySqlTable> {
    let ops = connect(global).await?;
    ops.table(name)
        .with_context(|| format!("Invalid table name '{}'", name))
}

/// Split a comma-separated column list, dropping blanks
pub(crate) fn split_columns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
