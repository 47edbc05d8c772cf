//! Configuration types and parsing for dbframe.yml

use crate::connection::{ConnectionParams, DEFAULT_PORT};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default config file name looked up in a directory
pub const CONFIG_FILE_NAME: &str = "dbframe.yml";

/// Main configuration from dbframe.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Maximum rows per INSERT statement when writing a frame
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Prefix length used when a text column takes part in a key
    #[serde(default = "default_key_prefix_length")]
    pub key_prefix_length: u32,

    /// Named connection overrides (e.g., dev, prod)
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Connection settings; every field is optional so targets can override piecemeal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password, used when `password` is unset
    #[serde(default)]
    pub password_env: Option<String>,

    #[serde(default)]
    pub database: Option<String>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            insert_batch_size: default_insert_batch_size(),
            key_prefix_length: default_key_prefix_length(),
            targets: BTreeMap::new(),
        }
    }
}

fn default_insert_batch_size() -> usize {
    1000
}

fn default_key_prefix_length() -> u32 {
    255
}

impl ConnectionConfig {
    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(&self, other: &ConnectionConfig) -> ConnectionConfig {
        ConnectionConfig {
            host: other.host.clone().or_else(|| self.host.clone()),
            port: other.port.or(self.port),
            user: other.user.clone().or_else(|| self.user.clone()),
            password: other.password.clone().or_else(|| self.password.clone()),
            password_env: other
                .password_env
                .clone()
                .or_else(|| self.password_env.clone()),
            database: other.database.clone().or_else(|| self.database.clone()),
        }
    }

    /// Resolve into concrete connection parameters.
    ///
    /// An explicit password wins over `password_env`; a missing password
    /// resolves to the empty string.
    pub fn resolve(&self) -> CoreResult<ConnectionParams> {
        let host = require(&self.host, "connection.host")?;
        let user = require(&self.user, "connection.user")?;
        let database = require(&self.database, "connection.database")?;

        let password = match (&self.password, &self.password_env) {
            (Some(password), _) => password.clone(),
            (None, Some(var)) => std::env::var(var).map_err(|_| CoreError::ConfigInvalid {
                message: format!("password_env '{}' is not set", var),
            })?,
            (None, None) => String::new(),
        };

        Ok(ConnectionParams {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            user,
            password,
            database,
        })
    }
}

fn require(value: &Option<String>, field: &str) -> CoreResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(CoreError::ConfigInvalid {
            message: format!("{} is required", field),
        }),
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `dbframe.yml` from a directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.insert_batch_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "insert_batch_size must be greater than zero".to_string(),
            });
        }
        if self.key_prefix_length == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "key_prefix_length must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Connection settings for the given target (or the base settings when `None`)
    pub fn connection_for(&self, target: Option<&str>) -> CoreResult<ConnectionConfig> {
        match target {
            None => Ok(self.connection.clone()),
            Some(name) => {
                let target = self
                    .targets
                    .get(name)
                    .ok_or_else(|| CoreError::UnknownTarget {
                        name: name.to_string(),
                        available: self.target_names().join(", "),
                    })?;
                Ok(self.connection.merged_with(&target.connection))
            }
        }
    }

    /// Resolve concrete connection parameters for the given target
    pub fn connection_params(&self, target: Option<&str>) -> CoreResult<ConnectionParams> {
        self.connection_for(target)?.resolve()
    }

    /// Names of all configured targets, sorted
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
