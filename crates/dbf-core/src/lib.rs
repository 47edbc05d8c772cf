//! dbf-core - Core library for dbframe
//!
//! This crate provides the connection descriptor, strongly-typed table names,
//! scalar SQL values, YAML configuration, and the small list helpers shared by
//! the SQL and database layers.

pub mod config;
pub mod connection;
pub mod error;
pub mod list_conversion;
pub mod sql_utils;
pub mod table_name;
pub mod value;

pub use config::{Config, ConnectionConfig, TargetConfig};
pub use connection::ConnectionParams;
pub use error::{CoreError, CoreResult};
pub use list_conversion::flatten_rows;
pub use table_name::TableName;
pub use value::SqlValue;
