//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbframe - load, read and reshape MySQL tables as dataframes
#[derive(Parser, Debug)]
#[command(name = "dbf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging (every emitted statement)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ./dbframe.yml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Named target from the config file
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Server host, overrides the config file
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port, overrides the config file
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// User name, overrides the config file
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password, overrides the config file
    #[arg(long, global = true, env = "DBFRAME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name, overrides the config file
    #[arg(long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the configured database if it does not exist
    InitDb,

    /// Show the declared column types of a table
    Dtypes(DtypesArgs),

    /// Write a CSV file into a table
    Load(LoadArgs),

    /// Read a table, optionally filtered, sorted and chunked
    Read(ReadArgs),

    /// Keep one row per distinct value of the given columns
    Dedup(DedupArgs),

    /// Add a primary or unique key
    SetKey(SetKeyArgs),

    /// Issue an ORDER BY over a table
    Sort(SortArgs),
}

/// Arguments for the dtypes command
#[derive(Args, Debug)]
pub struct DtypesArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: DtypesOutput,
}

/// Dtypes output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypesOutput {
    /// Aligned columns
    Table,
    /// JSON array of {name, type}
    Json,
}

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// CSV file to load
    #[arg(long)]
    pub csv: PathBuf,

    /// What to do when the table already exists
    #[arg(long, value_enum, default_value = "append")]
    pub if_exists: IfExistsArg,

    /// Update rows whose key already exists instead of failing
    #[arg(long)]
    pub upsert: bool,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// The file has no header row
    #[arg(long)]
    pub no_header: bool,
}

/// Behaviour when the target table exists
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExistsArg {
    Fail,
    Replace,
    Append,
}

/// Arguments for the read command
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Columns to return (comma-separated, default: all)
    #[arg(short, long)]
    pub select: Option<String>,

    /// Predicate such as "amount > 10" (repeatable, joined with AND)
    #[arg(short, long = "where")]
    pub predicates: Vec<String>,

    /// Sort key as col[:asc|desc] (repeatable)
    #[arg(long)]
    pub order_by: Vec<String>,

    /// Maximum number of rows
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Stream the result in chunks of this many rows
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ReadFormat,
}

/// Read output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFormat {
    /// Pretty-printed grid
    Table,
    /// CSV with a header row
    Csv,
    /// Newline-delimited JSON objects
    Json,
}

/// Arguments for the dedup command
#[derive(Args, Debug)]
pub struct DedupArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Columns defining a duplicate (comma-separated)
    #[arg(long)]
    pub columns: String,
}

/// Arguments for the set-key command
#[derive(Args, Debug)]
pub struct SetKeyArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Key columns (comma-separated)
    #[arg(long)]
    pub columns: String,

    /// Add a unique key instead of the primary key
    #[arg(long)]
    pub unique: bool,

    /// Do not remove duplicates before adding the key
    #[arg(long)]
    pub no_dedup: bool,
}

/// Arguments for the sort command
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Sort key as col[:asc|desc] (repeatable)
    #[arg(long, required = true)]
    pub by: Vec<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
