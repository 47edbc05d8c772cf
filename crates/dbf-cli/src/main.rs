//! dbframe CLI - treat MySQL tables as Arrow dataframes

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{dedup, dtypes, init_db, load, read, set_key, sort};

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::InitDb => init_db::execute(&cli.global).await,
        cli::Commands::Dtypes(args) => dtypes::execute(args, &cli.global).await,
        cli::Commands::Load(args) => load::execute(args, &cli.global).await,
        cli::Commands::Read(args) => read::execute(args, &cli.global).await,
        cli::Commands::Dedup(args) => dedup::execute(args, &cli.global).await,
        cli::Commands::SetKey(args) => set_key::execute(args, &cli.global).await,
        cli::Commands::Sort(args) => sort::execute(args, &cli.global).await,
    }
}
