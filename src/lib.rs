pub mod aggregate;
pub mod analyst;
pub mod cli;
pub mod export;
pub mod ingest;
pub mod kpi;
pub mod preview;
pub mod profile;
pub mod score;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => profile::execute(&args),
        Commands::Aggregate(args) => aggregate::execute(&args),
        Commands::Kpi(args) => kpi::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Ask(args) => analyst::execute_ask(&args),
        Commands::Forecast(args) => analyst::execute_forecast(&args),
    }
}
