//! Order matcher CLI.

use std::io::{self, IsTerminal};

use clap::Parser;
use order_match_cli::logging::{init_logging, LogConfig, LogFormat};

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{
    load_engine, open_database, run_add_reference, run_compare, run_groups, run_import_catalog,
    run_import_requests, run_match,
};

fn main() {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    if let Err(error) = run(cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::ImportCatalog(args) => run_import_catalog(&mut open_database(&cli.db)?, args),
        Command::ImportRequests(args) => run_import_requests(&mut open_database(&cli.db)?, args),
        Command::AddReference(args) => run_add_reference(&mut open_database(&cli.db)?, args),
        Command::Match(args) => {
            let engine = load_engine(cli.config.as_deref())?;
            run_match(&open_database(&cli.db)?, engine, args)
        }
        Command::Compare(args) => run_compare(&load_engine(cli.config.as_deref())?, args),
        Command::Groups => run_groups(&open_database(&cli.db)?),
    }
}

/// `-v`/`-q` take precedence over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default()
        .with_level(cli.verbosity.tracing_level_filter())
        .with_format(match cli.log_format {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
        });
    config.use_env_filter = !cli.verbosity.is_present();
    config.with_ansi = io::stderr().is_terminal();
    config
}
