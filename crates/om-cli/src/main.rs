use std::io::stdout;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use om_cli::commands::{chart, export, list, log_dressing, log_output, summary, trend};
use om_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = stdout().lock();
    match command {
        Commands::LogOutput(args) => log_output::run(&mut out, args, &config)?,
        Commands::LogDressing(args) => log_dressing::run(&mut out, args, &config)?,
        Commands::List(args) => list::run(&mut out, args, &config)?,
        Commands::Summary(args) => summary::run(&mut out, args, &config)?,
        Commands::Trend(args) => trend::run(&mut out, args, &config)?,
        Commands::Chart(args) => chart::run(&mut out, args, &config)?,
        Commands::Export(args) => export::run(&mut out, args, &config)?,
    }

    Ok(())
}
