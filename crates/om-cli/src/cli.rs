//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::chart::ChartArgs;
use crate::commands::export::ExportArgs;
use crate::commands::list::ListArgs;
use crate::commands::log_dressing::LogDressingArgs;
use crate::commands::log_output::LogOutputArgs;
use crate::commands::summary::SummaryArgs;
use crate::commands::trend::TrendArgs;

/// Urine output monitor.
///
/// Records output measurements and weighed dressing changes, and reports
/// daily hourly averages against the patient's normal range.
#[derive(Debug, Parser)]
#[command(name = "om", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a urine output measurement.
    LogOutput(LogOutputArgs),

    /// Record a weighed dressing change.
    LogDressing(LogDressingArgs),

    /// Show the most recent entries.
    List(ListArgs),

    /// Summarize one day's output.
    Summary(SummaryArgs),

    /// Show per-day hourly averages.
    Trend(TrendArgs),

    /// Render the hourly-average trend as SVG.
    Chart(ChartArgs),

    /// Export all entries to CSV.
    Export(ExportArgs),
}
