//! Chart command for rendering the trend as SVG.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use om_core::Dashboard;
use om_core::chart::render_trend_svg;
use om_core::summary::daily_trend;

use crate::{Backend, Config};

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// File to write the SVG to. Prints to stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, args: &ChartArgs, config: &Config) -> Result<()> {
    let tz = config.tz()?;
    let thresholds = config.thresholds()?;

    let store = Backend::open(config)?;
    let dashboard = Dashboard::load(&store).context("failed to load entries")?;
    let trend = daily_trend(dashboard.outputs(), dashboard.dressings(), &tz, &thresholds);
    let svg = render_trend_svg(&trend, &thresholds);

    match &args.output {
        Some(path) => {
            std::fs::write(path, svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(
                writer,
                "Wrote chart of {} days to {}",
                trend.len(),
                path.display()
            )?;
        }
        None => write!(writer, "{svg}")?,
    }
    Ok(())
}
