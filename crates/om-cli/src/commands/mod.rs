//! CLI subcommand implementations.

pub mod chart;
pub mod export;
pub mod list;
pub mod log_dressing;
pub mod log_output;
pub mod summary;
pub mod trend;
mod util;
