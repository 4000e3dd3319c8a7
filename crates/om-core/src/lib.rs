//! Core domain logic for the output monitor.
//!
//! This crate contains the fundamental types and logic for:
//! - Allocation: spreading output volume across local calendar days
//! - Summaries: daily totals, clinical thresholds, and the hourly trend
//! - Export: CSV and SVG renderings of the loaded entries
//! - Store contract: the append-only interface both backends implement

mod allocation;
pub mod chart;
pub mod dashboard;
pub mod entry;
pub mod export;
pub mod store;
pub mod summary;
pub mod time;
pub mod validate;

pub use allocation::{
    AllocationConfig, AllocationError, allocate_daily_volume, daily_hourly_averages,
};
pub use dashboard::Dashboard;
pub use entry::{
    DRESSING_LOCATION, DrainageType, DressingEntry, NewDressingEntry, NewOutputEntry,
    OutputEntry, Reading, UnknownDrainageType,
};
pub use store::EntryStore;
pub use summary::{DailySummary, RateStatus, Thresholds, TrendPoint};
pub use validate::ValidationError;
