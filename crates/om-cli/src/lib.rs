//! Output monitor CLI library.
//!
//! This crate provides the CLI interface for recording and reviewing output.

mod backend;
mod cli;
pub mod commands;
mod config;

pub use backend::{Backend, StoreError};
pub use cli::{Cli, Commands};
pub use config::{Config, StoreKind};
