//! Command-line interface
//!
//! Argument parsing and the pipeline runner.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
