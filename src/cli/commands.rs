//! CLI arguments

use crate::types::{FetchMethod, WriteDisposition};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Consumer complaint extract-load pipeline
#[derive(Parser, Debug)]
#[command(name = "complaints-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Acquisition method: full snapshot file or incremental API pull
    #[arg(long, value_enum, default_value_t = FetchMethod::File)]
    pub method: FetchMethod,

    /// Start of the received-date window (ISO 8601, api method only)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End of the received-date window (ISO 8601, api method only)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Override the write disposition derived from the method
    #[arg(long, value_enum)]
    pub write: Option<WriteDisposition>,

    /// Destination table name
    #[arg(long)]
    pub table: Option<String>,

    /// Staging destination (local path or s3:// / r2:// URL)
    #[arg(long)]
    pub destination: Option<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
