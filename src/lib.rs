// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Consumer Complaint Extract-Load Pipeline
//!
//! A small extract-load utility for the public consumer complaint database:
//! fetch records (full snapshot or incremental API pull), coerce them to a
//! declared columnar schema, stage them as Parquet in object storage, and
//! copy them into a warehouse table.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌──────────────────────────┐
//! │     Fetch     │ ──▶ │  Transform  │ ──▶ │           Load           │
//! ├───────────────┤     ├─────────────┤     ├──────────────────────────┤
//! │ bulk archive  │     │ type        │     │ Parquet → object storage │
//! │ search API    │     │ coercion    │     │ copy → warehouse table   │
//! └───────────────┘     └─────────────┘     └──────────────────────────┘
//! ```
//!
//! Control flow is strictly linear; each stage blocks until complete and
//! any failure aborts the run.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Common types and type aliases
pub mod types;

/// Runtime configuration
pub mod config;

/// HTTP client
pub mod http;

/// Bulk and incremental fetchers
pub mod fetch;

/// Type coercion to the declared schema
pub mod transform;

/// Staging and warehouse load
pub mod load;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
