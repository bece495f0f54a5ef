//! Common types used throughout the pipeline
//!
//! Shared type definitions and aliases: the acquisition method, the write
//! disposition, the received-date window, and the per-run job descriptor.

use crate::error::{Error, Result};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Fetch Method
// ============================================================================

/// How records are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    /// Full snapshot download and full table (re)load
    #[default]
    File,
    /// Date-filtered API pull appended to an existing table
    Api,
}

impl FetchMethod {
    /// The write disposition a method implies when none is given explicitly
    pub fn default_disposition(self) -> WriteDisposition {
        match self {
            FetchMethod::File => WriteDisposition::Create,
            FetchMethod::Api => WriteDisposition::Append,
        }
    }
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMethod::File => write!(f, "file"),
            FetchMethod::Api => write!(f, "api"),
        }
    }
}

// ============================================================================
// Write Disposition
// ============================================================================

/// How data should be written to the warehouse table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WriteDisposition {
    /// Replace the table with the incoming rows
    Create,
    /// Add the incoming rows, creating the table on first run
    Append,
}

impl std::fmt::Display for WriteDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteDisposition::Create => write!(f, "create"),
            WriteDisposition::Append => write!(f, "append"),
        }
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// Inclusive received-date window for an incremental pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting start > end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Default window: yesterday through today
    pub fn recent() -> Self {
        let end = Utc::now().date_naive();
        let start = end.checked_sub_days(Days::new(1)).unwrap_or(end);
        Self { start, end }
    }

    /// Start of the window (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// End of the window (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a date falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Extraction Job
// ============================================================================

/// Ephemeral descriptor of one run, built at CLI invocation
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Acquisition method
    pub method: FetchMethod,
    /// Received-date window (api method only)
    pub range: Option<DateRange>,
    /// Destination table name
    pub table: String,
    /// How the table is written
    pub disposition: WriteDisposition,
}
