//! Runtime configuration
//!
//! Values resolve in layers: built-in defaults, then an optional YAML file,
//! then environment variables. CLI flags are applied on top by the runner.
//!
//! Warehouse and object-store credentials are not handled here; they are
//! read from the environment by the storage and warehouse clients.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Public complaint search API endpoint
pub const DEFAULT_API_URL: &str =
    "https://www.consumerfinance.gov/data-research/consumer-complaints/search/api/v1/";

/// Full database snapshot archive
pub const DEFAULT_BULK_URL: &str = "https://files.consumerfinance.gov/ccdb/complaints.csv.zip";

/// Runtime configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Complaint search API endpoint
    pub api_url: String,
    /// Bulk snapshot archive URL
    pub bulk_url: String,
    /// Destination table name
    pub table: String,
    /// Staging destination: local path or s3:// / r2:// URL
    pub staging_url: String,
    /// Warehouse database path (":memory:" for an ephemeral warehouse)
    pub warehouse_path: String,
    /// Records requested per API page
    pub page_size: usize,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            bulk_url: DEFAULT_BULK_URL.to_string(),
            table: "consumer_complaints".to_string(),
            staging_url: "./staging".to_string(),
            warehouse_path: "warehouse.duckdb".to_string(),
            page_size: 1000,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Resolve configuration: defaults, then the optional file, then env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay environment variables onto the current values
    fn apply_env(&mut self) {
        if let Ok(table) = std::env::var("TABLE_NAME") {
            self.table = table;
        }
        if let Ok(url) = std::env::var("STAGING_URL") {
            self.staging_url = url;
        }
        if let Ok(path) = std::env::var("WAREHOUSE_PATH") {
            self.warehouse_path = path;
        }
        if let Ok(url) = std::env::var("COMPLAINTS_API_URL") {
            self.api_url = url;
        }
        if let Ok(url) = std::env::var("COMPLAINTS_BULK_URL") {
            self.bulk_url = url;
        }
    }

    /// Check the resolved values are usable
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(crate::error::Error::missing_field("table"));
        }
        if self.staging_url.trim().is_empty() {
            return Err(crate::error::Error::missing_field("staging_url"));
        }
        if self.page_size == 0 {
            return Err(crate::error::Error::config("page_size must be positive"));
        }
        Ok(())
    }
}
