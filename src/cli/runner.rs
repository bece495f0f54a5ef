//! Pipeline runner
//!
//! Builds the extraction job from the parsed arguments and drives the
//! three stages in order: fetch, transform, load.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{ApiFetcher, BulkFetcher};
use crate::http::{HttpClient, HttpClientConfig};
use crate::load::{DuckDbWarehouse, Loader, StageDestination};
use crate::transform::to_record_batch;
use crate::types::{DateRange, ExtractionJob, FetchMethod, JsonValue};
use chrono::{Days, NaiveDate, Utc};
use std::time::Duration;
use tracing::{info, warn};

use super::commands::Cli;

/// Runs one extract-load job
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner from parsed arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Execute the pipeline
    pub async fn run(&self) -> Result<()> {
        let mut config = Config::load(self.cli.config.as_deref())?;
        if let Some(table) = &self.cli.table {
            config.table = table.clone();
        }
        if let Some(destination) = &self.cli.destination {
            config.staging_url = destination.clone();
        }
        config.validate()?;

        let job = self.build_job(&config)?;
        info!(
            "Starting {} run into table '{}' ({})",
            job.method, job.table, job.disposition
        );

        let records = self.fetch(&config, &job).await?;
        if records.is_empty() {
            info!("No records in the requested window; nothing to load");
            return Ok(());
        }

        let batch = to_record_batch(&records)?;
        info!("Transformed {} rows", batch.num_rows());

        let stage = StageDestination::parse(&config.staging_url)?;
        let warehouse = DuckDbWarehouse::open(&config.warehouse_path)?;
        if stage.is_cloud() {
            warehouse.configure_cloud_storage()?;
        }
        let loader = Loader::new(stage, Box::new(warehouse));
        let summary = loader.load(&batch, &job.table, job.disposition).await?;

        info!(
            "Load complete: {} rows staged, table '{}' now holds {} rows",
            summary.rows_staged, summary.table, summary.table_rows
        );
        Ok(())
    }

    /// Build the job descriptor for this invocation
    fn build_job(&self, config: &Config) -> Result<ExtractionJob> {
        let range = match self.cli.method {
            FetchMethod::Api => Some(resolve_range(self.cli.start, self.cli.end)?),
            FetchMethod::File => {
                if self.cli.start.is_some() || self.cli.end.is_some() {
                    warn!("--start/--end are ignored with --method file");
                }
                None
            }
        };

        Ok(ExtractionJob {
            method: self.cli.method,
            range,
            table: config.table.clone(),
            disposition: self
                .cli
                .write
                .unwrap_or_else(|| self.cli.method.default_disposition()),
        })
    }

    /// Run the acquisition stage
    async fn fetch(&self, config: &Config, job: &ExtractionJob) -> Result<Vec<JsonValue>> {
        let http = HttpClient::with_config(
            HttpClientConfig::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build(),
        );

        match job.method {
            FetchMethod::File => BulkFetcher::new(http, &config.bulk_url).fetch().await,
            FetchMethod::Api => {
                let range = job.range.expect("api job carries a range");
                ApiFetcher::new(http, &config.api_url, config.page_size)
                    .fetch(&range)
                    .await
            }
        }
    }
}

/// Resolve the received-date window from the optional flags
///
/// Defaults fill the missing ends: end falls back to today, start to the
/// day before the end.
fn resolve_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (Some(start), None) => DateRange::new(start, Utc::now().date_naive()),
        (None, Some(end)) => {
            let start = end.checked_sub_days(Days::new(1)).unwrap_or(end);
            DateRange::new(start, end)
        }
        (None, None) => Ok(DateRange::recent()),
    }
}
