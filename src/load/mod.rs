//! Staging and warehouse load
//!
//! The loader serializes a transformed batch to Parquet, uploads it to the
//! staging destination, then issues a copy command against the warehouse
//! table. There is no rollback: a failure between the two steps leaves the
//! staged object behind and the table untouched.

mod stage;
mod warehouse;

pub use stage::{StageDestination, StagedFile};
pub use warehouse::{DuckDbWarehouse, Warehouse};

use crate::error::Result;
use crate::types::WriteDisposition;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

/// Outcome of one load
#[derive(Debug)]
pub struct LoadSummary {
    /// Destination table
    pub table: String,
    /// Rows in the staged batch
    pub rows_staged: usize,
    /// Rows in the table after the load
    pub table_rows: usize,
    /// Where the batch was staged
    pub staged_uri: String,
}

/// Loader wiring a staging destination to a warehouse
pub struct Loader {
    stage: StageDestination,
    warehouse: Box<dyn Warehouse>,
}

impl Loader {
    /// Create a loader
    pub fn new(stage: StageDestination, warehouse: Box<dyn Warehouse>) -> Self {
        Self { stage, warehouse }
    }

    /// Stage the batch and copy it into the table
    pub async fn load(
        &self,
        batch: &RecordBatch,
        table: &str,
        disposition: WriteDisposition,
    ) -> Result<LoadSummary> {
        let data = to_parquet_bytes(batch)?;
        let staged = self.stage.write_parquet(table, data).await?;
        info!("Staged {} rows at {}", batch.num_rows(), staged.uri);

        match disposition {
            WriteDisposition::Create => {
                self.warehouse.create_from_staged(table, &staged.read_path)?;
            }
            WriteDisposition::Append => {
                // First run creates the table instead of appending into nothing
                if self.warehouse.table_exists(table)? {
                    self.warehouse.append_from_staged(table, &staged.read_path)?;
                } else {
                    self.warehouse.create_from_staged(table, &staged.read_path)?;
                }
            }
        }

        let table_rows = self.warehouse.row_count(table)?;
        info!("Table '{table}' now holds {table_rows} rows");

        Ok(LoadSummary {
            table: table.to_string(),
            rows_staged: batch.num_rows(),
            table_rows,
            staged_uri: staged.uri,
        })
    }
}

/// Serialize a batch to Parquet in memory
pub fn to_parquet_bytes(batch: &RecordBatch) -> Result<Bytes> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    Ok(Bytes::from(buffer))
}
