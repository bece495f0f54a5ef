//! Warehouse access
//!
//! The pipeline only needs three capabilities from the warehouse: create a
//! table from a staged file, append from a staged file, and count rows.
//! They live behind a trait so the loader can be exercised against fakes.

use crate::error::{Error, Result};
use duckdb::{params, Connection};

/// Capabilities the loader requires from the warehouse
pub trait Warehouse {
    /// Replace (or create) the table with the staged file's rows
    fn create_from_staged(&self, table: &str, path: &str) -> Result<()>;

    /// Append the staged file's rows to the table
    fn append_from_staged(&self, table: &str, path: &str) -> Result<()>;

    /// Whether the table exists
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Number of rows currently in the table
    fn row_count(&self, table: &str) -> Result<usize>;
}

/// DuckDB-backed warehouse
///
/// Reads staged Parquet directly; cloud staging paths go through the
/// `httpfs` extension with credentials taken from the environment.
pub struct DuckDbWarehouse {
    conn: Connection,
}

impl DuckDbWarehouse {
    /// Open the warehouse database (":memory:" for an ephemeral one)
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| Error::load(format!("Failed to open warehouse at {path}: {e}")))?;

        Ok(Self { conn })
    }

    /// Configure S3-compatible access for cloud staging paths
    pub fn configure_cloud_storage(&self) -> Result<()> {
        self.conn
            .execute_batch("INSTALL httpfs; LOAD httpfs;")
            .map_err(|e| Error::load(format!("Failed to load httpfs extension: {e}")))?;

        if let (Ok(key_id), Ok(secret)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let region =
                std::env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_string());

            self.conn
                .execute_batch(&format!(
                    "SET s3_access_key_id = '{key_id}'; SET s3_secret_access_key = '{secret}'; SET s3_region = '{region}';"
                ))
                .map_err(|e| Error::load(format!("Failed to configure S3: {e}")))?;

            if let Ok(endpoint) = std::env::var("AWS_ENDPOINT") {
                self.conn
                    .execute_batch(&format!(
                        "SET s3_endpoint = '{}'; SET s3_url_style = 'path';",
                        endpoint
                            .trim_start_matches("https://")
                            .trim_start_matches("http://")
                    ))
                    .map_err(|e| Error::load(format!("Failed to configure S3 endpoint: {e}")))?;
            }
        }

        Ok(())
    }
}

impl Warehouse for DuckDbWarehouse {
    fn create_from_staged(&self, table: &str, path: &str) -> Result<()> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_parquet('{}')",
            quote_ident(table),
            escape_literal(path)
        );
        self.conn
            .execute_batch(&sql)
            .map_err(|e| Error::load(format!("Failed to create table '{table}': {e}")))
    }

    fn append_from_staged(&self, table: &str, path: &str) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} SELECT * FROM read_parquet('{}')",
            quote_ident(table),
            escape_literal(path)
        );
        self.conn
            .execute_batch(&sql)
            .map_err(|e| Error::load(format!("Failed to append to table '{table}': {e}")))
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT count(*) FROM information_schema.tables WHERE table_name = ?",
                params![table],
                |row| row.get(0),
            )
            .map_err(|e| Error::load(format!("Failed to inspect catalog: {e}")))?;
        Ok(count > 0)
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT count(*) FROM {}", quote_ident(table)),
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::load(format!("Failed to count rows in '{table}': {e}")))?;
        Ok(count as usize)
    }
}

/// Quote an SQL identifier
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a string literal
fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
