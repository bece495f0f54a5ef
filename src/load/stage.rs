//! Object storage staging (S3, R2, local filesystem)
//!
//! Staged files carry two paths: the object URI for logging, and a path the
//! warehouse can read the Parquet back from (an absolute filesystem path
//! for local staging, an `s3://` URL for cloud staging).

use crate::error::{Error, Result};
use bytes::Bytes;
use chrono::Utc;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Build a date-partitioned path for staged files
///
/// Format: `{table}/dt={YYYY-MM-DD}/data.{ext}`
pub fn build_partitioned_path(table: &str, extension: &str) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let sanitized = table.replace('.', "_");
    format!("{sanitized}/dt={date}/data.{extension}")
}

/// A staged object
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Object URI for logging (`s3://bucket/key` or `file://path`)
    pub uri: String,
    /// Path the warehouse reads the object back from
    pub read_path: String,
}

/// Staging destination parsed from a URL
#[derive(Debug, Clone)]
pub struct StageDestination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket
    prefix: String,
    /// Bucket name (cloud destinations only)
    bucket: Option<String>,
    /// Original URL scheme
    scheme: String,
    /// Absolute root for local destinations
    local_root: Option<PathBuf>,
}

impl StageDestination {
    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `/local/path/` or `./path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true)
        } else {
            Self::parse_local(url)
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let without_scheme = url
            .strip_prefix(&format!("{scheme}://"))
            .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

        let (bucket, prefix) = match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..].to_string(),
            ),
            None => (without_scheme, String::new()),
        };

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 needs its endpoint from the environment
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            bucket: Some(bucket.to_string()),
            scheme: scheme.to_string(),
            local_root: None,
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
        let root = std::fs::canonicalize(path)
            .map_err(|e| Error::config(format!("Failed to resolve directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            bucket: None,
            scheme: "file".to_string(),
            local_root: Some(root),
        })
    }

    /// Check if this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, r2, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Write bytes to a file in the destination
    pub async fn write(&self, filename: &str, data: Bytes) -> Result<StagedFile> {
        let path = if self.prefix.is_empty() {
            ObjectPath::from(filename)
        } else {
            ObjectPath::from(format!("{}/{filename}", self.prefix.trim_end_matches('/')))
        };

        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::load(format!("Failed to write {path}: {e}")))?;

        let (uri, read_path) = match (&self.bucket, &self.local_root) {
            (Some(bucket), _) => {
                // R2 objects are read back through the S3 protocol
                let read = format!("s3://{bucket}/{path}");
                (format!("{}://{bucket}/{path}", self.scheme), read)
            }
            (None, Some(root)) => {
                let fs_path = root.join(path.as_ref());
                let read = fs_path.to_string_lossy().into_owned();
                (format!("file://{read}"), read)
            }
            (None, None) => unreachable!("destination has neither bucket nor local root"),
        };

        Ok(StagedFile { uri, read_path })
    }

    /// Write Parquet bytes under a date-partitioned key
    ///
    /// Output path: `{table}/dt={YYYY-MM-DD}/data.parquet`
    pub async fn write_parquet(&self, table: &str, data: Bytes) -> Result<StagedFile> {
        let filename = build_partitioned_path(table, "parquet");
        self.write(&filename, data).await
    }
}
