//! Bulk snapshot fetcher
//!
//! Downloads the full complaint database archive to a temporary file,
//! extracts the CSV member, and parses it into raw records. The published
//! CSV headers are mapped to the canonical field names used everywhere
//! downstream.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::{JsonObject, JsonValue};
use std::io::{Read, Write};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Published bulk CSV header → canonical field name
const HEADER_MAP: &[(&str, &str)] = &[
    ("Date received", "date_received"),
    ("Product", "product"),
    ("Sub-product", "sub_product"),
    ("Issue", "issue"),
    ("Sub-issue", "sub_issue"),
    ("Company", "company"),
    ("State", "state"),
    ("ZIP code", "zip"),
    ("Consumer consent provided?", "consumer_consent"),
    ("Date sent to company", "date_sent_to_company"),
    ("Company response to consumer", "company_response"),
    ("Timely response?", "timely_response"),
    ("Consumer disputed?", "disputed"),
    ("Complaint ID", "complaint_id"),
];

/// Fetcher for the full database snapshot
pub struct BulkFetcher {
    client: HttpClient,
    url: String,
}

impl BulkFetcher {
    /// Create a fetcher for the given archive URL
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Download and parse the full snapshot
    pub async fn fetch(&self) -> Result<Vec<JsonValue>> {
        info!("Downloading bulk snapshot from {}", self.url);
        let archive = self.download().await?;
        let csv = extract_csv(archive)?;
        let records = parse_csv(&csv)?;
        info!("Parsed {} records from bulk snapshot", records.len());
        Ok(records)
    }

    /// Download the archive to a temporary file
    async fn download(&self) -> Result<NamedTempFile> {
        let response = self
            .client
            .get(&self.url)
            .await
            .map_err(|e| Error::download(format!("GET {} failed: {e}", self.url)))?;

        if let Some(content_type) = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
        {
            if !is_archive_content_type(content_type) {
                return Err(Error::download(format!(
                    "unexpected content type '{content_type}' from {}",
                    self.url
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::download(format!("failed to read archive body: {e}")))?;

        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;
        file.flush()?;
        debug!("Archive written to {:?} ({} bytes)", file.path(), bytes.len());
        Ok(file)
    }
}

/// Whether a content type can plausibly carry the zip archive
fn is_archive_content_type(content_type: &str) -> bool {
    content_type.contains("zip") || content_type.contains("octet-stream")
}

/// Extract the first CSV member from the downloaded archive
fn extract_csv(archive: NamedTempFile) -> Result<String> {
    let file = archive.reopen()?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::download(format!("malformed archive: {e}")))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::download(format!("unreadable archive entry: {e}")))?;
        if entry.name().ends_with(".csv") {
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .map_err(|e| Error::download(format!("failed to extract CSV: {e}")))?;
            return Ok(contents);
        }
    }

    Err(Error::download("archive contains no CSV member"))
}

/// Parse the snapshot CSV into raw records with canonical keys
fn parse_csv(contents: &str) -> Result<Vec<JsonValue>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::download(format!("missing CSV header row: {e}")))?
        .clone();

    let canonical: Vec<Option<&str>> = headers.iter().map(canonical_name).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| Error::download(format!("malformed CSV row: {e}")))?;
        let mut obj = JsonObject::new();
        for (i, name) in canonical.iter().enumerate() {
            let Some(name) = name else { continue };
            let value = row.get(i).unwrap_or_default();
            let json = if value.is_empty() {
                JsonValue::Null
            } else {
                JsonValue::String(value.to_string())
            };
            obj.insert((*name).to_string(), json);
        }
        records.push(JsonValue::Object(obj));
    }

    Ok(records)
}

/// Map a published header to its canonical field name
fn canonical_name(header: &str) -> Option<&'static str> {
    HEADER_MAP
        .iter()
        .find(|(published, _)| *published == header.trim())
        .map(|(_, canonical)| *canonical)
}
