//! Incremental API fetcher
//!
//! Walks the complaint search API offset page by offset page for a
//! received-date window. The API filters on `date_received_min`/`_max`;
//! the fetcher additionally drops records outside the window so callers
//! see exactly [start, end]. A failed page aborts the whole pull.

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::transform::parse_date;
use crate::types::{DateRange, JsonValue};
use tracing::{debug, info};

/// Fetcher for the paginated complaint search API
pub struct ApiFetcher {
    client: HttpClient,
    url: String,
    page_size: usize,
}

impl ApiFetcher {
    /// Create a fetcher for the given endpoint
    pub fn new(client: HttpClient, url: impl Into<String>, page_size: usize) -> Self {
        Self {
            client,
            url: url.into(),
            page_size,
        }
    }

    /// Fetch every record received within the window
    pub async fn fetch(&self, range: &DateRange) -> Result<Vec<JsonValue>> {
        info!("Fetching complaints received {range}");

        let mut records = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.fetch_page(range, offset).await?;
            let count = page.len();
            debug!("Page at offset {offset}: {count} records");

            records.extend(page.into_iter().filter(|record| in_range(record, range)));

            if count < self.page_size {
                break;
            }
            offset += count;
        }

        info!("Fetched {} records for {range}", records.len());
        Ok(records)
    }

    /// Fetch one page of results
    async fn fetch_page(&self, range: &DateRange, offset: usize) -> Result<Vec<JsonValue>> {
        let config = RequestConfig::new()
            .query("date_received_min", range.start().to_string())
            .query("date_received_max", range.end().to_string())
            .query("frm", offset.to_string())
            .query("size", self.page_size.to_string())
            .query("no_aggs", "true");

        let body: JsonValue = self
            .client
            .get_json_with_config(&self.url, config)
            .await
            .map_err(classify)?;

        let hits = body
            .get("hits")
            .and_then(|hits| hits.get("hits"))
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::schema("response missing 'hits.hits'"))?;

        hits.iter()
            .map(|hit| {
                hit.get("_source")
                    .cloned()
                    .ok_or_else(|| Error::schema("hit missing '_source'"))
            })
            .collect()
    }
}

/// Fold transport failures into the API error kind, keeping throttling distinct
fn classify(err: Error) -> Error {
    match err {
        Error::Throttled { .. } | Error::Schema { .. } => err,
        Error::HttpStatus { status, body } => Error::api(format!("HTTP {status}: {body}")),
        Error::Http(e) => Error::api(e.to_string()),
        other => other,
    }
}

/// Whether a record's received date falls inside the window
///
/// Records whose date is unparseable are kept; the transformer decides
/// their fate.
fn in_range(record: &JsonValue, range: &DateRange) -> bool {
    let date = record
        .get("date_received")
        .and_then(JsonValue::as_str)
        .and_then(parse_date);
    match date {
        Some(date) => range.contains(date),
        None => true,
    }
}
