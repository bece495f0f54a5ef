//! Integration tests using mock HTTP servers
//!
//! Drives the full pipeline: fetch → transform → stage → warehouse.

use complaints_etl::error::Error;
use complaints_etl::fetch::{ApiFetcher, BulkFetcher};
use complaints_etl::http::HttpClient;
use complaints_etl::load::{DuckDbWarehouse, Loader, StageDestination, Warehouse};
use complaints_etl::transform::to_record_batch;
use complaints_etl::types::{DateRange, WriteDisposition};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

fn hit(id: u64, received: &str) -> serde_json::Value {
    json!({
        "_source": {
            "complaint_id": id.to_string(),
            "date_received": received,
            "product": "Credit card",
            "sub_product": "General-purpose credit card",
            "issue": "Fees or interest",
            "sub_issue": "Unexpected increase in interest rate",
            "company": "EXAMPLE CORP",
            "state": "FL",
            "zip": "33101",
            "consumer_consent": "Consent provided",
            "date_sent_to_company": received,
            "company_response": "Closed with monetary relief",
            "timely_response": "Yes",
            "disputed": "No"
        }
    })
}

const BULK_CSV: &str = "\
Date received,Product,Sub-product,Issue,Sub-issue,Company,State,ZIP code,Consumer consent provided?,Date sent to company,Company response to consumer,Timely response?,Consumer disputed?,Complaint ID
2021-03-01,Credit card,General-purpose credit card,Fees or interest,,EXAMPLE CORP,FL,33101,Consent provided,2021-03-02,Closed with explanation,Yes,No,1001
2021-03-02,Mortgage,FHA mortgage,Trouble during payment process,,OTHER CORP,NY,10001,Consent not provided,2021-03-03,In progress,Yes,,1002
2021-03-03,Debt collection,Credit card debt,Attempts to collect debt not owed,Debt is not yours,THIRD CORP,TX,73301,Consent withdrawn,2021-03-04,Closed,No,Yes,1003
";

fn bulk_archive() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("complaints.csv", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(BULK_CSV.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

// ============================================================================
// Bulk end-to-end: file method with no other flags
// ============================================================================

#[tokio::test]
async fn test_bulk_end_to_end_creates_table_with_all_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ccdb/complaints.csv.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(bulk_archive()),
        )
        .mount(&mock_server)
        .await;

    let fetcher = BulkFetcher::new(
        HttpClient::new(),
        format!("{}/ccdb/complaints.csv.zip", mock_server.uri()),
    );
    let records = fetcher.fetch().await.unwrap();
    let batch = to_record_batch(&records).unwrap();
    assert_eq!(batch.num_rows(), 3);

    let dir = tempfile::tempdir().unwrap();
    let stage = StageDestination::parse(dir.path().to_str().unwrap()).unwrap();
    let warehouse = DuckDbWarehouse::open(":memory:").unwrap();
    let loader = Loader::new(stage, Box::new(warehouse));

    let summary = loader
        .load(&batch, "consumer_complaints", WriteDisposition::Create)
        .await
        .unwrap();

    assert_eq!(summary.rows_staged, 3);
    assert_eq!(summary.table_rows, 3);
}

// ============================================================================
// Incremental end-to-end: single-day window appended to an existing table
// ============================================================================

#[tokio::test]
async fn test_api_end_to_end_appends_window_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .and(query_param("date_received_min", "2021-04-01"))
        .and(query_param("date_received_max", "2021-04-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"hits": [
                hit(2001, "2021-04-01"),
                hit(2002, "2021-04-02"),
                // Received outside the window; must not be loaded
                hit(2003, "2021-04-09")
            ]}
        })))
        .mount(&mock_server)
        .await;

    // Seed the table with an earlier load
    let dir = tempfile::tempdir().unwrap();
    let stage = StageDestination::parse(dir.path().to_str().unwrap()).unwrap();
    let warehouse = DuckDbWarehouse::open(":memory:").unwrap();
    let loader = Loader::new(stage, Box::new(warehouse));

    let seed = to_record_batch(&[hit(1001, "2021-03-01")["_source"].clone()]).unwrap();
    loader
        .load(&seed, "consumer_complaints", WriteDisposition::Create)
        .await
        .unwrap();

    let fetcher = ApiFetcher::new(
        HttpClient::new(),
        format!("{}/api/v1/", mock_server.uri()),
        100,
    );
    let range = DateRange::new(date("2021-04-01"), date("2021-04-02")).unwrap();
    let records = fetcher.fetch(&range).await.unwrap();
    assert_eq!(records.len(), 2);

    let batch = to_record_batch(&records).unwrap();
    let summary = loader
        .load(&batch, "consumer_complaints", WriteDisposition::Append)
        .await
        .unwrap();

    assert_eq!(summary.rows_staged, 2);
    assert_eq!(summary.table_rows, 3);
}

// ============================================================================
// Malformed response: schema error, no partial load
// ============================================================================

#[tokio::test]
async fn test_malformed_response_fails_without_partial_load() {
    let mock_server = MockServer::start().await;

    // Response shape changed upstream: no hits.hits
    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "complaints": [hit(3001, "2021-04-01")]
        })))
        .mount(&mock_server)
        .await;

    let warehouse = DuckDbWarehouse::open(":memory:").unwrap();

    let fetcher = ApiFetcher::new(
        HttpClient::new(),
        format!("{}/api/v1/", mock_server.uri()),
        100,
    );
    let range = DateRange::new(date("2021-04-01"), date("2021-04-02")).unwrap();
    let err = fetcher.fetch(&range).await.unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));

    // The failure happened before the load stage; the warehouse is untouched
    assert!(!warehouse.table_exists("consumer_complaints").unwrap());
}

// ============================================================================
// Record missing an expected field: schema error from the transformer
// ============================================================================

#[tokio::test]
async fn test_missing_field_in_records_is_schema_error() {
    let mock_server = MockServer::start().await;

    let mut source = hit(4001, "2021-04-01")["_source"].clone();
    source.as_object_mut().unwrap().remove("company");

    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hits": {"hits": [{"_source": source}]}})),
        )
        .mount(&mock_server)
        .await;

    let fetcher = ApiFetcher::new(
        HttpClient::new(),
        format!("{}/api/v1/", mock_server.uri()),
        100,
    );
    let range = DateRange::new(date("2021-04-01"), date("2021-04-02")).unwrap();
    let records = fetcher.fetch(&range).await.unwrap();

    let err = to_record_batch(&records).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { .. }));
}

// ============================================================================
// CLI argument surface
// ============================================================================

#[test]
fn test_cli_defaults_to_file_method() {
    use clap::Parser;
    use complaints_etl::cli::Cli;
    use complaints_etl::types::FetchMethod;

    let cli = Cli::try_parse_from(["complaints-etl"]).unwrap();
    assert_eq!(cli.method, FetchMethod::File);
    assert!(cli.start.is_none());
    assert!(cli.end.is_none());
}

#[test]
fn test_cli_parses_api_window() {
    use clap::Parser;
    use complaints_etl::cli::Cli;
    use complaints_etl::types::FetchMethod;

    let cli = Cli::try_parse_from([
        "complaints-etl",
        "--method",
        "api",
        "--start",
        "2021-04-01",
        "--end",
        "2021-04-02",
    ])
    .unwrap();

    assert_eq!(cli.method, FetchMethod::Api);
    assert_eq!(cli.start, Some(date("2021-04-01")));
    assert_eq!(cli.end, Some(date("2021-04-02")));
}

#[test]
fn test_cli_rejects_unknown_method() {
    use clap::Parser;
    use complaints_etl::cli::Cli;

    assert!(Cli::try_parse_from(["complaints-etl", "--method", "ftp"]).is_err());
}

#[test]
fn test_cli_rejects_malformed_date() {
    use clap::Parser;
    use complaints_etl::cli::Cli;

    assert!(
        Cli::try_parse_from(["complaints-etl", "--method", "api", "--start", "04/01/2021"])
            .is_err()
    );
}
