//! HTTP client tests

use super::client::{HttpClient, HttpClientConfig, RequestConfig};
use crate::error::Error;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": {"total": 0}})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let body: serde_json::Value = client
        .get_json(&format!("{}/api/v1/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body["hits"]["total"], 0);
}

#[tokio::test]
async fn test_query_params_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("date_received_min", "2021-04-01"))
        .and(query_param("date_received_max", "2021-04-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let config = RequestConfig::new()
        .query("date_received_min", "2021-04-01")
        .query("date_received_max", "2021-04-02");

    let response = client
        .get_with_config(&format!("{}/search", mock_server.uri()), config)
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_default_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .header("accept", "application/json")
        .build();
    let client = HttpClient::with_config(config);

    let response = client
        .get(&format!("{}/data", mock_server.uri()))
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_429_maps_to_throttled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let err = client
        .get(&format!("{}/limited", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_throttled());
    assert!(matches!(
        err,
        Error::Throttled {
            retry_after_seconds: 30
        }
    ));
}

#[tokio::test]
async fn test_non_2xx_maps_to_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let err = client
        .get(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such thing");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let mock_server = MockServer::start().await;

    // Expect exactly one request: there is no retry loop.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let err = client
        .get(&format!("{}/flaky", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_base_url_joining() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/api/v1/", mock_server.uri()))
        .build();
    let client = HttpClient::with_config(config);

    // Relative path joins onto the base URL
    let response = client.get("/search").await.unwrap();
    assert!(response.status().is_success());

    // Absolute URLs bypass the base
    let response = client
        .get(&format!("{}/api/v1/search", mock_server.uri()))
        .await
        .unwrap();
    assert!(response.status().is_success());
}
