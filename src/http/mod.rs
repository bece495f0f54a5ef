//! HTTP client
//!
//! A thin wrapper over reqwest shared by both fetchers. There is no retry
//! or backoff: a throttled response (429) and any other non-2xx status are
//! surfaced immediately as errors and abort the run.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};

#[cfg(test)]
mod tests;
