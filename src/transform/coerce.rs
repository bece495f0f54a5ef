//! Row coercion into the declared schema

use super::schema::{complaint_schema, FIELD_NAMES};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use arrow::array::{ArrayBuilder, ArrayRef, BooleanBuilder, Date32Builder, Int64Builder, StringBuilder};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

/// Convert raw records into a typed RecordBatch
///
/// Rows without a parseable `complaint_id` and `date_received` are dropped
/// and counted. An empty input yields an empty batch; an input where no row
/// survives, or where a declared column never appears, is a schema error.
pub fn to_record_batch(records: &[JsonValue]) -> Result<RecordBatch> {
    let schema = Arc::new(complaint_schema());

    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    check_columns(records)?;

    let mut complaint_id = Int64Builder::new();
    let mut date_received = Date32Builder::new();
    let mut product = StringBuilder::new();
    let mut sub_product = StringBuilder::new();
    let mut issue = StringBuilder::new();
    let mut sub_issue = StringBuilder::new();
    let mut company = StringBuilder::new();
    let mut state = StringBuilder::new();
    let mut zip = StringBuilder::new();
    let mut consumer_consent = BooleanBuilder::new();
    let mut date_sent_to_company = Date32Builder::new();
    let mut company_response = StringBuilder::new();
    let mut timely_response = BooleanBuilder::new();
    let mut disputed = BooleanBuilder::new();

    let mut dropped = 0usize;

    for record in records {
        let Some(obj) = record.as_object() else {
            dropped += 1;
            continue;
        };

        let Some(id) = parse_id(obj.get("complaint_id")) else {
            dropped += 1;
            continue;
        };
        let Some(received) = string_field(obj, "date_received")
            .as_deref()
            .and_then(parse_date)
        else {
            dropped += 1;
            continue;
        };

        complaint_id.append_value(id);
        date_received.append_value(days_since_epoch(received));
        product.append_option(string_field(obj, "product"));
        sub_product.append_option(string_field(obj, "sub_product"));
        issue.append_option(string_field(obj, "issue"));
        sub_issue.append_option(string_field(obj, "sub_issue"));
        company.append_option(string_field(obj, "company"));
        state.append_option(string_field(obj, "state"));
        zip.append_option(string_field(obj, "zip"));
        consumer_consent.append_option(
            string_field(obj, "consumer_consent")
                .as_deref()
                .and_then(parse_consent),
        );
        date_sent_to_company.append_option(
            string_field(obj, "date_sent_to_company")
                .as_deref()
                .and_then(parse_date)
                .map(days_since_epoch),
        );
        company_response.append_option(string_field(obj, "company_response"));
        timely_response.append_option(
            string_field(obj, "timely_response")
                .as_deref()
                .and_then(parse_flag),
        );
        disputed.append_option(string_field(obj, "disputed").as_deref().and_then(parse_flag));
    }

    if complaint_id.is_empty() {
        return Err(Error::schema(format!(
            "no rows survived coercion ({dropped} of {} dropped); input format likely changed",
            records.len()
        )));
    }

    if dropped > 0 {
        warn!(
            "Dropped {dropped} of {} rows missing required fields",
            records.len()
        );
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(complaint_id.finish()),
        Arc::new(date_received.finish()),
        Arc::new(product.finish()),
        Arc::new(sub_product.finish()),
        Arc::new(issue.finish()),
        Arc::new(sub_issue.finish()),
        Arc::new(company.finish()),
        Arc::new(state.finish()),
        Arc::new(zip.finish()),
        Arc::new(consumer_consent.finish()),
        Arc::new(date_sent_to_company.finish()),
        Arc::new(company_response.finish()),
        Arc::new(timely_response.finish()),
        Arc::new(disputed.finish()),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Verify every declared column appears in at least one record
fn check_columns(records: &[JsonValue]) -> Result<()> {
    for name in FIELD_NAMES {
        let present = records
            .iter()
            .filter_map(JsonValue::as_object)
            .any(|obj| obj.contains_key(*name));
        if !present {
            return Err(Error::missing_column(*name));
        }
    }
    Ok(())
}

/// Parse a received/sent date, with or without a time component
///
/// Accepts `2021-04-01`, `2021-04-01T12:00:00-05:00`, and the slash form
/// `04/01/2021` seen in older bulk exports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(prefix) = s.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%m/%d/%Y") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a Yes/No flag
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// Parse the consumer consent phrasing into a boolean
fn parse_consent(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "consent provided" => Some(true),
        "consent not provided" | "consent withdrawn" => Some(false),
        _ => None,
    }
}

/// Parse a complaint ID from either a JSON number or a string
fn parse_id(value: Option<&JsonValue>) -> Option<i64> {
    match value? {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a field as a non-empty string, stringifying numbers
fn string_field(obj: &JsonObject, key: &str) -> Option<String> {
    match obj.get(key)? {
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Days since the Unix epoch, the Date32 representation
fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch")).num_days() as i32
}
