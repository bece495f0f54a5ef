//! Declared complaint table schema
//!
//! The warehouse table mirrors this column order. API fields default to
//! strings upstream, so types are enforced here rather than inferred.

use arrow::datatypes::{DataType, Field, Schema};

/// Canonical field names, in column order
pub const FIELD_NAMES: &[&str] = &[
    "complaint_id",
    "date_received",
    "product",
    "sub_product",
    "issue",
    "sub_issue",
    "company",
    "state",
    "zip",
    "consumer_consent",
    "date_sent_to_company",
    "company_response",
    "timely_response",
    "disputed",
];

/// Fields a row cannot load without
pub const REQUIRED_FIELDS: &[&str] = &["complaint_id", "date_received"];

/// The declared Arrow schema for the complaint table
pub fn complaint_schema() -> Schema {
    Schema::new(vec![
        Field::new("complaint_id", DataType::Int64, false),
        Field::new("date_received", DataType::Date32, false),
        Field::new("product", DataType::Utf8, true),
        Field::new("sub_product", DataType::Utf8, true),
        Field::new("issue", DataType::Utf8, true),
        Field::new("sub_issue", DataType::Utf8, true),
        Field::new("company", DataType::Utf8, true),
        Field::new("state", DataType::Utf8, true),
        Field::new("zip", DataType::Utf8, true),
        Field::new("consumer_consent", DataType::Boolean, true),
        Field::new("date_sent_to_company", DataType::Date32, true),
        Field::new("company_response", DataType::Utf8, true),
        Field::new("timely_response", DataType::Boolean, true),
        Field::new("disputed", DataType::Boolean, true),
    ])
}
