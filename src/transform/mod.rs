//! Type coercion from raw records to the declared complaint schema
//!
//! Both fetchers hand over loosely-typed JSON objects (every bulk CSV field
//! is a string; the API mixes strings and numbers). Coercion parses each
//! declared column, drops rows whose required fields are missing or
//! unparseable, and nulls optional fields that fail to parse.

mod coerce;
mod schema;

pub use coerce::{parse_date, parse_flag, to_record_batch};
pub use schema::{complaint_schema, FIELD_NAMES, REQUIRED_FIELDS};
