//! classify module provides the leaf classifier: the mapping from a
//! scalar value to a column type, including the string heuristics for
//! dates, times, timestamps and quoted scalars.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::DataType;
use crate::unifier::Options;
use crate::value::Value;

// Compiled once per process and shared read-only across engine
// instances.
static TIMESTAMP_MATCHERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // ISO 8601
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap(),
        // RFC 3339 with a space instead of T
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap(),
        // Datetime format with dashes
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap(),
        Regex::new(
            r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{1,2}:\d{1,2}(\.\d{1,6})? *(([+-]\d{1,2}(:\d{1,2})?)|Z|UTC)?$",
        )
        .unwrap(),
    ]
});

static DATE_MATCHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{1,2}:\d{1,2}(\.\d{1,6})?$").unwrap());

static INTEGER_MATCHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?\d+$").unwrap());

static FLOAT_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").unwrap());

const BOOL_VALUES: [&str; 2] = ["true", "false"];

/// Map a scalar value to a column type.
///
/// Returns `None` for null, which the walker parks as a pending field.
/// Nested values are not scalars and also return `None`; the walker
/// descends into them instead.
pub(crate) fn classify_scalar(value: &Value, options: &Options) -> Option<DataType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(DataType::Boolean),
        Value::Int8(_) => Some(DataType::Int8),
        Value::Int16(_) => Some(DataType::Int16),
        Value::Int32(_) => Some(DataType::Int32),
        Value::Int64(_) => Some(DataType::Int64),
        Value::UInt8(_) => Some(DataType::UInt8),
        Value::UInt16(_) => Some(DataType::UInt16),
        Value::UInt32(_) => Some(DataType::UInt32),
        Value::UInt64(_) => Some(DataType::UInt64),
        Value::Float32(_) => Some(DataType::Float32),
        Value::Float64(_) => Some(DataType::Float64),
        Value::Bytes(_) => Some(DataType::Binary),
        Value::String(s) => Some(classify_string(s, options)),
        Value::List(_) | Value::Struct(_) => None,
    }
}

/// String classification order: timestamps, then date, then time, then
/// the quoted-scalar heuristics; first match wins.
fn classify_string(s: &str, options: &Options) -> DataType {
    if options.infer_time_units {
        if TIMESTAMP_MATCHERS.iter().any(|m| m.is_match(s)) {
            return DataType::TimestampUs;
        }
        if DATE_MATCHER.is_match(s) {
            return DataType::Date32;
        }
        if TIME_MATCHER.is_match(s) {
            return DataType::Time64Ns;
        }
    }
    if !options.quoted_values_are_strings {
        if BOOL_VALUES.contains(&s) {
            return DataType::Boolean;
        }
        if INTEGER_MATCHER.is_match(s) {
            return DataType::Int64;
        }
        if FLOAT_MATCHER.is_match(s) {
            return DataType::Float64;
        }
    }
    DataType::String
}
