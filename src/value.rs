//! value module provides the in-memory representation of a decoded
//! record: a finite tree of string-keyed structs, ordered lists and
//! scalar leaves.

use crate::{Error, ErrorKind, Result};

/// A decoded record value.
///
/// This is the shape the engine consumes; any decoder that can produce
/// it (JSON, key-value records, host objects) can feed the unifier.
/// Struct keys preserve the insertion order of the source record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent or null leaf. Its column type cannot be evaluated.
    Null,
    /// True or False.
    Bool(bool),
    /// 8-bit signed integer.
    Int8(i8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 8-bit unsigned integer.
    UInt8(u8),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit IEEE 754 floating point number.
    Float32(f32),
    /// 64-bit IEEE 754 floating point number.
    Float64(f64),
    /// UTF-8 character sequence.
    String(String),
    /// Arbitrary-length byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Ordered mapping of unique field names to values.
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Decode a record from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_str(s)?;
        Ok(Value::from(json))
    }

    /// Decode a record from JSON bytes.
    pub fn from_json_bytes(b: &[u8]) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_slice(b)?;
        Ok(Value::from(json))
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The fields of a struct value, or an error for any other shape.
    ///
    /// The engine requires a struct at the root of every record; a null
    /// root reports [`ErrorKind::UndefinedInput`] and everything else
    /// [`ErrorKind::InvalidInput`].
    pub fn as_record(&self) -> Result<&[(String, Value)]> {
        match self {
            Value::Struct(fields) => Ok(fields),
            Value::Null => Err(Error::new(ErrorKind::UndefinedInput, "record is null")),
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("record root must be a struct, found {}", other.kind_name()),
            )),
        }
    }

    /// Short name of the value's shape, for error context.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt8(_) => "uint8",
            Value::UInt16(_) => "uint16",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                // Integer representations are preferred; a number that
                // only parses as float becomes Float64.
                if let Some(i) = n.as_i64() {
                    Value::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt64(u)
                } else {
                    Value::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Struct(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
