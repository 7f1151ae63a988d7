//! datatype module provides the definition of the column types a field
//! can take, and the schema snapshot exported to callers.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::Serialize;

/// A column type inferred for a field.
///
/// The set is closed: every leaf the walker classifies and every result
/// of a promotion is drawn from it. All column types are nullable.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum DataType {
    /// No evidence of a type yet; never exported.
    Null,
    /// True or False.
    Boolean,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 16-bit IEEE 754 floating point number.
    ///
    /// Never produced by classification; participates in the lattice so
    /// that records decoded from half-precision sources unify cleanly.
    Float16,
    /// 32-bit IEEE 754 floating point number.
    Float32,
    /// 64-bit IEEE 754 floating point number.
    Float64,
    /// Arbitrary-length character sequence, encoded with UTF-8.
    ///
    /// String is the top of the promotion lattice: once a field becomes
    /// String, further observations never change it.
    String,
    /// Arbitrary-length byte sequence.
    Binary,
    /// Calendar date without timezone or time, as days since the UNIX
    /// epoch.
    Date32,
    /// Time of day without date or timezone, as nanoseconds since
    /// midnight.
    Time64Ns,
    /// An exact point in time with millisecond precision, stored as
    /// UTC.
    TimestampMs,
    /// A date and time of day with microsecond precision and no
    /// timezone.
    TimestampUs,
    /// Homogeneous ordered sequence of the element type.
    List(Box<DataType>),
    /// Ordered sequence of named, uniquely-keyed, nullable fields.
    Struct(Vec<Field>),
    /// Placeholder element type for lists whose elements do not share a
    /// type. Once a list becomes `List(Variant)` it stays so.
    Variant,
}

impl DataType {
    /// Whether this is a signed or unsigned integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Whether this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
    }

    /// Whether this is a timestamp type of any precision.
    pub fn is_timestamp(&self) -> bool {
        matches!(self, DataType::TimestampMs | DataType::TimestampUs)
    }

    /// Whether this is a nested type.
    pub fn is_nested(&self) -> bool {
        matches!(self, DataType::List(_) | DataType::Struct(_))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Null => write!(f, "null"),
            DataType::Boolean => write!(f, "bool"),
            DataType::Int8 => write!(f, "int8"),
            DataType::Int16 => write!(f, "int16"),
            DataType::Int32 => write!(f, "int32"),
            DataType::Int64 => write!(f, "int64"),
            DataType::UInt8 => write!(f, "uint8"),
            DataType::UInt16 => write!(f, "uint16"),
            DataType::UInt32 => write!(f, "uint32"),
            DataType::UInt64 => write!(f, "uint64"),
            DataType::Float16 => write!(f, "float16"),
            DataType::Float32 => write!(f, "float32"),
            DataType::Float64 => write!(f, "float64"),
            DataType::String => write!(f, "string"),
            DataType::Binary => write!(f, "binary"),
            DataType::Date32 => write!(f, "date32"),
            DataType::Time64Ns => write!(f, "time64[ns]"),
            DataType::TimestampMs => write!(f, "timestamp[ms, tz=UTC]"),
            DataType::TimestampUs => write!(f, "timestamp[us]"),
            DataType::List(element) => write!(f, "list<item: {element}, nullable>"),
            DataType::Struct(fields) => {
                write!(
                    f,
                    "struct<{}>",
                    fields
                        .iter()
                        .map(|field| format!("{}: {}", field.name, field.data_type))
                        .join(", ")
                )
            }
            DataType::Variant => write!(f, "variant"),
        }
    }
}

/// A named, nullable field of a struct or schema.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Field {
    /// Field name, unique among its siblings.
    pub name: String,
    /// Column type of the field.
    pub data_type: DataType,
}

impl Field {
    /// Create a field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A snapshot of the inferred schema: the ordered top-level fields of
/// the tree at the time it was taken.
///
/// Field order is the insertion order of first appearance and is stable
/// across successive snapshots of the same tree.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create a schema from its top-level fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Return the fields of the schema.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a top-level field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.fields
                .iter()
                .map(|field| format!("{}: {}", field.name, field.data_type))
                .join(", ")
        )
    }
}

/// Why a field is still pending rather than typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PendingKind {
    /// The only observed value was null.
    UnknownLeaf,
    /// The only observed list had no elements to classify.
    EmptyList,
    /// The only observed object had no typed fields.
    EmptyStruct,
}

impl Display for PendingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingKind::UnknownLeaf => {
                write!(f, "could not determine type of unpopulated field")
            }
            PendingKind::EmptyList => {
                write!(f, "could not determine element type of empty list")
            }
            PendingKind::EmptyStruct => write!(f, "object has no typed fields"),
        }
    }
}
