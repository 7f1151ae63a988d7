//! promote module provides the type-promotion lattice applied when the
//! same field is observed with incompatible types across records.

use crate::types::DataType;

/// Outcome of consulting the lattice for an `(old, new)` observation.
#[derive(Debug, PartialEq, Clone)]
pub enum Promotion {
    /// The old type already covers the new observation.
    Unchanged,
    /// The field must move to the given type.
    Upgraded(DataType),
    /// The old type is outside the upgradable set; the field is left
    /// as-is.
    NotUpgradable,
}

/// Whether a source type participates in promotion at all.
///
/// Anything else (Boolean, String, Binary, the nested types, Variant)
/// keeps its first-observed type; merges of nested children still
/// proceed around it.
pub fn is_upgradable(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Date32
            | DataType::Time64Ns
            | DataType::TimestampMs
            | DataType::TimestampUs
    )
}

/// Compute the join of an existing column type and a newly observed
/// one.
///
/// The result depends only on the two type tags: integers widen to
/// Int64 among themselves and to Float64 when a float appears, floats
/// widen among themselves, Date32 lifts to TimestampUs when a timestamp
/// appears, and every remaining conflict lands on String. A promotion
/// never reverts.
pub fn promote(old: &DataType, new: &DataType) -> Promotion {
    if old == new {
        return Promotion::Unchanged;
    }
    if !is_upgradable(old) {
        return Promotion::NotUpgradable;
    }

    let target = match old {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt64 => {
            if new.is_integer() {
                DataType::Int64
            } else if new.is_float() {
                DataType::Float64
            } else {
                DataType::String
            }
        }
        DataType::Float16 => match new {
            DataType::Float32 => DataType::Float32,
            DataType::Float64 => DataType::Float64,
            _ => DataType::String,
        },
        DataType::Float32 => match new {
            DataType::Float64 => DataType::Float64,
            _ if new.is_integer() || *new == DataType::Float16 => DataType::Float32,
            _ => DataType::String,
        },
        DataType::Float64 => {
            if new.is_integer() || new.is_float() {
                DataType::Float64
            } else {
                DataType::String
            }
        }
        DataType::TimestampMs | DataType::TimestampUs => {
            if new.is_timestamp() || *new == DataType::Date32 {
                old.clone()
            } else {
                DataType::String
            }
        }
        DataType::Date32 => {
            if new.is_timestamp() {
                DataType::TimestampUs
            } else {
                DataType::String
            }
        }
        DataType::Time64Ns => {
            if *new == DataType::Date32 || new.is_timestamp() {
                DataType::String
            } else {
                DataType::Time64Ns
            }
        }
        _ => return Promotion::NotUpgradable,
    };

    if target == *old {
        Promotion::Unchanged
    } else {
        Promotion::Upgraded(target)
    }
}
