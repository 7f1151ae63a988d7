//! to_arrow module provides the convert functions from the engine's
//! in-memory schema to an arrow schema.

use std::sync::Arc;

use arrow_schema::DataType as ArrowDataType;
use arrow_schema::Field as ArrowField;
use arrow_schema::Schema as ArrowSchema;
use arrow_schema::TimeUnit;

use crate::error::Error;
use crate::error::ErrorKind;
use crate::types::{DataType, Field, Schema};

impl TryFrom<&Schema> for ArrowSchema {
    type Error = Error;

    fn try_from(value: &Schema) -> Result<Self, Self::Error> {
        let fields = value
            .fields()
            .iter()
            .map(ArrowField::try_from)
            .collect::<Result<Vec<ArrowField>, Error>>()?;

        Ok(ArrowSchema::new(fields))
    }
}

impl TryFrom<&Field> for ArrowField {
    type Error = Error;

    fn try_from(value: &Field) -> Result<Self, Self::Error> {
        Ok(ArrowField::new(
            value.name.clone(),
            (&value.data_type).try_into()?,
            true,
        ))
    }
}

impl TryFrom<&DataType> for ArrowDataType {
    type Error = Error;

    fn try_from(value: &DataType) -> Result<Self, Self::Error> {
        match value {
            DataType::Null => Ok(ArrowDataType::Null),
            DataType::Boolean => Ok(ArrowDataType::Boolean),
            DataType::Int8 => Ok(ArrowDataType::Int8),
            DataType::Int16 => Ok(ArrowDataType::Int16),
            DataType::Int32 => Ok(ArrowDataType::Int32),
            DataType::Int64 => Ok(ArrowDataType::Int64),
            DataType::UInt8 => Ok(ArrowDataType::UInt8),
            DataType::UInt16 => Ok(ArrowDataType::UInt16),
            DataType::UInt32 => Ok(ArrowDataType::UInt32),
            DataType::UInt64 => Ok(ArrowDataType::UInt64),
            DataType::Float16 => Ok(ArrowDataType::Float16),
            DataType::Float32 => Ok(ArrowDataType::Float32),
            DataType::Float64 => Ok(ArrowDataType::Float64),
            DataType::String => Ok(ArrowDataType::Utf8),
            DataType::Binary => Ok(ArrowDataType::Binary),
            DataType::Date32 => Ok(ArrowDataType::Date32),
            DataType::Time64Ns => Ok(ArrowDataType::Time64(TimeUnit::Nanosecond)),
            DataType::TimestampMs => Ok(ArrowDataType::Timestamp(
                TimeUnit::Millisecond,
                Some("UTC".into()),
            )),
            DataType::TimestampUs => Ok(ArrowDataType::Timestamp(TimeUnit::Microsecond, None)),
            DataType::List(element) => {
                let item = ArrowField::new("item", element.as_ref().try_into()?, true);
                Ok(ArrowDataType::List(Arc::new(item)))
            }
            DataType::Struct(fields) => {
                let mut arrow_fields = Vec::with_capacity(fields.len());
                for f in fields {
                    arrow_fields.push(ArrowField::try_from(f)?);
                }
                Ok(ArrowDataType::Struct(arrow_fields.into()))
            }
            DataType::Variant => Err(Error::new(
                ErrorKind::InvalidInput,
                "variant columns have no stable arrow representation",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_into_arrow_schema() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new(
                "results",
                DataType::List(Box::new(DataType::Struct(vec![Field::new(
                    "name",
                    DataType::String,
                )]))),
            ),
            Field::new("seen", DataType::TimestampUs),
        ]);

        let arrow_schema = ArrowSchema::try_from(&schema).unwrap();

        assert_eq!(arrow_schema.fields().len(), 3);
        assert_eq!(arrow_schema.fields()[0].name(), "id");
        assert_eq!(arrow_schema.fields()[0].data_type(), &ArrowDataType::Int64);
        assert!(arrow_schema.fields()[0].is_nullable());
        assert_eq!(arrow_schema.fields()[1].name(), "results");
        match arrow_schema.fields()[1].data_type() {
            ArrowDataType::List(item) => match item.data_type() {
                ArrowDataType::Struct(fields) => {
                    assert_eq!(fields.len(), 1);
                    assert_eq!(fields[0].name(), "name");
                    assert_eq!(fields[0].data_type(), &ArrowDataType::Utf8);
                }
                other => panic!("expected struct item, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            arrow_schema.fields()[2].data_type(),
            &ArrowDataType::Timestamp(TimeUnit::Microsecond, None)
        );
    }

    #[test]
    fn test_variant_is_rejected() {
        let err = ArrowDataType::try_from(&DataType::Variant).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
