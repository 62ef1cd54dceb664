//! Conversion of single cells into typed column values.
//!
//! Every column target implements [`FromCell`]. Null handling happens before
//! any type-specific conversion: a null cell becomes [`FromCell::null_value`],
//! which is the type's default for plain targets and `None` for `Option<T>`.
//! A non-null cell must already hold exactly the requested runtime type; there
//! is no numeric widening and no string parsing.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{
    Row, Value,
    descriptor::{ScalarKind, TargetDescriptor},
};

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The cell holds a runtime type other than the requested one.
    #[error("Failed to convert value of type '{actual}' to type '{expected}'")]
    Mismatch {
        expected: String,
        actual: &'static str,
    },
    /// The row has no column with the requested name.
    #[error("Missing required value: '{0}'")]
    MissingColumn(String),
    /// Draining a binary stream failed.
    #[error("Failed to read stream: {0}")]
    Stream(#[from] std::io::Error),
}

impl ConversionError {
    #[must_use]
    pub fn mismatch(expected: &TargetDescriptor, actual: &Value) -> Self {
        Self::Mismatch {
            expected: expected.to_string(),
            actual: actual.type_name(),
        }
    }
}

/// A column type that can be produced from one cell.
pub trait FromCell: Sized {
    fn descriptor() -> TargetDescriptor;

    /// The value a null cell turns into.
    fn null_value() -> Self;

    /// Converts a non-null cell.
    ///
    /// # Errors
    ///
    /// * If the cell does not hold exactly this type
    fn from_value(value: &Value) -> Result<Self, ConversionError>;

    /// Converts a cell, applying the null policy first.
    ///
    /// # Errors
    ///
    /// * If the cell is non-null and does not hold exactly this type
    fn from_cell(value: &Value) -> Result<Self, ConversionError> {
        if value.is_null() {
            Ok(Self::null_value())
        } else {
            Self::from_value(value)
        }
    }

    /// Handles a lookup by name that found no column.
    ///
    /// # Errors
    ///
    /// * Unless the target is optional
    fn missing_column(column: &str) -> Result<Self, ConversionError> {
        Err(ConversionError::MissingColumn(column.to_string()))
    }
}

impl<T: FromCell> FromCell for Option<T> {
    fn descriptor() -> TargetDescriptor {
        T::descriptor().nullable()
    }

    fn null_value() -> Self {
        None
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        T::from_value(value).map(Some)
    }

    fn missing_column(_column: &str) -> Result<Self, ConversionError> {
        Ok(None)
    }
}

macro_rules! scalar_from_cell {
    ($($ty:ty => $variant:ident, $kind:ident, $null:expr);* $(;)?) => {
        $(
            impl FromCell for $ty {
                fn descriptor() -> TargetDescriptor {
                    TargetDescriptor::scalar(ScalarKind::$kind)
                }

                fn null_value() -> Self {
                    $null
                }

                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::$variant(inner) => Ok(*inner),
                        other => Err(ConversionError::mismatch(&Self::descriptor(), other)),
                    }
                }
            }
        )*
    };
}

scalar_from_cell!(
    i8 => Int8, I8, 0;
    i16 => Int16, I16, 0;
    i32 => Int32, I32, 0;
    i64 => Int64, I64, 0;
    u8 => UInt8, U8, 0;
    u16 => UInt16, U16, 0;
    u32 => UInt32, U32, 0;
    u64 => UInt64, U64, 0;
    f32 => Real32, F32, 0.0;
    f64 => Real64, F64, 0.0;
    bool => Bool, Bool, false;
    char => Char, Char, '\0';
    NaiveDateTime => DateTime, DateTime, NaiveDateTime::default();
);

#[cfg(feature = "decimal")]
scalar_from_cell!(rust_decimal::Decimal => Decimal, Decimal, rust_decimal::Decimal::ZERO);

#[cfg(feature = "uuid")]
scalar_from_cell!(uuid::Uuid => Uuid, Uuid, uuid::Uuid::nil());

impl FromCell for String {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::scalar(ScalarKind::String)
    }

    fn null_value() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(inner) => Ok(inner.clone()),
            other => Err(ConversionError::mismatch(&Self::descriptor(), other)),
        }
    }
}

/// Converts a cell reference into a target type.
pub trait ToValueType<T> {
    /// # Errors
    ///
    /// * If the value failed to convert
    fn to_value_type(self) -> Result<T, ConversionError>;
}

impl<T: FromCell> ToValueType<T> for &Value {
    fn to_value_type(self) -> Result<T, ConversionError> {
        T::from_cell(self)
    }
}

/// Named-column lookup with conversion.
pub trait ToValue {
    /// # Errors
    ///
    /// * If the column is missing and `T` is not optional
    /// * If the column's value failed to convert
    fn to_value<T: FromCell>(&self, column: &str) -> Result<T, ConversionError>;
}

impl ToValue for Row {
    fn to_value<T: FromCell>(&self, column: &str) -> Result<T, ConversionError> {
        get_value_type(self, column)
    }
}

/// Looks up `column` in `row` and converts it.
///
/// # Errors
///
/// * If the column is missing and `T` is not optional
/// * If the column's value failed to convert
pub fn get_value_type<T: FromCell>(row: &Row, column: &str) -> Result<T, ConversionError> {
    match row.get(column) {
        Some(inner) => inner.to_value_type(),
        None => T::missing_column(column),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::row;

    #[test_log::test]
    fn test_null_becomes_default_for_plain_targets() {
        assert_eq!(i32::from_cell(&Value::Null).unwrap(), 0);
        assert_eq!(u64::from_cell(&Value::Null).unwrap(), 0);
        assert!(!bool::from_cell(&Value::Null).unwrap());
        assert_eq!(char::from_cell(&Value::Null).unwrap(), '\0');
        assert_eq!(String::from_cell(&Value::Null).unwrap(), "");
        assert!(f64::from_cell(&Value::Null).unwrap().abs() < f64::EPSILON);
        assert_eq!(
            NaiveDateTime::from_cell(&Value::Null).unwrap(),
            NaiveDateTime::default()
        );
    }

    #[test_log::test]
    fn test_null_becomes_none_for_nullable_targets() {
        assert_eq!(Option::<i16>::from_cell(&Value::Null).unwrap(), None);
        assert_eq!(Option::<String>::from_cell(&Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i16>::from_cell(&Value::Int16(-4)).unwrap(),
            Some(-4)
        );
    }

    #[test_log::test]
    fn test_exact_type_is_required() {
        let err = i64::from_cell(&Value::Int32(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to convert value of type 'i32' to type 'i64'"
        );

        assert!(matches!(
            i32::from_cell(&Value::String("1".into())),
            Err(ConversionError::Mismatch { .. })
        ));
        assert!(matches!(
            f64::from_cell(&Value::Real32(1.0)),
            Err(ConversionError::Mismatch { .. })
        ));
        assert!(matches!(
            Option::<u8>::from_cell(&Value::Int8(1)),
            Err(ConversionError::Mismatch { .. })
        ));
    }

    #[cfg(feature = "decimal")]
    #[test_log::test]
    fn test_decimal_round_trips_exactly() {
        let value = rust_decimal::Decimal::new(12345, 2);

        assert_eq!(
            rust_decimal::Decimal::from_cell(&Value::Decimal(value)).unwrap(),
            value
        );
        assert_eq!(
            rust_decimal::Decimal::from_cell(&Value::Null).unwrap(),
            rust_decimal::Decimal::ZERO
        );
    }

    #[cfg(feature = "uuid")]
    #[test_log::test]
    fn test_uuid_null_is_nil() {
        assert_eq!(
            uuid::Uuid::from_cell(&Value::Null).unwrap(),
            uuid::Uuid::nil()
        );

        let id = uuid::Uuid::new_v4();
        assert_eq!(Option::<uuid::Uuid>::from_cell(&Value::Uuid(id)).unwrap(), Some(id));
    }

    #[test_log::test]
    fn test_to_value_reads_named_column() {
        let row = row!["id" => 7_u32, "name" => "Bob"];

        assert_eq!(row.to_value::<u32>("id").unwrap(), 7);
        assert_eq!(row.to_value::<String>("name").unwrap(), "Bob");
        assert_eq!(row.to_value::<Option<String>>("missing").unwrap(), None);
        assert!(matches!(
            row.to_value::<String>("missing"),
            Err(ConversionError::MissingColumn(column)) if column == "missing"
        ));
    }

    #[test_log::test]
    fn test_to_value_type_on_cell_reference() {
        let value = &Value::UInt64(123);

        assert_eq!(ToValueType::<u64>::to_value_type(value).unwrap(), 123_u64);
        assert_eq!(
            ToValueType::<Option<u64>>::to_value_type(value).unwrap(),
            Some(123_u64)
        );
    }
}
