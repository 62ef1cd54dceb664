//! Mapping of a whole result set onto one element type.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    MaterializeError, Row, Value,
    binary::ByteStream,
    coerce::{ConversionError, FromCell},
    descriptor::TargetDescriptor,
    record::{Record, RecordShape, shape_of},
};

type ConvertFn<T> = fn(&Value) -> Result<T, ConversionError>;

/// How rows become elements of type `T`.
pub enum Target<T> {
    /// Each row's first cell is converted, regardless of its column name.
    Column {
        descriptor: TargetDescriptor,
        convert: ConvertFn<T>,
    },
    /// Each row is materialized as a record.
    Record(Arc<RecordShape<T>>),
}

impl<T: FromCell> Target<T> {
    #[must_use]
    pub fn column() -> Self {
        Self::Column {
            descriptor: T::descriptor(),
            convert: T::from_cell,
        }
    }
}

impl<T: Record> Target<T> {
    #[must_use]
    pub fn record() -> Self {
        Self::Record(shape_of::<T>())
    }
}

impl<T: 'static> Target<T> {
    #[must_use]
    pub fn descriptor(&self) -> TargetDescriptor {
        match self {
            Self::Column { descriptor, .. } => descriptor.clone(),
            Self::Record(shape) => shape.descriptor(),
        }
    }
}

/// An element type a result set can be mapped onto.
pub trait Materialize: Sized + 'static {
    fn target() -> Target<Self>;
}

macro_rules! column_materialize {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Materialize for $ty {
                fn target() -> Target<Self> {
                    Target::column()
                }
            }
        )*
    };
}

column_materialize!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    bool,
    char,
    NaiveDateTime,
    String,
    Vec<u8>,
    Vec<char>,
    ByteStream,
);

#[cfg(feature = "decimal")]
column_materialize!(rust_decimal::Decimal);

#[cfg(feature = "uuid")]
column_materialize!(uuid::Uuid);

impl<T: FromCell + 'static> Materialize for Option<T> {
    fn target() -> Target<Self> {
        Target::column()
    }
}

/// Converts the first cell of `row`. A row without columns reads as null.
pub(crate) fn convert_first<T>(row: &Row, convert: ConvertFn<T>) -> Result<T, MaterializeError> {
    match row.first() {
        Some((column, cell)) => convert(cell).map_err(|e| MaterializeError::conversion(column, e)),
        None => convert(&Value::Null).map_err(|e| MaterializeError::conversion("", e)),
    }
}

/// Maps every row of `rows` onto `T`, preserving row order.
///
/// Scalar and binary targets read each row's first column; record targets
/// resolve their construction strategy from the first row and reuse it for
/// the rest. Zero rows produce an empty collection.
///
/// # Errors
///
/// * If any cell failed to convert
/// * If a record target cannot be constructed from the columns
pub fn map_one<T: Materialize>(rows: &[Row]) -> Result<Vec<T>, MaterializeError> {
    match T::target() {
        Target::Column { convert, .. } => rows
            .iter()
            .map(|row| convert_first(row, convert))
            .collect(),
        Target::Record(shape) => {
            let Some(first) = rows.first() else {
                return Ok(vec![]);
            };
            let strategy = shape.resolve(first)?;

            rows.iter()
                .map(|row| shape.materialize(strategy, row))
                .collect()
        }
    }
}

/// The descriptor `map_one::<T>` works from.
#[must_use]
pub fn descriptor_of<T: Materialize>() -> TargetDescriptor {
    T::target().descriptor()
}
