//! Single-row scalar queries that distinguish "no row" from "null value".

use crate::{MaterializeError, Row, coerce::FromCell, mapper::convert_first};

/// Result of a single-row scalar query.
///
/// `present` is `false` only when the result set had no rows; `value` then
/// holds the target's null value. A single null cell yields `present == true`
/// with the null value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalScalar<T> {
    pub present: bool,
    pub value: T,
}

impl<T> OptionalScalar<T> {
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        self.present.then_some(self.value)
    }
}

/// Reads the first column of the first row of `rows`.
///
/// Rows after the first and columns after the first are ignored.
///
/// # Errors
///
/// * If the first cell failed to convert to `T`
pub fn query_optional<T: FromCell>(rows: &[Row]) -> Result<OptionalScalar<T>, MaterializeError> {
    let Some(row) = rows.first() else {
        return Ok(OptionalScalar {
            present: false,
            value: T::null_value(),
        });
    };

    Ok(OptionalScalar {
        present: true,
        value: convert_first(row, T::from_cell)?,
    })
}
