//! Untyped cells, rows, and result sets as produced by a row source.

use std::{
    fmt,
    io::{Read, Seek},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDateTime;

/// Readable, rewindable payload carried by [`Value::Stream`].
pub trait StreamSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> StreamSource for T {}

/// Shared handle to a binary stream held by a row.
///
/// Rows are immutable, but draining a stream needs `&mut` access to it, so the
/// source sits behind a mutex. Cloning the handle shares the same stream.
#[derive(Clone)]
pub struct StreamHandle {
    inner: Arc<Mutex<Box<dyn StreamSource>>>,
}

impl StreamHandle {
    #[must_use]
    pub fn new(source: impl StreamSource + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(source))),
        }
    }

    /// Runs `f` with exclusive access to the underlying stream.
    ///
    /// A reader that panicked earlier does not lock the stream out; callers
    /// seek before reading, so a half-read source is still usable.
    pub fn with_source<R>(&self, f: impl FnOnce(&mut dyn StreamSource) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **guard)
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("shared", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One untyped cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Real32(f32),
    Real64(f64),
    #[cfg(feature = "decimal")]
    Decimal(rust_decimal::Decimal),
    Char(char),
    DateTime(NaiveDateTime),
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    String(String),
    Bytes(Vec<u8>),
    Chars(Vec<char>),
    Stream(StreamHandle),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the runtime type this cell carries, as reported in conversion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "i8",
            Self::Int16(_) => "i16",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::UInt8(_) => "u8",
            Self::UInt16(_) => "u16",
            Self::UInt32(_) => "u32",
            Self::UInt64(_) => "u64",
            Self::Real32(_) => "f32",
            Self::Real64(_) => "f64",
            #[cfg(feature = "decimal")]
            Self::Decimal(_) => "Decimal",
            Self::Char(_) => "char",
            Self::DateTime(_) => "NaiveDateTime",
            #[cfg(feature = "uuid")]
            Self::Uuid(_) => "Uuid",
            Self::String(_) => "String",
            Self::Bytes(_) => "Vec<u8>",
            Self::Chars(_) => "Vec<char>",
            Self::Stream(_) => "stream",
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(val: Option<T>) -> Self {
        val.map_or(Self::Null, std::convert::Into::into)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(val: $ty) -> Self {
                    Self::$variant(val)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Real32,
    f64 => Real64,
    char => Char,
    NaiveDateTime => DateTime,
    String => String,
    Vec<u8> => Bytes,
    Vec<char> => Chars,
    StreamHandle => Stream,
);

#[cfg(feature = "decimal")]
value_from!(rust_decimal::Decimal => Decimal);

#[cfg(feature = "uuid")]
value_from!(uuid::Uuid => Uuid);

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Self::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Self::String(val.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(val: &[u8]) -> Self {
        Self::Bytes(val.to_vec())
    }
}

/// One row of a result set: ordered `(column name, cell)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Looks up a column by exact name. When a name repeats, the first one wins.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|c| c.0 == column_name)
            .map(|c| &c.1)
    }

    /// The first column of the row, if any.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.columns.first().map(|(name, value)| (name.as_str(), value))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Builds a [`Row`] from `"column" => value` pairs.
///
/// ```rust
/// use switchy_materialize::{row, Value};
///
/// let row = row!["id" => 1_i64, "name" => "Alice", "deleted" => Value::Null];
/// assert_eq!(row.get("id"), Some(&Value::Int64(1)));
/// ```
#[macro_export]
macro_rules! row {
    ($($name:expr => $value:expr),* $(,)?) => {
        $crate::Row::new(vec![$((($name).to_string(), $crate::Value::from($value))),*])
    };
}

/// Ordered rows produced by one statement.
pub type ResultSet = Vec<Row>;

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn test_row_get_returns_first_matching_column() {
        let row = Row::new(vec![
            ("a".to_string(), Value::Int32(1)),
            ("a".to_string(), Value::Int32(2)),
        ]);

        assert_eq!(row.get("a"), Some(&Value::Int32(1)));
        assert_eq!(row.get("A"), None);
    }

    #[test_log::test]
    fn test_row_first_ignores_column_name() {
        let row = row!["whatever" => 5_u16, "other" => "x"];

        assert_eq!(row.first(), Some(("whatever", &Value::UInt16(5))));
        assert_eq!(Row::default().first(), None);
    }

    #[test_log::test]
    fn test_from_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(3_i32)), Value::Int32(3));
    }

    #[test_log::test]
    fn test_type_name_reports_runtime_type() {
        assert_eq!(Value::from("x").type_name(), "String");
        assert_eq!(Value::from(vec![1_u8]).type_name(), "Vec<u8>");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test_log::test]
    fn test_stream_handle_equality_is_identity() {
        let a = StreamHandle::new(Cursor::new(vec![1_u8]));
        let b = StreamHandle::new(Cursor::new(vec![1_u8]));

        assert_eq!(a, a.clone());
        assert!(a != b);
    }
}
