//! Materialization of untyped query result rows into typed Rust values.
//!
//! A row source yields result sets of [`Row`]s whose cells are untyped
//! [`Value`]s. This crate turns them into:
//!
//! * collections of scalars, optional scalars and binary payloads ([`map_one`]),
//! * collections of records populated by constructor or member assignment
//!   ([`Record`], usually derived),
//! * tuples of collections, one per result set ([`map_many`]),
//! * single-row scalar lookups that tell "no row" from "null" ([`query_optional`]).
//!
//! ```rust
//! use switchy_materialize::{Record, map_one, row};
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Track {
//!     pub id: i64,
//!     pub title: String,
//!     pub rating: Option<f32>,
//! }
//!
//! let rows = vec![
//!     row!["id" => 1_i64, "title" => "Intro", "rating" => None::<f32>],
//!     row!["id" => 2_i64, "title" => "Outro", "rating" => 4.5_f32],
//! ];
//!
//! let tracks = map_one::<Track>(&rows).unwrap();
//! assert_eq!(tracks[1].rating, Some(4.5));
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

extern crate self as switchy_materialize;

pub mod binary;
pub mod coerce;
pub mod descriptor;
pub mod dispatch;
pub mod mapper;
pub mod optional;
pub mod record;
#[cfg(feature = "simulator")]
pub mod simulator;
pub mod source;
pub mod value;

use thiserror::Error;

pub use binary::ByteStream;
pub use coerce::{ConversionError, FromCell, ToValue, ToValueType};
pub use descriptor::{Access, TargetDescriptor};
pub use dispatch::{MaterializeMany, map_many};
pub use mapper::{Materialize, Target, descriptor_of, map_one};
pub use optional::{OptionalScalar, query_optional};
pub use record::{Arguments, Record, RecordShape, describe, materialize_row, param};
pub use source::{AsyncRowSource, QueryError, RowSource};
pub use value::{ResultSet, Row, StreamHandle, Value};

#[cfg(feature = "derive")]
pub use switchy_materialize_macros::Record;

#[derive(Debug, Error)]
pub enum MaterializeError {
    /// A cell could not be converted to its target type.
    #[error("Column '{column}' failed to convert: {source}")]
    Conversion {
        column: String,
        source: ConversionError,
    },
    /// A record could be built neither by constructor nor by member assignment.
    #[error("Cannot construct '{record}': {reason}")]
    Construction {
        record: &'static str,
        reason: String,
    },
    /// The number of result sets does not match the number of requested types.
    #[error("Expected {expected} result sets but got {actual}")]
    Arity { expected: usize, actual: usize },
}

impl MaterializeError {
    #[must_use]
    pub fn conversion(column: &str, source: ConversionError) -> Self {
        Self::Conversion {
            column: column.to_string(),
            source,
        }
    }
}
