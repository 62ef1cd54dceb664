//! Entry points that execute a query against a row source and materialize the result.
//!
//! The row source owns connections, execution and query validation. These
//! functions only hand it the query text and parameters and map whatever
//! result sets come back.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    MaterializeError, ResultSet, Row, Value,
    coerce::FromCell,
    dispatch::{MaterializeMany, map_many},
    mapper::{Materialize, map_one},
    optional::{OptionalScalar, query_optional},
};

/// Synchronous producer of result sets.
pub trait RowSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes `query`, returning one result set per statement in execution order.
    ///
    /// # Errors
    ///
    /// * If the query failed to execute
    fn execute(&self, query: &str, params: &[Value]) -> Result<Vec<ResultSet>, Self::Error>;
}

/// Asynchronous producer of result sets.
#[async_trait]
pub trait AsyncRowSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes `query`, returning one result set per statement in execution order.
    ///
    /// # Errors
    ///
    /// * If the query failed to execute
    async fn execute(&self, query: &str, params: &[Value])
    -> Result<Vec<ResultSet>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum QueryError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Source(E),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

fn first_set(sets: &[ResultSet]) -> &[Row] {
    sets.first().map(Vec::as_slice).unwrap_or_default()
}

/// Executes `query` and maps its first result set onto `T`.
///
/// A query that returns no result sets maps as zero rows.
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the result set failed to map onto `T`
pub fn query<T: Materialize, S: RowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<Vec<T>, QueryError<S::Error>> {
    log::debug!("query: executing {query:?} with {} params", params.len());
    let sets = source.execute(query, params).map_err(QueryError::Source)?;

    Ok(map_one(first_set(&sets))?)
}

/// Executes `query` and maps each of its result sets onto the matching element of `M`.
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the number of result sets differs from the arity of `M`
/// * If any result set failed to map
pub fn query_many<M: MaterializeMany, S: RowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<M::Output, QueryError<S::Error>> {
    log::debug!("query_many: executing {query:?} with {} params", params.len());
    let sets = source.execute(query, params).map_err(QueryError::Source)?;

    Ok(map_many::<M>(&sets)?)
}

/// Executes `query` and reads the first column of its first row, if any.
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the first cell failed to convert to `T`
pub fn query_first_optional<T: FromCell, S: RowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<OptionalScalar<T>, QueryError<S::Error>> {
    log::debug!(
        "query_first_optional: executing {query:?} with {} params",
        params.len()
    );
    let sets = source.execute(query, params).map_err(QueryError::Source)?;

    Ok(query_optional(first_set(&sets))?)
}

/// Async counterpart of [`query`].
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the result set failed to map onto `T`
pub async fn query_async<T: Materialize, S: AsyncRowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<Vec<T>, QueryError<S::Error>> {
    log::debug!(
        "query_async: executing {query:?} with {} params",
        params.len()
    );
    let sets = source
        .execute(query, params)
        .await
        .map_err(QueryError::Source)?;

    Ok(map_one(first_set(&sets))?)
}

/// Async counterpart of [`query_many`].
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the number of result sets differs from the arity of `M`
/// * If any result set failed to map
pub async fn query_many_async<M: MaterializeMany, S: AsyncRowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<M::Output, QueryError<S::Error>> {
    log::debug!(
        "query_many_async: executing {query:?} with {} params",
        params.len()
    );
    let sets = source
        .execute(query, params)
        .await
        .map_err(QueryError::Source)?;

    Ok(map_many::<M>(&sets)?)
}

/// Async counterpart of [`query_first_optional`].
///
/// # Errors
///
/// * If the row source failed to execute the query
/// * If the first cell failed to convert to `T`
pub async fn query_first_optional_async<T: FromCell, S: AsyncRowSource + ?Sized>(
    source: &S,
    query: &str,
    params: &[Value],
) -> Result<OptionalScalar<T>, QueryError<S::Error>> {
    log::debug!(
        "query_first_optional_async: executing {query:?} with {} params",
        params.len()
    );
    let sets = source
        .execute(query, params)
        .await
        .map_err(QueryError::Source)?;

    Ok(query_optional(first_set(&sets))?)
}
