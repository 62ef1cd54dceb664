use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    ResultSet, Value,
    source::{AsyncRowSource, RowSource},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulatedRowSourceError {
    #[error("Query text is empty")]
    EmptyQuery,
    #[error("No result sets registered for query: '{0}'")]
    UnknownQuery(String),
}

/// In-memory row source that answers registered queries with canned result sets.
///
/// Every execution is recorded along with its parameters.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default)]
pub struct SimulatedRowSource {
    responses: BTreeMap<String, Vec<ResultSet>>,
    executed: Mutex<Vec<(String, Vec<Value>)>>,
}

impl SimulatedRowSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the result sets returned for `query`.
    #[must_use]
    pub fn with_response(mut self, query: impl Into<String>, sets: Vec<ResultSet>) -> Self {
        self.responses.insert(query.into(), sets);
        self
    }

    /// Every `(query, params)` pair executed so far, in order.
    ///
    /// # Panics
    ///
    /// * If the execution log `Mutex` was poisoned
    #[must_use]
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.lock().unwrap().clone()
    }

    fn respond(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<ResultSet>, SimulatedRowSourceError> {
        if query.trim().is_empty() {
            return Err(SimulatedRowSourceError::EmptyQuery);
        }

        self.executed
            .lock()
            .unwrap()
            .push((query.to_string(), params.to_vec()));

        let sets = self
            .responses
            .get(query)
            .cloned()
            .ok_or_else(|| SimulatedRowSourceError::UnknownQuery(query.to_string()))?;

        log::trace!("respond: {query:?} -> {} result sets", sets.len());

        Ok(sets)
    }
}

impl RowSource for SimulatedRowSource {
    type Error = SimulatedRowSourceError;

    fn execute(&self, query: &str, params: &[Value]) -> Result<Vec<ResultSet>, Self::Error> {
        self.respond(query, params)
    }
}

#[async_trait]
impl AsyncRowSource for SimulatedRowSource {
    type Error = SimulatedRowSourceError;

    async fn execute(
        &self,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<ResultSet>, Self::Error> {
        self.respond(query, params)
    }
}
