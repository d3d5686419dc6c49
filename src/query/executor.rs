//! Query execution.
//!
//! Runs either a catalog statement or a compiled filter statement against a
//! freshly opened connection and reports a uniform [`ExecutionOutcome`].
//! No error escapes this boundary.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::QueryCatalog;
use crate::db::{ConnectionProvider, QueryResult, Value};
use crate::error::{ErrorKind, NeoError, Result};
use crate::filter::{self, CompiledStatement, FilterSpecification};

/// What to execute.
#[derive(Debug, Clone)]
pub enum StatementSource<'a> {
    /// A catalog identifier (slug or ordinal).
    Catalog(&'a str),
    /// A compiled ad-hoc statement.
    Compiled(CompiledStatement),
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Statement executed; the result may be empty.
    Success(QueryResult),
    /// Statement could not be executed.
    Failure { kind: ErrorKind, message: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<NeoError> for ExecutionOutcome {
    fn from(error: NeoError) -> Self {
        Self::Failure {
            kind: error.kind(),
            message: error.detail(),
        }
    }
}

/// Query executor over a catalog and a connection provider.
pub struct QueryExecutor<'a> {
    catalog: &'a QueryCatalog,
    provider: &'a dyn ConnectionProvider,
    deadline: Option<Duration>,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor without a deadline.
    pub fn new(catalog: &'a QueryCatalog, provider: &'a dyn ConnectionProvider) -> Self {
        Self {
            catalog,
            provider,
            deadline: None,
        }
    }

    /// Bounds each execution, from connect through fetch, by `deadline`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Executes a statement and converts every failure into an outcome.
    pub async fn execute(&self, source: StatementSource<'_>) -> ExecutionOutcome {
        let start = Instant::now();

        let (label, sql, params) = match source {
            StatementSource::Catalog(id) => match self.catalog.lookup(id) {
                Ok(entry) => (
                    entry.id.to_string(),
                    entry.sql().to_string(),
                    Vec::new(),
                ),
                Err(e) => {
                    warn!("Catalog lookup failed: {e}");
                    return e.into();
                }
            },
            StatementSource::Compiled(statement) => (
                "custom-filter".to_string(),
                statement.template,
                statement.parameters,
            ),
        };

        debug!(
            "Executing {} against {} with {} parameter(s)",
            label,
            self.provider.describe(),
            params.len()
        );

        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(&sql, &params))
                .await
                .unwrap_or(Err(NeoError::Timeout(deadline))),
            None => self.run(&sql, &params).await,
        };

        match result {
            Ok(query_result) => {
                info!(
                    "{} returned {} row(s) in {}ms",
                    label,
                    query_result.row_count(),
                    start.elapsed().as_millis()
                );
                ExecutionOutcome::Success(query_result)
            }
            Err(e) => {
                warn!("{} failed: {e}", label);
                e.into()
            }
        }
    }

    /// Executes a catalog entry.
    pub async fn run_catalog(&self, id: &str) -> ExecutionOutcome {
        self.execute(StatementSource::Catalog(id)).await
    }

    /// Compiles and executes an ad-hoc filter.
    pub async fn run_filter(&self, spec: &FilterSpecification) -> ExecutionOutcome {
        self.execute(StatementSource::Compiled(filter::compile(spec)))
            .await
    }

    /// Opens a connection, fetches, and releases the connection on both paths.
    async fn run(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.provider.open().await?;
        let fetched = conn.fetch_all(sql, params).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to release connection: {e}");
        }

        fetched
    }
}
