//! Mock connection provider for testing.
//!
//! Returns scripted results without touching a real store, and records how
//! the executor used it: connections opened and closed, and every statement
//! submitted together with its bound parameters.

use super::{Connection, ConnectionProvider, QueryResult, Row, Value};
use crate::error::{NeoError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behaviour of a mock store.
#[derive(Debug, Clone)]
enum Script {
    Rows(Vec<Row>),
    FailOpen(String),
    FailFetch(String),
}

/// Usage counters shared between a mock provider and its connections.
#[derive(Debug, Default)]
pub struct MockStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    submitted: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockStats {
    /// Number of connections opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Statements submitted so far, with their parameters.
    pub fn submitted(&self) -> Vec<(String, Vec<Value>)> {
        self.submitted
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// A mock connection provider that returns predefined results.
#[derive(Debug, Clone)]
pub struct MockConnectionProvider {
    script: Script,
    delay: Option<Duration>,
    stats: Arc<MockStats>,
}

impl MockConnectionProvider {
    /// A store that answers every statement with `rows`.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self::scripted(Script::Rows(rows))
    }

    /// A store that answers every statement with no rows.
    pub fn empty() -> Self {
        Self::with_rows(Vec::new())
    }

    /// A store that cannot be reached.
    pub fn failing_open(message: impl Into<String>) -> Self {
        Self::scripted(Script::FailOpen(message.into()))
    }

    /// A store that accepts connections but rejects every statement.
    pub fn failing_fetch(message: impl Into<String>) -> Self {
        Self::scripted(Script::FailFetch(message.into()))
    }

    /// Delays every fetch by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the shared usage counters.
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    fn scripted(script: Script) -> Self {
        Self {
            script,
            delay: None,
            stats: Arc::new(MockStats::default()),
        }
    }
}

#[async_trait]
impl ConnectionProvider for MockConnectionProvider {
    async fn open(&self) -> Result<Box<dyn Connection>> {
        if let Script::FailOpen(message) = &self.script {
            return Err(NeoError::connection(message.clone()));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            script: self.script.clone(),
            delay: self.delay,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

struct MockConnection {
    script: Script,
    delay: Option<Duration>,
    stats: Arc<MockStats>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        if let Ok(mut submitted) = self.stats.submitted.lock() {
            submitted.push((sql.to_string(), params.to_vec()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Rows(rows) => Ok(QueryResult::with_rows(Vec::new(), rows.clone())
                .with_execution_time(Duration::from_millis(1))),
            Script::FailFetch(message) => Err(NeoError::statement(message.clone())),
            Script::FailOpen(message) => Err(NeoError::connection(message.clone())),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
