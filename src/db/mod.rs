//! Store access layer.
//!
//! Provides a trait-based interface for opening scoped connections and
//! running parameterized statements, allowing different backends (and test
//! doubles) to be used interchangeably by the executor.

mod mock;
mod mysql;
mod sqlite;
mod types;

pub use mock::{MockConnectionProvider, MockStats};
pub use mysql::MySqlStoreConnection;
pub use sqlite::SqliteStoreConnection;
pub use types::{QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }
}

/// A single open connection to the store.
///
/// Connections are acquired per execution and released with [`Connection::close`].
/// Dropping a connection without closing it also releases the underlying handle.
#[async_trait]
pub trait Connection: Send {
    /// Submits a statement with positionally bound parameters and fetches every row.
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Releases the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens connections to the store.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Opens a fresh connection.
    async fn open(&self) -> Result<Box<dyn Connection>>;

    /// Display-safe description of the target store.
    fn describe(&self) -> String;
}

/// Connection provider backed by the sqlx drivers.
///
/// Holds an explicit configuration; every `open` dials a new connection.
#[derive(Debug, Clone)]
pub struct SqlxConnectionProvider {
    config: ConnectionConfig,
}

impl SqlxConnectionProvider {
    /// Creates a provider for the given connection configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionProvider for SqlxConnectionProvider {
    async fn open(&self) -> Result<Box<dyn Connection>> {
        match self.config.backend {
            DatabaseBackend::MySql => {
                let conn = MySqlStoreConnection::connect(&self.config).await?;
                Ok(Box::new(conn))
            }
            DatabaseBackend::Sqlite => {
                let conn = SqliteStoreConnection::connect(&self.config).await?;
                Ok(Box::new(conn))
            }
        }
    }

    fn describe(&self) -> String {
        self.config.display_string()
    }
}

/// Phase of a store interaction, used to classify driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Connect,
    Fetch,
}

/// Maps a sqlx error raised during `phase` to a crate error.
///
/// Anything that goes wrong before a connection exists is a connection error.
/// After that, transport faults are still connection errors; everything the
/// store reports about the statement itself is a statement error.
fn map_sqlx_error(error: sqlx::Error, phase: Phase) -> crate::error::NeoError {
    use crate::error::NeoError;

    if phase == Phase::Connect {
        return NeoError::connection(error.to_string());
    }

    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => NeoError::connection(error.to_string()),
        sqlx::Error::Database(db_error) => NeoError::statement(db_error.message().to_string()),
        other => NeoError::statement(other.to_string()),
    }
}
