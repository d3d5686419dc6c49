//! MySQL store connection.
//!
//! Provides the `MySqlStoreConnection` struct that implements the `Connection`
//! trait for the production close-approach database using sqlx.

use super::{map_sqlx_error, Connection, Phase, QueryResult, Row, Value};
use crate::config::ConnectionConfig;
use crate::error::{NeoError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection as SqlxConnection};
use sqlx::{Row as SqlxRow, TypeInfo};
use std::time::Instant;
use tracing::debug;

/// A scoped connection to a MySQL server.
#[derive(Debug)]
pub struct MySqlStoreConnection {
    conn: MySqlConnection,
}

impl MySqlStoreConnection {
    /// Dials the server described by `config`. No retries are attempted.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let database = config
            .database
            .as_deref()
            .ok_or_else(|| NeoError::config("Database name is required"))?;

        let mut options = MySqlConnectOptions::new()
            .host(config.host.as_deref().unwrap_or("localhost"))
            .port(config.port)
            .database(database);
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        debug!("Connecting to {}", config.display_string());

        let conn = options
            .connect()
            .await
            .map_err(|e| map_connection_error(e, config))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl Connection for MySqlStoreConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let start = Instant::now();

        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_value(query, value));

        let rows = query
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| map_sqlx_error(e, Phase::Fetch))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = rows.iter().map(convert_row).collect();

        Ok(QueryResult::with_rows(columns, rows).with_execution_time(start.elapsed()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.conn
            .close()
            .await
            .map_err(|e| NeoError::connection(format!("Failed to close MySQL connection: {e}")))
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.as_str()),
        Value::Date(d) => query.bind(*d),
        Value::Bytes(b) => query.bind(b.as_slice()),
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|col| {
            (
                col.name().to_string(),
                convert_value(row, col.ordinal(), col.type_info().name()),
            )
        })
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let type_name = type_name.to_uppercase();

    if type_name.ends_with("UNSIGNED") {
        return row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .and_then(|v| i64::try_from(v).ok())
            .map(Value::Int)
            .unwrap_or(Value::Null);
    }

    match type_name.as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // Binary protocol sends DECIMAL as its textual representation.
        "DECIMAL" => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),

        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(Value::Null),

        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try to get as string
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> NeoError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        NeoError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        NeoError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        NeoError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        NeoError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        map_sqlx_error(error, Phase::Connect)
    }
}
