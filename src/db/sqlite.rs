//! SQLite store connection.
//!
//! Used for local snapshots of the close-approach dataset and for
//! end-to-end tests. Opens a single `SqliteConnection` per execution.

use super::{map_sqlx_error, Connection, Phase, QueryResult, Row, Value};
use crate::config::ConnectionConfig;
use crate::error::{NeoError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection as SqlxConnection, Sqlite};
use sqlx::{Row as SqlxRow, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::debug;

/// A scoped connection to a SQLite database file.
#[derive(Debug)]
pub struct SqliteStoreConnection {
    conn: SqliteConnection,
}

impl SqliteStoreConnection {
    /// Opens the database file named by `config.path`.
    ///
    /// The file must already exist; a missing file is a connection error
    /// rather than a silently created empty store.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let path = config
            .path
            .as_ref()
            .ok_or_else(|| NeoError::config("SQLite connections require a database path"))?;

        let conn = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .connect()
            .await
            .map_err(|e| {
                NeoError::connection(format!(
                    "Cannot open SQLite database {}: {e}",
                    path.display()
                ))
            })?;

        debug!("Opened SQLite database {}", path.display());
        Ok(Self { conn })
    }
}

#[async_trait]
impl Connection for SqliteStoreConnection {
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
            .map_err(|e| NeoError::connection(format!("Failed to close SQLite connection: {e}")))
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
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

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            (
                col.name().to_string(),
                convert_value(row, i, col.type_info().name()),
            )
        })
        .collect()
}

/// Converts a single column value.
///
/// SQLite is dynamically typed: the declared column type only decides
/// between booleans, dates and plain storage classes. Everything else is
/// decoded from the storage class of the value itself.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let storage = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match declared.to_uppercase().as_str() {
        "BOOLEAN" | "BOOL" => {
            if let Ok(b) = row.try_get::<bool, _>(index) {
                return Value::Bool(b);
            }
        }
        "DATE" => {
            if let Ok(d) = row.try_get::<NaiveDate, _>(index) {
                return Value::Date(d);
            }
        }
        _ => {}
    }

    match storage.as_str() {
        "INTEGER" | "INT8" | "INT" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),
        "REAL" | "FLOAT" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        _ => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
