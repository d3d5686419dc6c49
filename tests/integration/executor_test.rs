//! Executor failure-path integration tests.
//!
//! Tests how store problems surface as failed outcomes.

use super::common::{schemaless_store, two_asteroid_store};
use neo_explorer::catalog::QueryCatalog;
use neo_explorer::config::ConnectionConfig;
use neo_explorer::db::{DatabaseBackend, SqlxConnectionProvider};
use neo_explorer::error::ErrorKind;
use neo_explorer::filter::FilterSpecification;
use neo_explorer::query::{ExecutionOutcome, QueryExecutor};
use std::time::Duration;

#[tokio::test]
async fn test_missing_store_file_is_connection_failure() {
    let dir = tempfile::tempdir().unwrap();
    let provider =
        SqlxConnectionProvider::new(ConnectionConfig::sqlite(dir.path().join("absent.db")));
    let catalog = QueryCatalog::builtin().unwrap();
    let executor = QueryExecutor::new(&catalog, &provider);

    let outcome = executor.run_catalog("approach-count").await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Connection));
    // The store is never created as a side effect
    assert!(!dir.path().join("absent.db").exists());
}

#[tokio::test]
async fn test_sqlite_without_path_is_connection_failure() {
    let provider = SqlxConnectionProvider::new(ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        ..Default::default()
    });
    let catalog = QueryCatalog::builtin().unwrap();
    let executor = QueryExecutor::new(&catalog, &provider);

    let outcome = executor.run_filter(&FilterSpecification::default()).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Connection));
}

#[tokio::test]
async fn test_missing_table_is_statement_failure() {
    let store = schemaless_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);

    let outcome = executor.run_filter(&FilterSpecification::default()).await;

    match outcome {
        ExecutionOutcome::Failure { kind, message } => {
            assert_eq!(kind, ErrorKind::Statement);
            assert!(message.contains("close_approach") || message.contains("asteroids"));
        }
        other => panic!("Expected Failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_store_stays_usable_after_a_failed_statement() {
    let store = two_asteroid_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);

    let failed = executor.run_catalog("busiest-month").await;
    let succeeded = executor.run_catalog("faster-than-50k").await;

    assert_eq!(failed.error_kind(), Some(ErrorKind::Statement));
    assert!(succeeded.is_success());
}

#[tokio::test]
async fn test_generous_deadline_does_not_interfere() {
    let store = two_asteroid_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor =
        QueryExecutor::new(&catalog, &provider).with_deadline(Some(Duration::from_secs(30)));

    assert!(executor.run_catalog("top-fastest").await.is_success());
}

#[tokio::test]
async fn test_unreachable_mysql_is_connection_failure() {
    let provider = SqlxConnectionProvider::new(
        ConnectionConfig::from_connection_string("mysql://neo@127.0.0.1:1/nasa").unwrap(),
    );
    let catalog = QueryCatalog::builtin().unwrap();
    let executor =
        QueryExecutor::new(&catalog, &provider).with_deadline(Some(Duration::from_secs(10)));

    let kind = executor.run_catalog("approach-count").await.error_kind();

    assert!(
        matches!(kind, Some(ErrorKind::Connection) | Some(ErrorKind::Timeout)),
        "got {kind:?}"
    );
}
