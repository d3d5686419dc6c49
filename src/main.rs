//! neo - Query near-Earth-object close-approach data.

mod cli;

use anyhow::Context;
use cli::{Cli, Command};
use neo_explorer::catalog::QueryCatalog;
use neo_explorer::config::{Config, ConnectionConfig};
use neo_explorer::db::{DatabaseBackend, SqlxConnectionProvider};
use neo_explorer::error::{NeoError, Result};
use neo_explorer::filter;
use neo_explorer::logging;
use neo_explorer::query::{ExecutionOutcome, QueryExecutor, StatementSource};
use neo_explorer::render::{self, ResultOrigin};
use std::process::ExitCode;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging(logging::DEFAULT_LEVEL);

    let cli = Cli::parse_args();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let catalog = QueryCatalog::builtin().context("Built-in query catalog is invalid")?;

    let (source, origin) = match &cli.command {
        Command::List => {
            println!("{}", render::render_catalog(&catalog, cli.format));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Run { id } => (StatementSource::Catalog(id), ResultOrigin::Catalog),
        Command::Filter(args) => {
            let compiled = filter::compile(&args.to_specification());
            if args.show_sql {
                println!("{}", render::render_compiled(&compiled, cli.format));
                return Ok(ExitCode::SUCCESS);
            }
            (StatementSource::Compiled(compiled), ResultOrigin::Filter)
        }
    };

    let outcome = execute(&cli, &catalog, source).await;
    println!("{}", render::render_outcome(&outcome, origin, cli.format));

    Ok(match outcome {
        ExecutionOutcome::Success(_) => ExitCode::SUCCESS,
        ExecutionOutcome::Failure { .. } => ExitCode::FAILURE,
    })
}

/// Loads configuration, resolves the connection and runs the statement.
///
/// Configuration problems are reported as failed outcomes like any other.
async fn execute(cli: &Cli, catalog: &QueryCatalog, source: StatementSource<'_>) -> ExecutionOutcome {
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let config = match Config::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => return e.into(),
    };

    let connection = match resolve_connection(cli, &config) {
        Ok(Some(connection)) => connection,
        Ok(None) => {
            return NeoError::connection(
                "No store connection configured. Use --url, --sqlite, --host or a [connections.default] entry",
            )
            .into()
        }
        Err(e) => return e.into(),
    };

    info!("Connection: {}", connection.display_string());
    let provider = SqlxConnectionProvider::new(connection);
    QueryExecutor::new(catalog, &provider)
        .with_deadline(cli.deadline(&config))
        .execute(source)
        .await
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// CLI flags are merged over the named (or default) connection, which is
/// itself filled in from `MYSQL_*` variables.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    let overrides = cli.to_connection_config()?;

    let base = match cli.connection_name() {
        Some(name) => Some(config.get_connection(Some(name)).cloned().ok_or_else(|| {
            NeoError::config(format!("Connection '{name}' not found in config file"))
        })?),
        None => config.get_connection(None).cloned(),
    };

    let mut connection = match (base, overrides) {
        (Some(mut base), Some(overrides)) => {
            base.merge(&overrides);
            Some(base)
        }
        (base, overrides) => overrides.or(base),
    };

    // Environment alone can describe a MySQL store
    if connection.is_none() && std::env::var("MYSQL_DATABASE").is_ok() {
        connection = Some(ConnectionConfig {
            port: DatabaseBackend::MySql.default_port(),
            ..Default::default()
        });
    }

    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
