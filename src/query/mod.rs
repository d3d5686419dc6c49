//! Query execution for neo-explorer.
//!
//! This module isolates statement execution and outcome reporting from the
//! command-line front end.

pub mod executor;

pub use executor::{ExecutionOutcome, QueryExecutor, StatementSource};
