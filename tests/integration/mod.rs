//! Integration tests for neo-explorer.

pub mod cli_test;
pub mod executor_test;
pub mod filter_test;
pub mod mysql_test;
