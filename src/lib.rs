//! neo-explorer - Query near-Earth-object close-approach data.
//!
//! This library exposes the core modules for use by the `neo` binary and
//! integration tests.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod query;
pub mod render;
pub mod safety;
