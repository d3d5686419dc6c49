//! SQL parsing and validation logic.
//!
//! Uses sqlparser-rs with the MySQL dialect, which shares the `?`
//! placeholder syntax with SQLite.

use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{NeoError, Result};

use super::{StatementProfile, StatementType};

/// SQL validator that parses statements and inspects their shape.
#[derive(Debug)]
pub struct SqlValidator {
    dialect: MySqlDialect,
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlValidator {
    /// Creates a new SQL validator.
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Parses `sql`, which must hold exactly one statement, and profiles it.
    pub fn profile(&self, sql: &str) -> Result<StatementProfile> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| NeoError::statement(format!("SQL parse error: {e}")))?;

        let statement = match statements.as_slice() {
            [statement] => statement,
            [] => return Err(NeoError::statement("Empty SQL statement")),
            _ => {
                return Err(NeoError::statement(format!(
                    "Expected a single statement, found {}",
                    statements.len()
                )))
            }
        };

        Ok(StatementProfile {
            statement_type: classify_statement(statement),
            placeholders: self.count_placeholders(sql)?,
        })
    }

    /// Counts positional placeholders in `sql`, ignoring `?` inside literals.
    pub fn count_placeholders(&self, sql: &str) -> Result<usize> {
        let tokens = Tokenizer::new(&self.dialect, sql)
            .tokenize()
            .map_err(|e| NeoError::statement(format!("SQL tokenize error: {e}")))?;

        Ok(tokens
            .iter()
            .filter(|token| matches!(token, Token::Placeholder(_)))
            .count())
    }
}

fn classify_statement(statement: &Statement) -> StatementType {
    match statement {
        Statement::Query(query) if is_read_only_query(query) => StatementType::Query,
        Statement::Query(_) => StatementType::ModifyingQuery,
        other => StatementType::Other(
            other
                .to_string()
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase(),
        ),
    }
}

/// Checks CTEs and the body for data-modifying operations.
fn is_read_only_query(query: &Query) -> bool {
    let ctes_read_only = query
        .with
        .as_ref()
        .map_or(true, |with| {
            with.cte_tables
                .iter()
                .all(|cte| is_read_only_query(&cte.query))
        });

    ctes_read_only && is_read_only_set_expr(&query.body)
}

fn is_read_only_set_expr(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(_) | SetExpr::Values(_) => true,
        SetExpr::Query(query) => is_read_only_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            is_read_only_set_expr(left) && is_read_only_set_expr(right)
        }
        // Conservative default: INSERT/UPDATE bodies and anything newer
        _ => false,
    }
}
