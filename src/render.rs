//! Plain-text and JSON rendering of execution outcomes.
//!
//! Renders query results as boxed tables with auto-sized columns, or as
//! JSON for scripting.

use crate::catalog::QueryCatalog;
use crate::db::QueryResult;
use crate::filter::CompiledStatement;
use crate::query::ExecutionOutcome;
use serde_json::json;
use std::str::FromStr;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Output format for the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Row count banner followed by a boxed table.
    #[default]
    Text,
    /// One JSON document per outcome.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Which path produced a result. Only the text form of an empty result
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    Catalog,
    Filter,
}

impl ResultOrigin {
    fn empty_message(&self) -> &'static str {
        match self {
            Self::Catalog => "No results found.",
            Self::Filter => "No asteroids found for selected filters.",
        }
    }
}

/// Renders an outcome in the requested format.
pub fn render_outcome(
    outcome: &ExecutionOutcome,
    origin: ResultOrigin,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => render_text(outcome, origin),
        OutputFormat::Json => render_json(outcome),
    }
}

/// Renders the catalog as a numbered list of ids and labels.
pub fn render_catalog(catalog: &QueryCatalog, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let width = catalog
                .entries()
                .iter()
                .map(|entry| entry.id.as_str().len())
                .max()
                .unwrap_or(0);
            catalog
                .labels()
                .map(|(id, label)| format!("{:>2}. {:<width$}  {}", id.ordinal(), id.as_str(), label))
                .collect::<Vec<_>>()
                .join("\n")
        }
        OutputFormat::Json => {
            let entries: Vec<_> = catalog
                .labels()
                .map(|(id, label)| json!({ "ordinal": id.ordinal(), "id": id.as_str(), "label": label }))
                .collect();
            serde_json::Value::Array(entries).to_string()
        }
    }
}

/// Renders a compiled statement without executing it.
pub fn render_compiled(statement: &CompiledStatement, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut lines = vec![statement.template.clone()];
            lines.extend(
                statement
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(i, value)| format!("  ?{} = {}", i + 1, value)),
            );
            lines.join("\n")
        }
        OutputFormat::Json => json!(statement).to_string(),
    }
}

fn render_text(outcome: &ExecutionOutcome, origin: ResultOrigin) -> String {
    match outcome {
        ExecutionOutcome::Success(result) if result.is_empty() => origin.empty_message().to_string(),
        ExecutionOutcome::Success(result) => {
            let mut lines = vec![format!(
                "Found {} record{}",
                result.row_count(),
                if result.row_count() == 1 { "" } else { "s" }
            )];
            lines.extend(ResultTable::new(result).render_to_lines());
            lines.join("\n")
        }
        ExecutionOutcome::Failure { kind, message } => format!("Error: {kind}: {message}"),
    }
}

fn render_json(outcome: &ExecutionOutcome) -> String {
    let document = match outcome {
        ExecutionOutcome::Success(result) => json!({
            "status": "success",
            "row_count": result.row_count(),
            "rows": result.rows,
        }),
        ExecutionOutcome::Failure { kind, message } => json!({
            "status": "failure",
            "kind": kind,
            "message": message,
        }),
    };
    document.to_string()
}

/// A query result laid out as a text table.
struct ResultTable<'a> {
    result: &'a QueryResult,
}

impl<'a> ResultTable<'a> {
    fn new(result: &'a QueryResult) -> Self {
        Self { result }
    }

    /// Calculates the optimal width for each column.
    fn calculate_column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .result
            .columns
            .iter()
            .map(|name| name.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.result.rows {
            for (i, name) in self.result.columns.iter().enumerate() {
                if let Some(value) = row.get(name) {
                    widths[i] = widths[i].max(value.to_display_string().chars().count());
                }
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let kept: String = s.chars().take(max_width - 3).collect();
            format!("{kept}...")
        }
    }

    fn render_to_lines(&self) -> Vec<String> {
        let widths = self.calculate_column_widths();
        let mut lines = Vec::with_capacity(self.result.rows.len() + 4);

        lines.push(Self::render_border(&widths, '┌', '┬', '┐'));
        let headers: Vec<String> = self.result.columns.clone();
        lines.push(Self::render_cells(&headers, &widths));
        lines.push(Self::render_border(&widths, '├', '┼', '┤'));

        for row in &self.result.rows {
            let cells: Vec<String> = self
                .result
                .columns
                .iter()
                .map(|name| {
                    row.get(name)
                        .map(|value| value.to_display_string())
                        .unwrap_or_default()
                })
                .collect();
            lines.push(Self::render_cells(&cells, &widths));
        }

        lines.push(Self::render_border(&widths, '└', '┴', '┘'));
        lines.push(format!(
            "{} row{} returned ({}ms)",
            self.result.row_count(),
            if self.result.row_count() == 1 { "" } else { "s" },
            self.result.execution_time.as_millis()
        ));

        lines
    }

    fn render_border(widths: &[usize], left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(&mid.to_string()))
    }

    fn render_cells(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!(" {:<width$} ", Self::truncate(cell, width)))
            .collect();
        format!("│{}│", padded.join("│"))
    }
}
