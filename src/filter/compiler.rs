//! Filter compiler.
//!
//! Builds a single parameterized SELECT from an ordered list of predicate
//! fragments. Each fragment appends its SQL text and its parameters in the
//! same step, so placeholders and parameters cannot drift apart.

use super::{FilterSpecification, HazardousFilter};
use crate::db::Value;
use crate::error::Result;
use crate::safety::SqlValidator;
use serde::Serialize;

const BASE_SELECT: &str = "SELECT a.name, c.close_approach_date, c.relative_velocity_kmph, \
c.miss_distance_km, c.miss_distance_lunar, c.astronomical, \
a.estimated_diameter_min_km, a.estimated_diameter_max_km, \
a.is_potentially_hazardous_asteroid \
FROM asteroids a JOIN close_approach c ON a.id = c.neo_reference_id";

const CLOSE_APPROACH_DATE: &str = "c.close_approach_date";
const RELATIVE_VELOCITY: &str = "c.relative_velocity_kmph";
const DIAMETER_MIN: &str = "a.estimated_diameter_min_km";
const DIAMETER_MAX: &str = "a.estimated_diameter_max_km";
const ASTRONOMICAL: &str = "c.astronomical";
const MISS_DISTANCE_LUNAR: &str = "c.miss_distance_lunar";
const HAZARDOUS: &str = "a.is_potentially_hazardous_asteroid";

/// A statement template paired with its positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub template: String,
    pub parameters: Vec<Value>,
}

impl CompiledStatement {
    /// Counts the `?` placeholders in the template.
    pub fn placeholder_count(&self) -> Result<usize> {
        SqlValidator::new().count_placeholders(&self.template)
    }
}

/// One WHERE-clause fragment over a fixed column.
///
/// Column names are compile-time constants; only the bound values come from
/// the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column BETWEEN ? AND ?`
    Between {
        column: &'static str,
        low: Value,
        high: Value,
    },
    /// `column >= ?`
    AtLeast { column: &'static str, value: Value },
    /// `column <= ?`
    AtMost { column: &'static str, value: Value },
    /// `column = TRUE` or `column = FALSE`, with no placeholder.
    IsFlag { column: &'static str, value: bool },
}

impl Predicate {
    /// Renders the fragment and the parameters it binds, in placeholder order.
    fn render(self) -> (String, Vec<Value>) {
        match self {
            Self::Between { column, low, high } => {
                (format!("{column} BETWEEN ? AND ?"), vec![low, high])
            }
            Self::AtLeast { column, value } => (format!("{column} >= ?"), vec![value]),
            Self::AtMost { column, value } => (format!("{column} <= ?"), vec![value]),
            Self::IsFlag { column, value } => {
                let literal = if value { "TRUE" } else { "FALSE" };
                (format!("{column} = {literal}"), Vec::new())
            }
        }
    }
}

/// Accumulates predicates onto a base SELECT.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    template: String,
    parameters: Vec<Value>,
    has_where: bool,
}

impl StatementBuilder {
    /// Starts from a base statement with no WHERE clause.
    pub fn new(base: &str) -> Self {
        Self {
            template: base.to_string(),
            parameters: Vec::new(),
            has_where: false,
        }
    }

    /// Appends one predicate, joined with `AND` to any previous ones.
    pub fn push(&mut self, predicate: Predicate) -> &mut Self {
        let (fragment, parameters) = predicate.render();
        self.template
            .push_str(if self.has_where { " AND " } else { " WHERE " });
        self.template.push_str(&fragment);
        self.parameters.extend(parameters);
        self.has_where = true;
        self
    }

    /// Appends the predicate if there is one.
    pub fn push_opt(&mut self, predicate: Option<Predicate>) -> &mut Self {
        if let Some(predicate) = predicate {
            self.push(predicate);
        }
        self
    }

    pub fn finish(self) -> CompiledStatement {
        CompiledStatement {
            template: self.template,
            parameters: self.parameters,
        }
    }
}

impl HazardousFilter {
    /// The hazardous-flag predicate, or `None` for [`HazardousFilter::All`].
    pub fn predicate(&self) -> Option<Predicate> {
        match self {
            Self::All => None,
            Self::Yes => Some(Predicate::IsFlag {
                column: HAZARDOUS,
                value: true,
            }),
            Self::No => Some(Predicate::IsFlag {
                column: HAZARDOUS,
                value: false,
            }),
        }
    }
}

/// Compiles a filter specification into one parameterized statement.
///
/// Predicates are appended in a fixed order: date, velocity, diameter
/// (lower estimate, then upper estimate), astronomical units, lunar distance,
/// then the hazardous flag. Ranges are not validated.
pub fn compile(spec: &FilterSpecification) -> CompiledStatement {
    let mut builder = StatementBuilder::new(BASE_SELECT);

    builder
        .push(Predicate::Between {
            column: CLOSE_APPROACH_DATE,
            low: Value::Date(spec.date_range.start),
            high: Value::Date(spec.date_range.end),
        })
        .push(Predicate::Between {
            column: RELATIVE_VELOCITY,
            low: Value::Float(spec.velocity_range.min),
            high: Value::Float(spec.velocity_range.max),
        })
        .push(Predicate::AtLeast {
            column: DIAMETER_MIN,
            value: Value::Float(spec.diameter_range.min),
        })
        .push(Predicate::AtMost {
            column: DIAMETER_MAX,
            value: Value::Float(spec.diameter_range.max),
        })
        .push(Predicate::Between {
            column: ASTRONOMICAL,
            low: Value::Float(spec.astronomical_unit_range.min),
            high: Value::Float(spec.astronomical_unit_range.max),
        })
        .push(Predicate::Between {
            column: MISS_DISTANCE_LUNAR,
            low: Value::Float(spec.lunar_distance_range.min),
            high: Value::Float(spec.lunar_distance_range.max),
        })
        .push_opt(spec.hazardous.predicate());

    builder.finish()
}
