//! Ad-hoc filter specifications and their compilation to SQL.
//!
//! A [`FilterSpecification`] captures the analyst's constraints as typed
//! values. [`compile`] turns it into one parameterized statement.

mod compiler;

pub use compiler::{compile, CompiledStatement, Predicate, StatementBuilder};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NeoError;

/// A closed numeric interval `[min, max]`.
///
/// `min <= max` is not enforced; an inverted range simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// A closed date interval `[start, end]`. `start <= end` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Three-way selector on the potentially-hazardous flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardousFilter {
    #[default]
    All,
    Yes,
    No,
}

impl HazardousFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl fmt::Display for HazardousFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardousFilter {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" => Ok(Self::No),
            _ => Err(NeoError::config(format!(
                "Invalid hazardous filter: {s}. Expected: all, yes, or no"
            ))),
        }
    }
}

/// The analyst's ad-hoc constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpecification {
    pub date_range: DateRange,
    /// Relative velocity in km/h.
    pub velocity_range: NumericRange,
    /// Estimated diameter in km. `min` bounds the lower estimate and `max`
    /// bounds the upper estimate.
    pub diameter_range: NumericRange,
    pub astronomical_unit_range: NumericRange,
    pub lunar_distance_range: NumericRange,
    #[serde(default)]
    pub hazardous: HazardousFilter,
}

impl Default for FilterSpecification {
    /// The dashboard's initial control values: calendar year 2025 and wide ranges.
    fn default() -> Self {
        Self {
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            ),
            velocity_range: NumericRange::new(0.0, 100_000.0),
            diameter_range: NumericRange::new(0.0, 5.0),
            astronomical_unit_range: NumericRange::new(0.0, 0.5),
            lunar_distance_range: NumericRange::new(0.0, 100.0),
            hazardous: HazardousFilter::All,
        }
    }
}
