//! Catalog of named analytical queries.
//!
//! The catalog is a statement registry: every [`QueryId`] resolves to exactly
//! one closed SQL statement that takes no parameters. It is built once at
//! startup, validated, and never mutated afterwards.

use crate::error::{NeoError, Result};
use crate::safety::SqlValidator;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const APPROACHES: &str = "FROM asteroids a JOIN close_approach c ON a.id = c.neo_reference_id";

/// Stable identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryId {
    ApproachCount,
    AvgVelocity,
    TopFastest,
    HazardousFrequent,
    BusiestMonth,
    FastestApproach,
    LargestDiameter,
    ClosestApproachTrend,
    ClosestDistance,
    FasterThan50k,
    MonthlyApproachCount,
    Brightest,
    HazardBreakdown,
    WithinOneLunarDistance,
    WithinFiveHundredthsAu,
}

impl QueryId {
    /// Every id, in catalog order.
    pub const ALL: [QueryId; 15] = [
        Self::ApproachCount,
        Self::AvgVelocity,
        Self::TopFastest,
        Self::HazardousFrequent,
        Self::BusiestMonth,
        Self::FastestApproach,
        Self::LargestDiameter,
        Self::ClosestApproachTrend,
        Self::ClosestDistance,
        Self::FasterThan50k,
        Self::MonthlyApproachCount,
        Self::Brightest,
        Self::HazardBreakdown,
        Self::WithinOneLunarDistance,
        Self::WithinFiveHundredthsAu,
    ];

    /// Kebab-case slug used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproachCount => "approach-count",
            Self::AvgVelocity => "avg-velocity",
            Self::TopFastest => "top-fastest",
            Self::HazardousFrequent => "hazardous-frequent",
            Self::BusiestMonth => "busiest-month",
            Self::FastestApproach => "fastest-approach",
            Self::LargestDiameter => "largest-diameter",
            Self::ClosestApproachTrend => "closest-approach-trend",
            Self::ClosestDistance => "closest-distance",
            Self::FasterThan50k => "faster-than-50k",
            Self::MonthlyApproachCount => "monthly-approach-count",
            Self::Brightest => "brightest",
            Self::HazardBreakdown => "hazard-breakdown",
            Self::WithinOneLunarDistance => "within-one-ld",
            Self::WithinFiveHundredthsAu => "within-005-au",
        }
    }

    /// 1-based position in the catalog.
    pub fn ordinal(&self) -> usize {
        Self::ALL
            .iter()
            .position(|id| id == self)
            .map_or(0, |index| index + 1)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryId {
    type Err = NeoError;

    /// Accepts either the slug (`faster-than-50k`) or the ordinal (`10`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<usize>() {
            return ordinal
                .checked_sub(1)
                .and_then(|index| Self::ALL.get(index).copied())
                .ok_or_else(|| NeoError::unknown_query_id(s));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| NeoError::unknown_query_id(s))
    }
}

/// One registered statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: QueryId,
    /// Human-readable label for selectors.
    pub label: &'static str,
    sql: String,
}

impl CatalogEntry {
    /// The closed SQL statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Immutable registry of validated catalog statements.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    entries: Vec<CatalogEntry>,
}

impl QueryCatalog {
    /// Builds the built-in catalog.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_entries())
    }

    /// Builds a catalog from `(id, label, sql)` rows.
    ///
    /// Rejects duplicate ids and any statement that is not a single read-only
    /// query without placeholders.
    pub fn new(rows: Vec<(QueryId, &'static str, String)>) -> Result<Self> {
        let validator = SqlValidator::new();
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(rows.len());

        for (id, label, sql) in rows {
            if !seen.insert(id) {
                return Err(NeoError::config(format!("Duplicate catalog entry '{id}'")));
            }

            let profile = validator
                .profile(&sql)
                .map_err(|e| NeoError::config(format!("Catalog entry '{id}' is invalid: {e}")))?;
            if !profile.is_read_only() {
                return Err(NeoError::config(format!(
                    "Catalog entry '{id}' is a {} statement, expected a read-only query",
                    profile.statement_type
                )));
            }
            if profile.placeholders > 0 {
                return Err(NeoError::config(format!(
                    "Catalog entry '{id}' has {} placeholder(s); catalog statements take no parameters",
                    profile.placeholders
                )));
            }

            entries.push(CatalogEntry { id, label, sql });
        }

        debug!("Query catalog built with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Resolves an identifier (slug or ordinal) to its entry.
    pub fn lookup(&self, id: &str) -> Result<&CatalogEntry> {
        let query_id: QueryId = id.parse()?;
        self.get(query_id)
            .ok_or_else(|| NeoError::unknown_query_id(id.trim()))
    }

    /// Returns the entry registered for `id`, if any.
    pub fn get(&self, id: QueryId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// `(id, label)` pairs for populating a selector.
    pub fn labels(&self) -> impl Iterator<Item = (QueryId, &'static str)> + '_ {
        self.entries.iter().map(|entry| (entry.id, entry.label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin_entries() -> Vec<(QueryId, &'static str, String)> {
    vec![
        (
            QueryId::ApproachCount,
            "Count asteroid approaches",
            format!("SELECT name, COUNT(*) AS approach_count {APPROACHES} GROUP BY name"),
        ),
        (
            QueryId::AvgVelocity,
            "Avg velocity per asteroid",
            format!(
                "SELECT name, ROUND(AVG(relative_velocity_kmph), 2) AS avg_velocity {APPROACHES} GROUP BY name"
            ),
        ),
        (
            QueryId::TopFastest,
            "Top 10 fastest asteroids",
            format!(
                "SELECT name, MAX(relative_velocity_kmph) AS max_velocity {APPROACHES} \
                 GROUP BY name ORDER BY max_velocity DESC LIMIT 10"
            ),
        ),
        (
            QueryId::HazardousFrequent,
            "Hazardous asteroids with >3 approaches",
            format!(
                "SELECT name, COUNT(*) AS approach_count {APPROACHES} \
                 WHERE is_potentially_hazardous_asteroid = TRUE \
                 GROUP BY name HAVING approach_count > 3"
            ),
        ),
        (
            QueryId::BusiestMonth,
            "Month with most approaches",
            "SELECT MONTH(close_approach_date) AS month, COUNT(*) AS count FROM close_approach \
             GROUP BY month ORDER BY count DESC LIMIT 1"
                .to_string(),
        ),
        (
            QueryId::FastestApproach,
            "Fastest approach speed",
            format!(
                "SELECT name, MAX(relative_velocity_kmph) AS max_speed {APPROACHES} \
                 GROUP BY name ORDER BY max_speed DESC LIMIT 1"
            ),
        ),
        (
            QueryId::LargestDiameter,
            "Sort by max estimated diameter",
            "SELECT name, estimated_diameter_max_km FROM asteroids ORDER BY estimated_diameter_max_km DESC"
                .to_string(),
        ),
        (
            QueryId::ClosestApproachTrend,
            "Closest approach trend",
            format!(
                "SELECT name, close_approach_date, miss_distance_km {APPROACHES} \
                 ORDER BY name, close_approach_date ASC"
            ),
        ),
        (
            QueryId::ClosestDistance,
            "Name + date + closest distance",
            format!(
                "SELECT name, close_approach_date, miss_distance_km {APPROACHES} ORDER BY miss_distance_km ASC"
            ),
        ),
        (
            QueryId::FasterThan50k,
            "Asteroids > 50,000 km/h",
            format!(
                "SELECT name, relative_velocity_kmph {APPROACHES} WHERE relative_velocity_kmph > 50000"
            ),
        ),
        (
            QueryId::MonthlyApproachCount,
            "Monthly approach count",
            "SELECT MONTH(close_approach_date) AS month, COUNT(*) AS count FROM close_approach \
             GROUP BY month ORDER BY month"
                .to_string(),
        ),
        (
            QueryId::Brightest,
            "Brightest asteroid (lowest mag)",
            "SELECT name, MIN(absolute_magnitude_h) AS brightness FROM asteroids \
             GROUP BY name ORDER BY brightness ASC LIMIT 1"
                .to_string(),
        ),
        (
            QueryId::HazardBreakdown,
            "Hazardous vs Non-hazardous",
            "SELECT is_potentially_hazardous_asteroid, COUNT(*) AS count FROM asteroids \
             GROUP BY is_potentially_hazardous_asteroid"
                .to_string(),
        ),
        (
            QueryId::WithinOneLunarDistance,
            "Closer than 1 LD",
            format!(
                "SELECT name, close_approach_date, miss_distance_lunar {APPROACHES} WHERE miss_distance_lunar < 1"
            ),
        ),
        (
            QueryId::WithinFiveHundredthsAu,
            "Within 0.05 AU",
            format!(
                "SELECT name, close_approach_date, astronomical {APPROACHES} WHERE astronomical < 0.05"
            ),
        ),
    ]
}
