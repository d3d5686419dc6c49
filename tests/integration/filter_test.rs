//! Ad-hoc filter integration tests.
//!
//! Compiles filter specifications and executes them against SQLite stores.

use super::common::{approach, asteroid, seed_store, two_asteroid_store, Asteroid};
use chrono::NaiveDate;
use neo_explorer::catalog::QueryCatalog;
use neo_explorer::db::Value;
use neo_explorer::filter::{self, DateRange, FilterSpecification, HazardousFilter, NumericRange};
use neo_explorer::query::{ExecutionOutcome, QueryExecutor, StatementSource};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn names_for(spec: &FilterSpecification) -> Vec<String> {
    let store = two_asteroid_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);

    match executor.run_filter(spec).await {
        ExecutionOutcome::Success(result) => {
            let mut names: Vec<String> = result
                .rows
                .iter()
                .map(|row| row["name"].to_display_string())
                .collect();
            names.sort();
            names
        }
        other => panic!("Expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_hazardous_filter_returns_only_non_hazardous_row() {
    let spec = FilterSpecification {
        hazardous: HazardousFilter::No,
        velocity_range: NumericRange::new(0.0, 100_000.0),
        diameter_range: NumericRange::new(0.0, 5.0),
        astronomical_unit_range: NumericRange::new(0.0, 0.5),
        lunar_distance_range: NumericRange::new(0.0, 100.0),
        date_range: DateRange::new(date(2025, 1, 1), date(2025, 12, 31)),
    };

    assert_eq!(names_for(&spec).await, vec!["Y"]);
}

#[tokio::test]
async fn test_hazardous_selector() {
    let yes = FilterSpecification {
        hazardous: HazardousFilter::Yes,
        ..FilterSpecification::default()
    };
    assert_eq!(names_for(&yes).await, vec!["X"]);
    assert_eq!(names_for(&FilterSpecification::default()).await, vec!["X", "Y"]);
}

#[tokio::test]
async fn test_filtered_rows_carry_the_full_projection() {
    let store = two_asteroid_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);
    let spec = FilterSpecification {
        hazardous: HazardousFilter::Yes,
        ..FilterSpecification::default()
    };

    let ExecutionOutcome::Success(result) = executor.run_filter(&spec).await else {
        panic!("Expected Success");
    };

    assert_eq!(
        result.columns,
        vec![
            "name",
            "close_approach_date",
            "relative_velocity_kmph",
            "miss_distance_km",
            "miss_distance_lunar",
            "astronomical",
            "estimated_diameter_min_km",
            "estimated_diameter_max_km",
            "is_potentially_hazardous_asteroid",
        ]
    );
    let row = &result.rows[0];
    assert_eq!(row["close_approach_date"], Value::Date(date(2025, 3, 14)));
    assert_eq!(row["relative_velocity_kmph"], Value::Float(62_000.0));
    assert_eq!(row["is_potentially_hazardous_asteroid"], Value::Bool(true));
}

#[tokio::test]
async fn test_date_range_is_inclusive() {
    let spec = FilterSpecification {
        date_range: DateRange::new(date(2025, 3, 14), date(2025, 3, 14)),
        ..FilterSpecification::default()
    };
    assert_eq!(names_for(&spec).await, vec!["X"]);
}

#[tokio::test]
async fn test_inverted_date_range_is_empty_success() {
    let spec = FilterSpecification {
        date_range: DateRange::new(date(2025, 12, 31), date(2025, 1, 1)),
        ..FilterSpecification::default()
    };
    assert!(names_for(&spec).await.is_empty());
}

#[tokio::test]
async fn test_inverted_velocity_range_is_empty_success() {
    let spec = FilterSpecification {
        velocity_range: NumericRange::new(90_000.0, 10.0),
        ..FilterSpecification::default()
    };
    assert!(names_for(&spec).await.is_empty());
}

#[tokio::test]
async fn test_diameter_bounds_apply_to_separate_estimates() {
    let sized = |id, name, min, max| Asteroid {
        diameter_min_km: min,
        diameter_max_km: max,
        ..asteroid(id, name, false)
    };
    let store = seed_store(
        &[
            sized(1, "Exact", 2.0, 2.0),
            sized(2, "Spanning", 1.5, 2.5),
            sized(3, "Small", 0.5, 1.0),
        ],
        &[
            approach(1, "2025-05-05", 30_000.0),
            approach(2, "2025-05-06", 30_000.0),
            approach(3, "2025-05-07", 30_000.0),
        ],
    )
    .await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);

    let spec = FilterSpecification {
        diameter_range: NumericRange::new(2.0, 2.0),
        ..FilterSpecification::default()
    };
    let ExecutionOutcome::Success(result) = executor.run_filter(&spec).await else {
        panic!("Expected Success");
    };

    let names: Vec<_> = result.rows.iter().map(|r| r["name"].to_display_string()).collect();
    assert_eq!(names, vec!["Exact"]);
}

#[tokio::test]
async fn test_compiled_statement_executes_as_given() {
    let store = two_asteroid_store().await;
    let catalog = QueryCatalog::builtin().unwrap();
    let provider = store.provider();
    let executor = QueryExecutor::new(&catalog, &provider);
    let compiled = filter::compile(&FilterSpecification {
        lunar_distance_range: NumericRange::new(0.0, 1.0),
        ..FilterSpecification::default()
    });

    let outcome = executor.execute(StatementSource::Compiled(compiled)).await;

    match outcome {
        ExecutionOutcome::Success(result) => assert!(result.is_empty()),
        other => panic!("Expected Success, got {other:?}"),
    }
}
