// SPDX-License-Identifier: Apache-2.0

use adops_model::{DynRecord, FieldKind, FieldRegistry, RecordSchema};
use adops_query::{
    execute, AggregateSpec, FilterSpec, QueryLimits, QueryPlan, SortSpec, ViewQuery,
};

fn registry() -> FieldRegistry<DynRecord> {
    RecordSchema::new()
        .with_field("name", FieldKind::Text, true)
        .with_field("status", FieldKind::Category, false)
        .with_field("budget", FieldKind::Number, false)
        .registry()
        .expect("registry")
}

fn two_records() -> Vec<DynRecord> {
    serde_json::from_str(
        r#"[
            {"id": 1, "name": "Spring", "status": "Active", "budget": 100},
            {"id": 2, "name": "Summer", "status": "Paused", "budget": 200}
        ]"#,
    )
    .expect("records")
}

fn run(query: ViewQuery, records: &[DynRecord]) -> (Vec<String>, adops_query::Aggregates) {
    let plan = QueryPlan::compile(&query, &registry(), &QueryLimits::default()).expect("plan");
    let outcome = execute(records, &plan).expect("execute");
    let ids = outcome
        .records
        .iter()
        .map(|r| r.id.as_str().to_string())
        .collect();
    (ids, outcome.aggregates)
}

#[test]
fn status_membership_keeps_matching_record() {
    let (ids, _) = run(
        ViewQuery::new().with_filter(FilterSpec::any_of("status", ["Active"])),
        &two_records(),
    );
    assert_eq!(ids, vec!["1"]);
}

#[test]
fn budget_descending_orders_larger_first() {
    let (ids, _) = run(
        ViewQuery::new().with_sort(SortSpec::desc("budget")),
        &two_records(),
    );
    assert_eq!(ids, vec!["2", "1"]);
}

#[test]
fn sum_follows_filter_and_average_of_nothing_is_zero() {
    let (ids, aggregates) = run(
        ViewQuery::new()
            .with_filter(FilterSpec::any_of("status", ["Active"]))
            .with_aggregate(AggregateSpec::sum("budget_total", "budget")),
        &two_records(),
    );
    assert_eq!(ids, vec!["1"]);
    assert_eq!(aggregates.get("budget_total"), Some(100.0));

    let (ids, aggregates) = run(
        ViewQuery::new().with_aggregate(AggregateSpec::average("budget_avg", "budget")),
        &[],
    );
    assert!(ids.is_empty());
    let avg = aggregates.get("budget_avg").expect("computed");
    assert_eq!(avg, 0.0);
    assert!(!avg.is_nan());
}

#[test]
fn multi_select_is_or_within_dimension() {
    let (ids, _) = run(
        ViewQuery::new().with_filter(FilterSpec::any_of("status", ["Active", "Paused"])),
        &two_records(),
    );
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn dimensions_combine_with_and() {
    let (ids, _) = run(
        ViewQuery::new()
            .with_filter(FilterSpec::any_of("status", ["Active"]))
            .with_filter(FilterSpec::search("foo")),
        &two_records(),
    );
    assert!(ids.is_empty());
}

#[test]
fn unknown_sort_field_keeps_input_order() {
    let (ids, _) = run(
        ViewQuery::new().with_sort(SortSpec::asc("nonexistent")),
        &two_records(),
    );
    assert_eq!(ids, vec!["1", "2"]);
}
