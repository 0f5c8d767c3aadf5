#![allow(dead_code)]

use panformat::value::{Number, Object, Value};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Integers and decimal literals, including ones that overflow `u64`.
pub fn arb_number() -> BoxedStrategy<Number> {
    prop_oneof![
        any::<i64>().prop_map(Number::from),
        any::<u64>().prop_map(Number::from),
        "-?(0|[1-9][0-9]{0,24})(\\.[0-9]{1,8})?([eE][+-]?[1-9][0-9]?)?"
            .prop_map(|literal| Number::from_literal(&literal).expect("generated literal")),
    ]
    .boxed()
}

pub fn arb_scalar() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_number().prop_map(Value::Number),
        any::<String>().prop_map(Value::String),
    ]
    .boxed()
}

/// Arbitrary canonical trees up to `depth` levels of nesting.
pub fn arb_value(depth: u32) -> BoxedStrategy<Value> {
    arb_scalar()
        .prop_recursive(depth, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-zA-Z_][a-zA-Z0-9_ ]{0,10}", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect::<Object>())),
            ]
        })
        .boxed()
}

/// Printable ASCII cells for CSV tables.
pub fn arb_cell() -> BoxedStrategy<String> {
    "[ -~]{0,12}".boxed()
}

/// A header row plus rows of string cells, as canonical objects.
pub fn arb_string_table(
    max_cols: usize,
    max_rows: usize,
) -> BoxedStrategy<(Vec<String>, Vec<Value>)> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,6}", 1..=max_cols)
        .prop_flat_map(move |headers| {
            let headers: Vec<String> = headers.into_iter().collect();
            let width = headers.len();
            let row = prop::collection::vec(arb_cell(), width);
            let rows = prop::collection::vec(row, 0..=max_rows);
            (Just(headers), rows)
        })
        .prop_map(|(headers, rows)| {
            let rows = rows
                .into_iter()
                .map(|cells| {
                    Value::Object(
                        headers
                            .iter()
                            .cloned()
                            .zip(cells.into_iter().map(Value::String))
                            .collect(),
                    )
                })
                .collect();
            (headers, rows)
        })
        .boxed()
}
