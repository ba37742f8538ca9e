#![allow(dead_code)]

use std::collections::BTreeMap;

use inferconv::ir::{ArrayMap, Dataset, GroupName, InferenceData, Value};
use ndarray::{ArrayD, IxDyn};
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

/// Finite values that survive a decimal text round trip exactly.
pub fn arb_value() -> impl Strategy<Value = f64> {
    (-1_000_000i64..1_000_000i64).prop_map(|v| v as f64 / 1000.0)
}

pub fn arb_var_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}".prop_filter("reserved name", |s| s != "chain" && s != "draw")
}

/// An array of the given leading shape plus up to two extra axes.
pub fn arb_array(leading: Vec<usize>) -> BoxedStrategy<ArrayD<f64>> {
    prop::collection::vec(1usize..4, 0..=2)
        .prop_flat_map(move |extra| {
            let mut shape = leading.clone();
            shape.extend(extra);
            let len = shape.iter().product::<usize>();
            prop::collection::vec(arb_value(), len).prop_map(move |data| {
                ArrayD::from_shape_vec(IxDyn(&shape), data).expect("shape matches data")
            })
        })
        .boxed()
}

/// Raw sampled arrays sharing one `(chain, draw)` layout.
pub fn arb_sampled_arrays(max_vars: usize) -> BoxedStrategy<ArrayMap> {
    (1usize..4, 1usize..6)
        .prop_flat_map(move |(chains, draws)| {
            prop::collection::btree_map(arb_var_name(), arb_array(vec![chains, draws]), 1..=max_vars)
        })
        .boxed()
}

pub fn arb_group() -> impl Strategy<Value = GroupName> {
    prop::sample::select(GroupName::ALL.to_vec())
}

/// A container with up to `max_groups` sampled groups.
pub fn arb_container(max_groups: usize, max_vars: usize) -> BoxedStrategy<InferenceData> {
    prop::collection::btree_map(arb_group(), arb_sampled_arrays(max_vars), 0..=max_groups)
        .prop_map(|groups| {
            groups
                .into_iter()
                .fold(InferenceData::new(), |idata, (group, arrays)| {
                    let dataset =
                        Dataset::from_arrays(arrays, None, None, 0).expect("sampled dataset");
                    idata.with_group(group, dataset)
                })
        })
        .boxed()
}

/// A generated CmdStan chain: its CSV text and the arrays it encodes,
/// laid out as `(draw, ...)`.
#[derive(Clone, Debug)]
pub struct StanChain {
    pub csv: String,
    pub expected: ArrayMap,
}

/// A chain with one scalar diagnostic, scalar parameters and one
/// vector parameter, written with dotted or bracketed index columns.
pub fn arb_stan_chain() -> BoxedStrategy<StanChain> {
    (
        1usize..8,
        prop::collection::btree_set("[a-z]{1,5}", 1..4),
        1usize..4,
        any::<bool>(),
    )
        .prop_flat_map(|(draws, scalars, vector_len, bracketed)| {
            let columns = 1 + scalars.len() + vector_len;
            prop::collection::vec(prop::collection::vec(arb_value(), columns), draws).prop_map(
                move |rows| render_chain(&rows, &scalars, vector_len, bracketed),
            )
        })
        .boxed()
}

fn render_chain(
    rows: &[Vec<f64>],
    scalars: &std::collections::BTreeSet<String>,
    vector_len: usize,
    bracketed: bool,
) -> StanChain {
    let mut header = vec!["lp__".to_string()];
    header.extend(scalars.iter().map(|s| format!("p_{}", s)));
    header.extend((1..=vector_len).map(|i| {
        if bracketed {
            format!("vec[{}]", i)
        } else {
            format!("vec.{}", i)
        }
    }));

    let mut csv = String::from("# generated chain\n");
    csv.push_str(&header.join(","));
    csv.push('\n');
    for row in rows {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    let draws = rows.len();
    let column = |idx: usize| -> Vec<f64> { rows.iter().map(|r| r[idx]).collect() };
    let mut expected = BTreeMap::new();
    expected.insert(
        "lp__".to_string(),
        ArrayD::from_shape_vec(IxDyn(&[draws]), column(0)).expect("lp shape"),
    );
    for (i, name) in scalars.iter().enumerate() {
        expected.insert(
            format!("p_{}", name),
            ArrayD::from_shape_vec(IxDyn(&[draws]), column(1 + i)).expect("scalar shape"),
        );
    }
    let first = 1 + scalars.len();
    let vec_values: Vec<f64> = rows
        .iter()
        .flat_map(|r| r[first..first + vector_len].iter().copied())
        .collect();
    expected.insert(
        "vec".to_string(),
        ArrayD::from_shape_vec(IxDyn(&[draws, vector_len]), vec_values).expect("vector shape"),
    );

    StanChain { csv, expected }
}

/// Arbitrary dynamic values, nested a few levels deep.
pub fn arb_dynamic_value() -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        arb_value().prop_map(Value::Float),
        "[a-z./_]{0,12}".prop_map(Value::Str),
        arb_array(vec![2]).prop_map(Value::Array),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::Mapping),
        ]
    })
    .boxed()
}
