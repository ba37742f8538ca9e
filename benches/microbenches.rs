//! Criterion microbenches for inferconv parsing, classification and writing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - CmdStan CSV parsing (from_stan_csv_str, from_stan_csv_slice)
//! - Input classification (classify)
//! - Container JSON writing (to_json_string)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeMap;
use std::hint::black_box;

use inferconv::config::Settings;
use inferconv::conversion::{classify, ConvertArgs, Converter};
use inferconv::ir::io_cmdstan_csv::{from_stan_csv_slice, from_stan_csv_str};
use inferconv::ir::io_json::to_json_string;
use inferconv::ir::{SamplerDraws, SamplerObject, Value};
use ndarray::{ArrayD, IxDyn};

// Include test fixtures at compile time (no file I/O during benchmark)
const CHAIN_FIXTURE: &str = include_str!("../tests/fixtures/eight_schools_1.csv");

/// A larger generated chain: 1000 draws of a scalar and a 50-element vector.
fn large_chain() -> String {
    let mut csv = String::from("lp__,mu");
    for i in 1..=50 {
        csv.push_str(&format!(",theta.{}", i));
    }
    csv.push('\n');
    for draw in 0..1000 {
        csv.push_str(&format!("-{}.5,{}", draw % 7, draw as f64 / 1000.0));
        for i in 0..50 {
            csv.push_str(&format!(",{}", (draw * i) % 13));
        }
        csv.push('\n');
    }
    csv
}

/// Benchmark CmdStan CSV parsing from string.
fn bench_stan_csv_parse_str(c: &mut Criterion) {
    let large = large_chain();
    let mut group = c.benchmark_group("stan_csv_parse");

    group.throughput(Throughput::Bytes(CHAIN_FIXTURE.len() as u64));
    group.bench_function("from_stan_csv_str/fixture", |b| {
        b.iter(|| {
            let chain = from_stan_csv_str(black_box(CHAIN_FIXTURE)).unwrap();
            black_box(chain)
        })
    });

    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("from_stan_csv_str/large", |b| {
        b.iter(|| {
            let chain = from_stan_csv_str(black_box(&large)).unwrap();
            black_box(chain)
        })
    });

    group.finish();
}

/// Benchmark CmdStan CSV parsing from byte slice.
fn bench_stan_csv_parse_slice(c: &mut Criterion) {
    let large = large_chain();
    let bytes = large.as_bytes();
    let mut group = c.benchmark_group("stan_csv_parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("from_stan_csv_slice/large", |b| {
        b.iter(|| {
            let chain = from_stan_csv_slice(black_box(bytes)).unwrap();
            black_box(chain)
        })
    });

    group.finish();
}

/// Benchmark shape classification of values near the end of the rule table.
fn bench_classify(c: &mut Criterion) {
    let settings = Settings::detect();
    let csv_list = Value::List((0..4).map(|i| Value::from(format!("chain_{}.csv", i))).collect());
    let array = Value::Array(ArrayD::zeros(IxDyn(&[4, 100])));
    let sampler = Value::from(SamplerObject::new(
        "MCMC",
        "numpyro.infer.mcmc",
        SamplerDraws::default(),
    ));

    let mut group = c.benchmark_group("classify");
    for (name, value) in [("csv_list", &csv_list), ("array", &array), ("mcmc", &sampler)] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(classify(black_box(value), &settings).unwrap()))
        });
    }
    group.finish();
}

/// Benchmark container JSON writing.
///
/// We convert a mapping once to get a container, then benchmark
/// writing it to a JSON string.
fn bench_container_write(c: &mut Criterion) {
    let settings = Settings::detect();
    let mut entries = BTreeMap::new();
    entries.insert(
        "theta".to_string(),
        Value::Array(ArrayD::from_elem(IxDyn(&[4, 250, 8]), 0.25)),
    );
    entries.insert(
        "mu".to_string(),
        Value::Array(ArrayD::from_elem(IxDyn(&[4, 250]), 1.5)),
    );
    let idata = Converter::new(&settings)
        .convert(Value::Mapping(entries), ConvertArgs::new())
        .expect("Failed to build benchmark container");

    let mut group = c.benchmark_group("container_write");
    group.throughput(Throughput::Elements(9000));

    group.bench_function("to_json_string", |b| {
        b.iter(|| {
            let json = to_json_string(black_box(&idata)).unwrap();
            black_box(json)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_stan_csv_parse_str,
    bench_stan_csv_parse_slice,
    bench_classify,
    bench_container_write,
);
criterion_main!(benches);
