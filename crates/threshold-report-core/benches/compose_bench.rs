//! Store construction and long-form composition benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use threshold_report_core::{BenchmarkDataset, Metric, SampleStore, ScenarioRecord, SeriesComposer};

fn sweep(scenarios: usize, thresholds: usize) -> BenchmarkDataset {
    let cutoffs: Vec<u64> = (0..thresholds).map(|i| 16u64 << i.min(40)).collect();
    BenchmarkDataset {
        schema_version: 1,
        title: "bench".to_string(),
        source: None,
        thresholds: cutoffs,
        conclusion: None,
        scenarios: (0..scenarios)
            .map(|s| {
                let times = (0..thresholds).map(|t| 1.0 + (s + t) as f64).collect();
                let frag = (0..thresholds).map(|t| (t % 10) as f64 / 10.0).collect();
                ScenarioRecord::new(format!("scenario_{s}"), times).with_fragmentation(frag)
            })
            .collect(),
    }
}

fn bench_build_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_store");
    for &scenarios in &[3usize, 32, 256] {
        let dataset = sweep(scenarios, 16);
        group.bench_with_input(BenchmarkId::from_parameter(scenarios), &dataset, |b, ds| {
            b.iter(|| criterion::black_box(SampleStore::from_dataset(ds.clone())));
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    for &scenarios in &[3usize, 32, 256] {
        let store = SampleStore::from_dataset(sweep(scenarios, 16)).expect("valid sweep");
        let names: Vec<String> = store.scenario_names().into_iter().map(String::from).collect();
        group.bench_with_input(BenchmarkId::new("execution_time", scenarios), &names, |b, names| {
            b.iter(|| {
                let rows = SeriesComposer::new(&store).compose(Metric::ExecutionTime, names);
                criterion::black_box(rows)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_store, bench_compose);
criterion_main!(benches);
