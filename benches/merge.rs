use criterion::*;
use std::hint::black_box;

use u_moments::{
    map_value, merge_compensated, reduce_padded, reduce_pairwise, reduce_parallel, PartialStats,
    Precision, ReduceConfig,
};

const LEN: usize = 1 << 20;

fn make_data(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 1.0e4 + ((i * 7919) % 1000) as f32 * 1.0e-3)
        .collect()
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let a = make_data(1000)
        .iter()
        .map(|&x| map_value(x))
        .fold(PartialStats::IDENTITY, merge_compensated);
    let b = map_value(3.5);

    for precision in [Precision::Compensated, Precision::Simple] {
        group.bench_function(format!("merge_{precision}"), |bench| {
            bench.iter(|| black_box(precision.merge(black_box(a), black_box(b))));
        });
    }
    group.finish();
}

fn reduce_benchmark(c: &mut Criterion) {
    let data = make_data(LEN);
    let mut group = c.benchmark_group("reduce");
    group.throughput(Throughput::Elements(LEN as u64));

    for precision in [Precision::Compensated, Precision::Simple] {
        group.bench_function(format!("pairwise_{precision}_1M"), |bench| {
            bench.iter(|| black_box(reduce_pairwise(&data, precision)));
        });
        group.bench_function(format!("padded_{precision}_1M"), |bench| {
            bench.iter(|| black_box(reduce_padded(&data, precision)));
        });
        let cfg = ReduceConfig::default().with_precision(precision);
        group.bench_function(format!("parallel_{precision}_1M"), |bench| {
            bench.iter(|| black_box(reduce_parallel(&data, &cfg)));
        });
    }
    group.finish();
}

criterion_group!(benches, merge_benchmark, reduce_benchmark);
criterion_main!(benches);
