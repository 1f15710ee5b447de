//! Performance benchmarks for graph construction and backward passes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use picograd::autograd::{add, mul, Graph, Tensor};

/// Build `y = ((x * w) + x) * w ...` with `depth` combine ops
fn build_chain(graph: &Graph, width: usize, depth: usize) -> (Tensor, Tensor) {
    let x = graph.ones(&[width], true).unwrap();
    let w = graph.from_vec(vec![0.5; width], true).unwrap();
    let mut y = x.clone();
    for i in 0..depth {
        y = if i % 2 == 0 {
            mul(&y, &w).unwrap()
        } else {
            add(&y, &x).unwrap()
        };
    }
    (x, y)
}

/// Benchmark recording ops into the arena
fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("GraphConstruction");

    for depth in [10, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), depth, |b, &depth| {
            b.iter(|| {
                let graph = Graph::new();
                black_box(build_chain(&graph, 16, depth))
            });
        });
    }
    group.finish();
}

/// Benchmark backward over a prebuilt chain, resetting between runs
fn bench_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("Backward");

    for depth in [10, 100, 1_000].iter() {
        let graph = Graph::new();
        let (_, y) = build_chain(&graph, 16, *depth);

        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), depth, |b, _| {
            b.iter(|| {
                y.zero_grad();
                y.backward().unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark a single node with heavy fan-in
fn bench_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("FanIn");

    for uses in [10, 100, 1_000].iter() {
        let graph = Graph::new();
        let a = graph.ones(&[16], true).unwrap();
        let mut y = a.clone();
        for _ in 0..*uses {
            y = add(&y, &a).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("self_add", uses), uses, |b, _| {
            b.iter(|| {
                y.zero_grad();
                y.backward().unwrap();
                black_box(a.grad())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_construction, bench_backward, bench_fan_in);
criterion_main!(benches);
