//! Benchmarks for graph construction and queries.
//!
//! Run with: `cargo bench --bench centrality`
//!
//! Networks are synthetic: airports on a lat/lon grid, each with routes to a
//! fixed set of pseudo-random destinations, so runs are reproducible.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use flight_network_kernel::{
    betweenness_centrality, graph_metrics, shortest_path_by_distance, shortest_path_by_hops,
    AirportRecord, FlightGraph, GraphBuilder, RouteRecord,
};

/// Routes per airport.
const FAN_OUT: usize = 6;

fn code(i: usize) -> String {
    format!("A{:04}", i)
}

fn records(airports: usize) -> (Vec<AirportRecord>, Vec<RouteRecord>) {
    let side = (airports as f64).sqrt().ceil() as usize;
    let nodes = (0..airports)
        .map(|i| {
            let lat = -60.0 + 120.0 * (i / side) as f64 / side as f64;
            let lon = -170.0 + 340.0 * (i % side) as f64 / side as f64;
            AirportRecord::new(code(i), lat, lon)
        })
        .collect();

    // Linear congruential destinations keep the network fixed between runs.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut routes = Vec::with_capacity(airports * FAN_OUT);
    for i in 0..airports {
        for _ in 0..FAN_OUT {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let j = (state >> 33) as usize % airports;
            routes.push(RouteRecord::new(code(i), code(j)));
        }
    }
    (nodes, routes)
}

fn network(airports: usize) -> FlightGraph {
    let (nodes, routes) = records(airports);
    GraphBuilder::build(nodes, routes)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for airports in [100, 500, 2000] {
        let (nodes, routes) = records(airports);
        group.throughput(Throughput::Elements(routes.len() as u64));
        group.bench_with_input(BenchmarkId::new("airports", airports), &(nodes, routes), |b, (n, r)| {
            b.iter(|| GraphBuilder::build(black_box(n.clone()), black_box(r.clone())))
        });
    }

    group.finish();
}

fn bench_betweenness(c: &mut Criterion) {
    let mut group = c.benchmark_group("betweenness");
    group.sample_size(10);

    for airports in [50, 200, 500] {
        let graph = network(airports);
        group.bench_with_input(BenchmarkId::new("airports", airports), &graph, |b, g| {
            b.iter(|| betweenness_centrality(black_box(g)))
        });
    }

    group.finish();
}

fn bench_shortest_paths(c: &mut Criterion) {
    let graph = network(2000);
    let (from, to) = (code(0), code(1999));

    let mut group = c.benchmark_group("shortest_path");
    group.bench_function("hops", |b| {
        b.iter(|| shortest_path_by_hops(black_box(&graph), &from, &to))
    });
    group.bench_function("distance", |b| {
        b.iter(|| shortest_path_by_distance(black_box(&graph), &from, &to))
    });
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let graph = network(500);
    c.bench_function("graph_metrics/500", |b| b.iter(|| graph_metrics(black_box(&graph))));
}

criterion_group!(
    benches,
    bench_build,
    bench_betweenness,
    bench_shortest_paths,
    bench_metrics
);
criterion_main!(benches);
