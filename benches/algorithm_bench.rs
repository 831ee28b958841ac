//! Benchmarks for the itinerary search.

#[cfg(feature = "bench")]
extern crate criterion;

use aco_itinerary::config::{Config, PheromoneParams};
use aco_itinerary::environment::{Environment, Location};
use aco_itinerary::Optimizer;
#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Create a complete benchmark graph of specified size.
fn create_benchmark_environment(size: u32) -> Environment {
    let locations: Vec<Location> = (0..size)
        .map(|i| Location::new(format!("L{}", i), 480 + (i % 6) * 30, 1080 + (i % 4) * 60))
        .collect();

    let mut edges = Vec::new();
    for i in 0..size {
        for j in 0..size {
            if i != j {
                edges.push((format!("L{}", i), format!("L{}", j), 3 + (i * 13 + j * 7) % 25));
            }
        }
    }

    Environment::new(locations, edges, PheromoneParams::default()).unwrap()
}

#[cfg(feature = "bench")]
fn benchmark_initialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialization");

    for size in [20, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let environment = create_benchmark_environment(size);
            let config = Config::new().with_num_colonies(size as usize).with_ants_per_colony(20);

            b.iter(|| {
                let mut optimizer = Optimizer::new(environment.clone(), config.clone()).unwrap();
                optimizer.initialize().unwrap();
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");

    for size in [20, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let environment = create_benchmark_environment(size);
            let config = Config::new().with_num_colonies(10).with_ants_per_colony(20);

            let mut optimizer = Optimizer::new(environment, config).unwrap();
            optimizer.initialize().unwrap();

            b.iter(|| {
                optimizer.run_one_generation().unwrap();
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(benches, benchmark_initialization, benchmark_generation);

#[cfg(feature = "bench")]
criterion_main!(benches);
