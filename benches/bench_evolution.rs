use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rayon::prelude::*;

use zebra_ga::{
    constraints::ConstraintSet,
    domain::{Chromosome, Domain},
    evolution::{CacheType, Challenge, EvolutionLauncher, EvolutionOptions, LogLevel},
    instances::{zebra_constraints, zebra_domain},
    local_search::{HillClimbing, LocalSearch},
    rng::RandomNumberGenerator,
};

fn puzzle() -> (Domain, ConstraintSet) {
    let domain = zebra_domain().unwrap();
    let constraints = zebra_constraints(&domain).unwrap();
    (domain, constraints)
}

fn random_population(domain: &Domain, size: usize, seed: u64) -> Vec<Chromosome> {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    (0..size)
        .map(|_| domain.random_chromosome(&mut rng).unwrap())
        .collect()
}

fn bench_fitness_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness_evaluation");
    let (domain, constraints) = puzzle();

    for size in [100, 1000, 5000].iter() {
        let population = random_population(&domain, *size, 1);

        group.bench_with_input(
            BenchmarkId::new("sequential", size),
            &population,
            |b, population| {
                b.iter(|| {
                    population
                        .iter()
                        .map(|c| constraints.score(black_box(c)))
                        .collect::<Vec<f64>>()
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", size),
            &population,
            |b, population| {
                b.iter(|| {
                    population
                        .par_iter()
                        .map(|c| constraints.score(black_box(c)))
                        .collect::<Vec<f64>>()
                })
            },
        );
    }

    group.finish();
}

fn bench_hill_climbing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hill_climbing");
    let (domain, constraints) = puzzle();
    let start = random_population(&domain, 1, 2).remove(0);

    for iterations in [5, 30].iter() {
        let climber = HillClimbing::new(*iterations).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &start,
            |b, start| b.iter(|| climber.search(black_box(start), &constraints)),
        );
    }

    group.finish();
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("generations");
    group.sample_size(10);
    let (domain, constraints) = puzzle();

    for (name, cache_type) in [
        ("uncached", CacheType::None),
        ("global", CacheType::Global),
        ("thread_local", CacheType::ThreadLocal),
    ] {
        let options = EvolutionOptions::builder()
            .initial_population(1000)
            .generation_limit(20)
            .log_level(LogLevel::None)
            .cache_type(cache_type)
            .seed(7)
            .build();
        let launcher =
            EvolutionLauncher::new(domain.clone(), constraints.clone(), options).unwrap();

        group.bench_function(name, |b| {
            b.iter(|| {
                let result = launcher.run();
                assert!(result.is_ok());
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fitness_evaluation,
    bench_hill_climbing,
    bench_generations
);
criterion_main!(benches);
