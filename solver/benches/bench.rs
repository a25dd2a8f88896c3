extern crate allsat;

use allsat::{enumerate, solve, SolverConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random 3-SAT formula with a fixed seed, so every run measures the same instances.
fn random_3sat(seed: u64, num_variables: i32, num_clauses: usize) -> Vec<Vec<i32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let variable = rng.gen_range(1, num_variables + 1);
                    if rng.gen_bool(0.5) {
                        variable
                    } else {
                        -variable
                    }
                })
                .collect()
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("DPLL");

    for &(num_variables, num_clauses) in &[(10, 30), (14, 50), (18, 70)] {
        let formula = random_3sat(42, num_variables, num_clauses);

        group.bench_function(format!("solve {}v {}c", num_variables, num_clauses), |b| {
            b.iter(|| solve(black_box(&formula), SolverConfig::default()))
        });

        group.bench_function(format!("enumerate {}v {}c", num_variables, num_clauses), |b| {
            b.iter_batched(
                || formula.clone(),
                |formula| {
                    enumerate(&formula, SolverConfig::default())
                        .map(|models| models.count())
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish()
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = criterion_benchmark
}
criterion_main!(benches);
