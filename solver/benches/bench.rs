use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use npc_solver::{
    generators::{random_subset_sum, random_three_cnf, Feasibility},
    sat_solver, subset_sum_solver, SatStrategy, SubsetSumStrategy,
};

const SEED: u64 = 42;

fn sat_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-SAT");
    let mut rng = StdRng::seed_from_u64(SEED);

    for num_variables in [8usize, 12, 16].iter().copied() {
        // clause/variable ratio near the phase transition
        let num_clauses = num_variables * 426 / 100;
        let formula = random_three_cnf(&mut rng, num_variables, num_clauses)
            .expect("at least three variables")
            .to_cnf();

        for strategy in SatStrategy::ALL.iter().copied() {
            group.bench_with_input(BenchmarkId::new(strategy.name(), num_variables), &formula, |b, formula| {
                b.iter(|| sat_solver::solve(black_box(formula), strategy))
            });
        }
    }

    group.finish()
}

fn subset_sum_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Subset Sum");
    let mut rng = StdRng::seed_from_u64(SEED);

    for len in [8usize, 12, 16].iter().copied() {
        let instance = random_subset_sum(&mut rng, len, 1000, Feasibility::Random).expect("small elements");

        for strategy in SubsetSumStrategy::ALL.iter().copied() {
            group.bench_with_input(BenchmarkId::new(strategy.name(), len), &instance, |b, instance| {
                b.iter(|| subset_sum_solver::solve(black_box(instance), strategy))
            });
        }
    }

    group.finish()
}

criterion_group!{
    name = benches;
    config = Criterion::default();
    targets = sat_benchmark, subset_sum_benchmark
}
criterion_main!(benches);
