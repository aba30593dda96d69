use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tourforge::config::FitnessWeights;
use tourforge::core_types::Position;
use tourforge::evolution::initialization::random_chromosome;
use tourforge::evolution::{fitness, AcceptRule, Decoder};
use tourforge::search::{BacktrackOptions, BacktrackingSearch, Warnsdorff};
use tourforge::solver::NoProgress;

fn criterion_benchmark(c: &mut Criterion) {
    let origin = Position::new(0, 0);

    let mut search = BacktrackingSearch::new(Warnsdorff, BacktrackOptions::default());
    c.bench_function("warnsdorff backtracking 8x8", |b| {
        b.iter(|| search.run(black_box(8), origin, None, &NoProgress))
    });

    let mut lookahead = BacktrackingSearch::new(
        Warnsdorff,
        BacktrackOptions {
            isolation_lookahead: true,
            ..BacktrackOptions::default()
        },
    );
    c.bench_function("warnsdorff lookahead 8x8", |b| {
        b.iter(|| lookahead.run(black_box(8), origin, None, &NoProgress))
    });

    let mut rng = fastrand::Rng::with_seed(42);
    let chromosome = random_chromosome(&mut rng, 128);
    let literal = Decoder::new(8, AcceptRule::Literal);
    let mobility = Decoder::new(8, AcceptRule::Mobility);

    c.bench_function("decode literal (128 genes)", |b| {
        b.iter(|| literal.decode(black_box(&chromosome), origin))
    });
    c.bench_function("decode mobility (128 genes)", |b| {
        b.iter(|| mobility.decode(black_box(&chromosome), origin))
    });

    let path = mobility.decode(&chromosome, origin);
    let weights = FitnessWeights::with_mobility();
    c.bench_function("fitness 8x8", |b| {
        b.iter(|| fitness(black_box(&path), 8, &weights))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
