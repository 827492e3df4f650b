//! Strata Ledger Benchmarks
//!
//! Covers the hot paths that run on every read and every write:
//! - Live balance computation (256-bit intermediate product)
//! - Settlement before mint/burn
//! - Transfer with settlement of both parties

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use strata_common::{HolderId, UNIT};
use strata_ledger::{accrual, InterestToken};

const RATE: u128 = 50_000_000_000;

// ============ ACCRUAL BENCHMARKS ============

fn bench_live_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("accrual");
    group.measurement_time(Duration::from_secs(5));

    let holder = HolderId::new("alice");
    for principal in [UNIT, 1_000_000 * UNIT, u128::MAX / 4].iter() {
        group.bench_with_input(
            BenchmarkId::new("live_balance", principal),
            principal,
            |b, &principal| {
                b.iter(|| {
                    accrual::live_balance(
                        black_box(&holder),
                        black_box(principal),
                        black_box(RATE),
                        0,
                        black_box(31_536_000),
                    )
                });
            },
        );
    }

    group.finish();
}

// ============ MUTATION BENCHMARKS ============

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutations");
    group.measurement_time(Duration::from_secs(5));

    let alice = HolderId::new("alice");
    let bob = HolderId::new("bob");

    group.bench_function("mint_with_settlement", |b| {
        let mut token = InterestToken::new(RATE);
        let mut now = 0u64;
        b.iter(|| {
            now += 1;
            token.mint(black_box(&alice), black_box(UNIT), now).unwrap()
        });
    });

    group.bench_function("transfer_round_trip", |b| {
        let mut token = InterestToken::new(RATE);
        token.mint(&alice, 1_000 * UNIT, 0).unwrap();
        token.mint(&bob, 1_000 * UNIT, 0).unwrap();
        let mut now = 0u64;
        b.iter(|| {
            now += 1;
            token.transfer(&alice, &bob, black_box(UNIT), now).unwrap();
            token.transfer(&bob, &alice, black_box(UNIT), now).unwrap();
        });
    });

    group.finish();
}

criterion_group!(accrual_benches, bench_live_balance);

criterion_group!(mutation_benches, bench_mutations);

criterion_main!(accrual_benches, mutation_benches);
