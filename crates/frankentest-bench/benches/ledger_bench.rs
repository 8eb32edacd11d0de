//! Ledger benchmarks: stamping, verification and assertion fingerprints.

use criterion::{Criterion, criterion_group, criterion_main};
use frankentest_ledger::{LedgerChain, LedgerIdentity, LedgerMaterial, fingerprint};

fn stamped(n: usize) -> LedgerChain {
    let identity = LedgerIdentity::default();
    let mut chain = LedgerChain::new();
    for i in 0..n {
        let material = LedgerMaterial::new("case.result")
            .field("name", format_args!("case_{i}"))
            .field("result", 1)
            .field_f64("trust", 0.0);
        chain.stamp(&identity, 1_767_225_600, &material).unwrap();
    }
    chain
}

fn bench_stamp(c: &mut Criterion) {
    c.bench_function("stamp_1000", |b| {
        b.iter(|| criterion::black_box(stamped(1000)));
    });
}

fn bench_verify(c: &mut Criterion) {
    let chain = stamped(1000);
    c.bench_function("verify_1000", |b| {
        b.iter(|| criterion::black_box(chain.verify().is_ok()));
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    c.bench_function("fingerprint", |b| {
        b.iter(|| {
            criterion::black_box(fingerprint(
                criterion::black_box("tests/math.rs:42:math::adds"),
                criterion::black_box("2 + 2 == 5"),
            ))
        });
    });
}

criterion_group!(benches, bench_stamp, bench_verify, bench_fingerprint);
criterion_main!(benches);
