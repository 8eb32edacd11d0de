//! Engine benchmarks: registration and full runs.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use frankentest_core::{Engine, NullReporter, Pallet, TestCase, TestSuite};

fn suite_of(engine: &Engine, cases: usize) -> TestSuite {
    let mut suite = engine.create_suite("bench");
    for i in 0..cases {
        let case = TestCase::new(format!("case_{i}"))
            .with_tags("bench")
            .with_body(move |p| p.check(i.checked_add(1).is_some(), "index in range"));
        suite.add_case(case).expect("registration should succeed");
    }
    suite
}

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_cases");
    for &cases in &[16_usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(cases), &cases, |b, &n| {
            let engine = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
            b.iter(|| criterion::black_box(suite_of(&engine, n)));
        });
    }
    group.finish();
}

fn bench_run_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_all");
    for (label, shuffle) in [("ordered", false), ("shuffled", true)] {
        group.bench_function(label, |b| {
            let mut pallet = Pallet::default();
            pallet.shuffle.enabled = shuffle;
            pallet.shuffle.seed = Some(0xDEAD_BEEF);
            pallet.fixed_timestamp = Some(1_767_225_600);
            let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
            let suite = suite_of(&engine, 256);
            engine.add_suite(suite).unwrap();
            b.iter(|| criterion::black_box(engine.run_all().unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_register, bench_run_all);
criterion_main!(benches);
