//! Integration test: registration order, sort and seeded shuffle through the engine.

use std::time::Duration;

use frankentest_core::{AssertResult, Engine, NullReporter, Pallet, Probe, TestCase, TestSuite};

fn names(engine: &Engine, suite: usize) -> Vec<String> {
    engine.summary().suites[suite].execution_order.clone()
}

fn sleeper(ms: u64) -> impl Fn(&mut Probe<'_>) -> AssertResult + 'static {
    move |_| {
        std::thread::sleep(Duration::from_millis(ms));
        Ok(())
    }
}

fn lettered(engine: &Engine, count: usize) -> TestSuite {
    let mut suite = engine.create_suite("letters");
    for i in 0..count {
        let name = format!("case_{i:02}");
        suite
            .add_case(TestCase::new(name).with_body(|_| Ok(())))
            .expect("registration should succeed");
    }
    suite
}

#[test]
fn default_order_is_registration_order() {
    let mut engine = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
    let mut suite = engine.create_suite("s");
    for name in ["B", "A", "C"] {
        suite.add_case(TestCase::new(name).with_body(|_| Ok(()))).unwrap();
    }
    engine.add_suite(suite).unwrap();
    engine.run_all().unwrap();
    assert_eq!(names(&engine, 0), ["B", "A", "C"]);
    let registered: Vec<&str> = engine.suite(0).unwrap().cases().iter().map(TestCase::name).collect();
    assert_eq!(registered, ["B", "A", "C"]);
}

#[test]
fn name_sort_descending() {
    let mut pallet = Pallet::default();
    pallet.sort.by = Some("name".to_string());
    pallet.sort.order = Some("desc".to_string());
    let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
    let mut suite = engine.create_suite("s");
    for name in ["B", "A", "C"] {
        suite.add_case(TestCase::new(name).with_body(|_| Ok(()))).unwrap();
    }
    engine.add_suite(suite).unwrap();
    engine.run_all().unwrap();
    assert_eq!(names(&engine, 0), ["C", "B", "A"]);
}

#[test]
fn time_sort_uses_previous_run_elapsed() {
    let mut pallet = Pallet::default();
    pallet.sort.by = Some("time".to_string());
    let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
    let suite = engine
        .create_suite("timed")
        .case(TestCase::new("slow").with_body(sleeper(30)))
        .and_then(|s| s.case(TestCase::new("fast").with_body(sleeper(1))))
        .and_then(|s| s.case(TestCase::new("medium").with_body(sleeper(15))))
        .unwrap();
    engine.add_suite(suite).unwrap();

    // First run has no timings yet; the second sorts by what the first measured.
    engine.run_all().unwrap();
    engine.run_all().unwrap();
    assert_eq!(names(&engine, 0), ["fast", "medium", "slow"]);
}

#[test]
fn fixed_seed_shuffle_reproduces_across_engines() {
    let run = |seed: u64| {
        let mut pallet = Pallet::default();
        pallet.shuffle.enabled = true;
        pallet.shuffle.seed = Some(seed);
        let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
        let suite = lettered(&engine, 12);
        engine.add_suite(suite).unwrap();
        let summary = engine.run_all().unwrap();
        assert_eq!(summary.shuffle_seed, Some(seed));
        names(&engine, 0)
    };
    let first = run(0x5EED);
    assert_eq!(first, run(0x5EED));
    assert_ne!(first, run(0x5EED + 1));
    let mut sorted = first.clone();
    sorted.sort();
    let expected: Vec<String> = (0..12).map(|i| format!("case_{i:02}")).collect();
    assert_eq!(sorted, expected);
}

#[test]
fn unseeded_shuffle_still_reports_its_seed() {
    let mut pallet = Pallet::default();
    pallet.shuffle.enabled = true;
    let engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
    assert!(engine.shuffle_seed().is_some());

    let plain = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
    assert!(plain.shuffle_seed().is_none());
}

#[test]
fn tag_and_suite_filters_select_cases() {
    let mut pallet = Pallet::default();
    pallet.filter.tag = Some("fast".to_string());
    pallet.filter.suite = Some("wanted".to_string());
    let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
    for suite_name in ["wanted", "ignored"] {
        let suite = engine
            .create_suite(suite_name)
            .case(TestCase::new("a").with_tags("fast,unit").with_body(|_| Ok(())))
            .and_then(|s| s.case(TestCase::new("b").with_tags("slow").with_body(|_| Ok(()))))
            .unwrap();
        engine.add_suite(suite).unwrap();
    }
    let summary = engine.run_all().unwrap();
    assert_eq!(summary.suites_run, 2);
    assert_eq!(summary.suites[0].execution_order, ["a"]);
    assert!(summary.suites[1].execution_order.is_empty());
    assert_eq!(summary.score_possible, 1);
}
