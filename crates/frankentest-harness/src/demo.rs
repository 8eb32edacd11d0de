//! Built-in suites the `run` subcommand executes.

use std::cell::Cell;
use std::rc::Rc;

use frankentest_core::{CallRecorder, Engine, EngineError, TestCase, check, check_eq};

/// Which built-in suites to register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DemoSet {
    /// Suites that pass.
    #[default]
    Smoke,
    /// One passing, one failing and one empty case.
    Math,
    All,
}

impl DemoSet {
    /// Parse from string (case-insensitive). Unknown names select `Smoke`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Self::Math,
            "all" => Self::All,
            _ => Self::Smoke,
        }
    }
}

/// Register the suites of `set` on `engine`, in a fixed order.
pub fn register(engine: &mut Engine, set: DemoSet) -> Result<(), EngineError> {
    if matches!(set, DemoSet::Smoke | DemoSet::All) {
        register_strings(engine)?;
        register_fixtures(engine)?;
    }
    if matches!(set, DemoSet::Math | DemoSet::All) {
        register_math(engine)?;
    }
    Ok(())
}

fn register_math(engine: &mut Engine) -> Result<(), EngineError> {
    let suite = engine
        .create_suite("math")
        .case(
            TestCase::new("adds")
                .with_tags("arith,fast")
                .with_criteria("2 + 2 is 4")
                .with_body(|p| {
                    p.given("two numbers");
                    p.when("they are added");
                    check_eq!(p, 2 + 2, 4);
                    p.then("the sum is returned");
                    Ok(())
                }),
        )?
        .case(
            TestCase::new("breaks")
                .with_tags("arith")
                .with_criteria("deliberately wrong")
                .with_body(|p| {
                    check!(p, 2 + 2 == 5);
                    Ok(())
                }),
        )?
        .case(TestCase::new("todo").with_tags("pending"))?;
    engine.add_suite(suite)
}

fn register_strings(engine: &mut Engine) -> Result<(), EngineError> {
    let suite = engine
        .create_suite("strings")
        .case(
            TestCase::new("uppercase")
                .with_tags("text,fast")
                .with_criteria("ascii is uppercased")
                .with_body(|p| {
                    check_eq!(p, "fossil".to_ascii_uppercase(), "FOSSIL");
                    Ok(())
                }),
        )?
        .case(
            TestCase::new("split_words")
                .with_tags("text")
                .with_criteria("whitespace separates words")
                .with_body(|p| {
                    let words: Vec<&str> = "a  b\tc".split_whitespace().collect();
                    check_eq!(p, words.len(), 3);
                    check!(p, words.iter().all(|w| w.len() == 1), "words: {words:?}");
                    Ok(())
                }),
        )?;
    engine.add_suite(suite)
}

fn register_fixtures(engine: &mut Engine) -> Result<(), EngineError> {
    let opened = Rc::new(Cell::new(0_u32));
    let calls = CallRecorder::new();

    let on_setup = Rc::clone(&opened);
    let on_teardown = Rc::clone(&opened);
    let in_body = Rc::clone(&opened);
    let stub = calls.clone();
    let seen = calls.clone();

    let suite = engine
        .create_suite("fixtures")
        .with_setup(move || on_setup.set(on_setup.get() + 1))
        .with_teardown(move || on_teardown.set(on_teardown.get().saturating_sub(1)))
        .case(
            TestCase::new("setup_ran")
                .with_tags("hooks")
                .with_criteria("suite setup runs before cases")
                .with_body(move |p| {
                    check_eq!(p, in_body.get(), 1);
                    Ok(())
                }),
        )?
        .case(
            TestCase::new("records_calls")
                .with_tags("mock")
                .with_criteria("stubbed collaborator sees its arguments")
                .with_setup(move || stub.record("connect", &[&"db", &5432]))
                .with_teardown({
                    let calls = calls.clone();
                    move || calls.clear()
                })
                .with_body(move |p| {
                    check!(p, seen.was_called_with("connect", &[&"db", &5432]));
                    check_eq!(p, seen.call_count("connect"), 1);
                    Ok(())
                }),
        )?;
    engine.add_suite(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frankentest_core::{NullReporter, Outcome, Pallet};

    fn run(set: DemoSet) -> Engine {
        let mut engine = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
        register(&mut engine, set).unwrap();
        engine.run_all().unwrap();
        engine
    }

    #[test]
    fn smoke_set_passes() {
        let engine = run(DemoSet::Smoke);
        let summary = engine.summary();
        assert!(summary.is_success(), "{summary:?}");
        assert_eq!(summary.score.passed, 4);
    }

    #[test]
    fn math_set_matches_known_scores() {
        let engine = run(DemoSet::Math);
        let summary = engine.summary();
        assert_eq!(summary.score.passed, 1);
        assert_eq!(summary.score.failed, 1);
        assert_eq!(summary.score.empty, 1);
        assert_eq!(summary.score_possible, 3);
        let outcomes: Vec<Outcome> = engine.suites()[0]
            .cases()
            .iter()
            .map(TestCase::outcome)
            .collect();
        assert_eq!(outcomes, [Outcome::Pass, Outcome::Fail, Outcome::Empty]);
    }

    #[test]
    fn demo_set_parses() {
        assert_eq!(DemoSet::from_str_loose("MATH"), DemoSet::Math);
        assert_eq!(DemoSet::from_str_loose("all"), DemoSet::All);
        assert_eq!(DemoSet::from_str_loose("x"), DemoSet::Smoke);
    }
}
