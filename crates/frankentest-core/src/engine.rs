//! Run engine: suite registry, per-suite pipeline and the case state machine.
//!
//! Lifecycle: [`Engine::start`], then [`Engine::add_suite`] / [`TestSuite::add_case`]
//! during registration, then [`Engine::run_all`], then [`Engine::end`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use frankentest_ledger::{LedgerChain, LedgerIdentity, LedgerMaterial, LedgerRecord, StampClock};
use serde_json::json;

use crate::assertion::Probe;
use crate::context::ExecutionContext;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::pallet::Pallet;
use crate::pipeline::{self, wall_clock_seed};
use crate::registry::reserve_slot;
use crate::render;
use crate::reporter::Reporter;
use crate::score::Score;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel};
use crate::suite::TestSuite;
use crate::summary::{RunSummary, SuiteReport};

/// How a suite run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFlow {
    Completed,
    /// A case failed under fail-fast; the rest of the run must not execute.
    Aborted,
}

/// How a single case run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFlow {
    Completed,
    /// `run.only` names a different case; nothing ran and nothing was scored.
    Excluded,
    Aborted,
}

fn duration_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

const fn result_level(outcome: Outcome) -> LogLevel {
    match outcome {
        Outcome::Fail | Outcome::Unexpected => LogLevel::Error,
        Outcome::Timeout => LogLevel::Warn,
        Outcome::Empty | Outcome::Pass | Outcome::Skipped => LogLevel::Info,
    }
}

/// Pallet-derived values every case run reads.
struct RunSettings<'a> {
    pallet: &'a Pallet,
    timeout: Duration,
    shuffle_seed: u64,
    show_result: Option<Outcome>,
}

impl<'a> RunSettings<'a> {
    fn new(pallet: &'a Pallet, timeout: Duration, shuffle_seed: u64) -> Self {
        Self {
            pallet,
            timeout,
            shuffle_seed,
            show_result: pallet.show_result(),
        }
    }
}

/// Test engine. Owns every suite, the engine ledger chain and the execution context.
pub struct Engine {
    suites: Vec<TestSuite>,
    score: Score,
    score_total: u32,
    score_possible: u32,
    suites_run: usize,
    elapsed_ns: u64,
    aborted: bool,
    ledger: LedgerRecord,
    chain: LedgerChain,
    pallet: Pallet,
    identity: LedgerIdentity,
    clock: StampClock,
    timeout: Duration,
    shuffle_seed: u64,
    run_id: String,
    ctx: ExecutionContext,
}

impl Engine {
    /// Validate the pallet and build an engine that reports through `reporter`.
    ///
    /// The shuffle seed is fixed here: the pallet's seed when given, otherwise the
    /// wall clock.
    pub fn start(pallet: Pallet, reporter: Box<dyn Reporter>) -> Result<Self, EngineError> {
        pallet.validate()?;
        let identity = pallet.identity();
        let clock = pallet.clock();
        let run_id = pallet
            .run_id
            .clone()
            .unwrap_or_else(|| format!("run-{}", clock.now()));
        Ok(Self {
            suites: Vec::new(),
            score: Score::default(),
            score_total: 0,
            score_possible: 0,
            suites_run: 0,
            elapsed_ns: 0,
            aborted: false,
            ledger: LedgerRecord::unstamped(&identity),
            chain: LedgerChain::new(),
            timeout: pallet.timeout(),
            shuffle_seed: pallet.shuffle.seed.unwrap_or_else(wall_clock_seed),
            ctx: ExecutionContext::new(pallet.theme, reporter),
            identity,
            clock,
            run_id,
            pallet,
        })
    }

    /// Attach a structured log. Builder form of [`Self::set_log`].
    #[must_use]
    pub fn with_log(mut self, emitter: LogEmitter) -> Self {
        self.set_log(emitter);
        self
    }

    pub fn set_log(&mut self, emitter: LogEmitter) {
        self.ctx.set_log(emitter);
    }

    /// An empty suite carrying the engine's ledger identity and clock.
    #[must_use]
    pub fn create_suite(&self, name: impl Into<String>) -> TestSuite {
        TestSuite::with_identity(name, self.identity.clone(), self.clock)
    }

    /// Register a suite after the existing ones.
    ///
    /// Stamps a registration record (name, author, origin) onto the engine chain. On
    /// allocation failure neither the registry nor the chain changes.
    pub fn add_suite(&mut self, mut suite: TestSuite) -> Result<(), EngineError> {
        reserve_slot(&mut self.suites, "suite")?;
        self.chain.try_reserve(1)?;
        let material = LedgerMaterial::new("suite.register")
            .field("name", suite.name())
            .field("author", &suite.identity.author)
            .field("origin", &suite.identity.origin_device_id);
        suite.ledger = self
            .chain
            .stamp(&suite.identity, suite.clock.now(), &material)?;
        self.suites.push(suite);
        Ok(())
    }

    /// Run one suite through filter, sort, shuffle and the case loop.
    ///
    /// The suite's own setup is not guarded: a panic there propagates to the caller.
    pub fn run_suite(&mut self, index: usize) -> Result<SuiteFlow, EngineError> {
        let count = self.suites.len();
        let settings = RunSettings::new(&self.pallet, self.timeout, self.shuffle_seed);
        let suite = self
            .suites
            .get_mut(index)
            .ok_or(EngineError::UnknownSuite { index, count })?;

        let flow = execute_suite(suite, &mut self.ctx, &settings)?;

        self.chain.try_reserve(1)?;
        let material = LedgerMaterial::new("suite.run")
            .field("name", suite.name())
            .field("author", &suite.identity.author)
            .field("origin", &suite.identity.origin_device_id)
            .field("elapsed_ns", suite.elapsed_ns)
            .field("passed", suite.score.passed)
            .field("failed", suite.score.failed);
        suite.ledger = self
            .chain
            .stamp(&suite.identity, suite.clock.now(), &material)?;

        let summary = render::suite_summary(self.ctx.theme(), suite);
        self.ctx.report(&summary);
        self.ctx.log(
            LogEntry::untraced(LogLevel::Info, "suite_complete")
                .with_suite(suite.name())
                .with_elapsed_ns(suite.elapsed_ns)
                .with_ledger_hash(suite.ledger.hash.clone())
                .with_details(json!({
                    "score_total": suite.total_score,
                    "score_possible": suite.total_possible,
                    "aborted": flow == SuiteFlow::Aborted,
                })),
        );
        self.ctx.check_log()?;
        Ok(flow)
    }

    /// Run a single case outside the pipeline, without suite hooks.
    ///
    /// `run.only` and `run.skip` still apply. The suite's score and case chain are
    /// updated as they would be inside [`Self::run_suite`].
    pub fn run_test(&mut self, suite_index: usize, case_index: usize) -> Result<CaseFlow, EngineError> {
        let count = self.suites.len();
        let settings = RunSettings::new(&self.pallet, self.timeout, self.shuffle_seed);
        let suite = self.suites.get_mut(suite_index).ok_or(EngineError::UnknownSuite {
            index: suite_index,
            count,
        })?;
        if case_index >= suite.cases.len() {
            return Err(EngineError::UnknownCase {
                suite: suite.name().to_string(),
                index: case_index,
            });
        }
        if let Some(only) = settings.pallet.run.only.as_deref()
            && only != suite.cases[case_index].name()
        {
            return Ok(CaseFlow::Excluded);
        }
        let flow = run_case(suite, case_index, &mut self.ctx, &settings)?;
        self.ctx.check_log()?;
        Ok(flow)
    }

    /// Run every suite in registration order and stamp the engine-run record.
    ///
    /// Stops after the first suite that reports a fail-fast abort.
    pub fn run_all(&mut self) -> Result<RunSummary, EngineError> {
        self.score = Score::default();
        self.score_total = 0;
        self.score_possible = 0;
        self.suites_run = 0;
        self.aborted = false;

        let mut start = LogEntry::untraced(LogLevel::Info, "run_start").with_details(json!({
            "suites": self.suites.len(),
            "theme": self.pallet.theme.name(),
            "repeat": self.pallet.run.repeat,
            "fail_fast": self.pallet.run.fail_fast,
            "timeout_secs": self.timeout.as_secs(),
        }));
        if self.pallet.shuffle.enabled {
            start = start.with_seed(self.shuffle_seed);
        }
        self.ctx.log(start);

        let started = Instant::now();
        for index in 0..self.suites.len() {
            let flow = self.run_suite(index)?;
            let suite = &self.suites[index];
            self.score.absorb(suite.score());
            self.score_total += suite.total_score;
            self.score_possible += suite.total_possible;
            self.suites_run += 1;
            if flow == SuiteFlow::Aborted {
                self.aborted = true;
                break;
            }
        }
        self.elapsed_ns = duration_ns(started.elapsed());

        self.chain.try_reserve(1)?;
        let material = LedgerMaterial::new("engine.run")
            .field("author", &self.identity.author)
            .field("origin", &self.identity.origin_device_id)
            .field("score_total", self.score_total)
            .field("score_possible", self.score_possible)
            .field("passed", self.score.passed)
            .field("failed", self.score.failed);
        self.ledger = self
            .chain
            .stamp(&self.identity, self.clock.now(), &material)?;

        let summary = self.summary();
        let text = render::run_summary(self.ctx.theme(), &summary);
        self.ctx.report(&text);
        let level = if summary.is_success() {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        self.ctx.log(
            LogEntry::untraced(level, "run_complete")
                .with_elapsed_ns(self.elapsed_ns)
                .with_ledger_hash(self.ledger.hash.clone())
                .with_message(summary.feedback())
                .with_details(json!({
                    "suites_run": self.suites_run,
                    "score_total": self.score_total,
                    "score_possible": self.score_possible,
                    "aborted": self.aborted,
                })),
        );
        self.ctx.check_log()?;
        Ok(summary)
    }

    /// Finish the run: flush the log and hand back the final summary.
    pub fn end(mut self) -> Result<RunSummary, EngineError> {
        self.ctx.flush_log()?;
        Ok(self.summary())
    }

    /// Snapshot of the aggregate state.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            suites_run: self.suites_run,
            score: self.score,
            score_total: self.score_total,
            score_possible: self.score_possible,
            elapsed_ns: self.elapsed_ns,
            aborted: self.aborted,
            ledger_hash: self.ledger.hash.clone(),
            shuffle_seed: self.shuffle_seed(),
            suites: self.suites.iter().map(SuiteReport::from_suite).collect(),
        }
    }

    #[must_use]
    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    #[must_use]
    pub fn suite(&self, index: usize) -> Option<&TestSuite> {
        self.suites.get(index)
    }

    /// Mutable access for registering cases on an already added suite.
    pub fn suite_mut(&mut self, index: usize) -> Option<&mut TestSuite> {
        self.suites.get_mut(index)
    }

    #[must_use]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[must_use]
    pub fn score_total(&self) -> u32 {
        self.score_total
    }

    #[must_use]
    pub fn score_possible(&self) -> u32 {
        self.score_possible
    }

    #[must_use]
    pub fn ledger(&self) -> &LedgerRecord {
        &self.ledger
    }

    /// Suite registrations, suite runs and engine runs.
    #[must_use]
    pub fn chain(&self) -> &LedgerChain {
        &self.chain
    }

    #[must_use]
    pub fn pallet(&self) -> &Pallet {
        &self.pallet
    }

    #[must_use]
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Seed the shuffle step uses; `None` when shuffling is disabled.
    #[must_use]
    pub fn shuffle_seed(&self) -> Option<u64> {
        self.pallet.shuffle.enabled.then_some(self.shuffle_seed)
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

// ---------------------------------------------------------------------------
// Suite and case execution
// ---------------------------------------------------------------------------

fn execute_suite(
    suite: &mut TestSuite,
    ctx: &mut ExecutionContext,
    settings: &RunSettings<'_>,
) -> Result<SuiteFlow, EngineError> {
    ctx.log(LogEntry::untraced(LogLevel::Info, "suite_start").with_suite(suite.name()));

    if let Some(setup) = suite.setup_hook() {
        setup();
    }
    suite.reset_run_state();

    let plan = pipeline::plan(suite.name(), &suite.cases, settings.pallet, settings.shuffle_seed);
    for warning in &plan.warnings {
        ctx.log(
            LogEntry::untraced(LogLevel::Warn, "pipeline_warning")
                .with_suite(suite.name())
                .with_message(warning.as_str()),
        );
    }
    if let Some(seed) = plan.seed {
        ctx.log(
            LogEntry::untraced(LogLevel::Info, "shuffle_seed")
                .with_suite(suite.name())
                .with_seed(seed),
        );
    }

    let mut flow = SuiteFlow::Completed;
    for &case_index in &plan.order {
        suite.execution_order.push(case_index);
        if run_case(suite, case_index, ctx, settings)? == CaseFlow::Aborted {
            flow = SuiteFlow::Aborted;
            break;
        }
    }

    if let Some(teardown) = suite.teardown_hook() {
        teardown();
    }
    Ok(flow)
}

/// Result of one iteration of a case.
struct Attempt {
    outcome: Outcome,
    elapsed_ns: u64,
}

fn attempt_case(
    suite: &TestSuite,
    case_index: usize,
    ctx: &mut ExecutionContext,
    timeout: Duration,
) -> Attempt {
    let case = &suite.cases[case_index];
    let Some(body) = case.body() else {
        return Attempt {
            outcome: Outcome::Empty,
            elapsed_ns: 0,
        };
    };

    let started = Instant::now();
    let result = {
        let mut probe = Probe::new(ctx, suite.name(), case.name());
        panic::catch_unwind(AssertUnwindSafe(|| body(&mut probe)))
    };
    let elapsed = started.elapsed();

    let outcome = match result {
        Ok(Ok(())) if elapsed > timeout => Outcome::Timeout,
        Ok(Ok(())) => Outcome::Pass,
        Ok(Err(_)) => Outcome::Fail,
        Err(payload) => {
            ctx.log(
                LogEntry::untraced(LogLevel::Error, "case_panic")
                    .with_suite(suite.name())
                    .with_case(case.name())
                    .with_message(panic_message(payload.as_ref())),
            );
            Outcome::Unexpected
        }
    };
    Attempt {
        outcome,
        elapsed_ns: duration_ns(elapsed),
    }
}

fn run_case(
    suite: &mut TestSuite,
    case_index: usize,
    ctx: &mut ExecutionContext,
    settings: &RunSettings<'_>,
) -> Result<CaseFlow, EngineError> {
    let pallet = settings.pallet;
    let skipped = pallet
        .run
        .skip
        .as_deref()
        .is_some_and(|name| name == suite.cases[case_index].name());

    let mut last = Attempt {
        outcome: Outcome::Skipped,
        elapsed_ns: 0,
    };
    let mut iterations = 0;
    let mut flow = CaseFlow::Completed;
    if !skipped {
        let case = &suite.cases[case_index];
        for _ in 0..pallet.run.repeat {
            if let Some(setup) = case.setup_hook() {
                setup();
            }
            last = attempt_case(suite, case_index, ctx, settings.timeout);
            iterations += 1;
            if let Some(teardown) = case.teardown_hook() {
                teardown();
            }
            if last.outcome == Outcome::Fail && pallet.run.fail_fast {
                flow = CaseFlow::Aborted;
                break;
            }
        }
    }

    suite.case_chain.try_reserve(1)?;
    let timestamp = suite.clock.now();
    suite.score.record(last.outcome);
    suite.total_possible += 1;
    if last.outcome == Outcome::Pass {
        suite.total_score += 1;
    }
    suite.elapsed_ns = suite.elapsed_ns.saturating_add(last.elapsed_ns);

    let defaults = LedgerRecord::unstamped(&suite.identity);
    let case = &mut suite.cases[case_index];
    case.outcome = last.outcome;
    case.elapsed_ns = last.elapsed_ns;
    let material = LedgerMaterial::new("case.result")
        .field("name", case.name())
        .field("author", &suite.identity.author)
        .field("origin", &suite.identity.origin_device_id)
        .field("result", last.outcome.ordinal())
        .field_f64("trust", defaults.trust_score)
        .field_f64("confidence", defaults.confidence)
        .field("timestamp", timestamp);
    case.ledger = suite.case_chain.stamp(&suite.identity, timestamp, &material)?;

    let assertions = ctx.assertion_count();
    ctx.reset_assertions();

    let case = &suite.cases[case_index];
    if settings.show_result.is_none_or(|shown| shown == last.outcome) {
        let show = &pallet.show;
        let line = render::case_line(ctx.theme(), show.mode, show.verbose, case);
        ctx.report(&line);
    }
    ctx.log(
        LogEntry::untraced(result_level(last.outcome), "case_result")
            .with_suite(suite.name())
            .with_case(case.name())
            .with_outcome(last.outcome)
            .with_elapsed_ns(last.elapsed_ns)
            .with_ledger_hash(case.ledger.hash.clone())
            .with_details(json!({
                "assertions": assertions,
                "iterations": iterations,
            })),
    );

    if flow == CaseFlow::Aborted {
        ctx.log(
            LogEntry::untraced(LogLevel::Warn, "fail_fast_abort")
                .with_suite(suite.name())
                .with_case(case.name())
                .with_message("fail-fast: remaining cases and suites will not run"),
        );
    }
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::TestCase;
    use crate::reporter::{MemoryReporter, NullReporter};

    #[test]
    fn start_rejects_invalid_pallet() {
        let mut pallet = Pallet::default();
        pallet.run.repeat = 0;
        assert!(matches!(
            Engine::start(pallet, Box::new(NullReporter)),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_indices_are_errors() {
        let mut engine = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
        assert!(matches!(
            engine.run_suite(0),
            Err(EngineError::UnknownSuite { index: 0, count: 0 })
        ));
        let suite = engine.create_suite("s");
        engine.add_suite(suite).unwrap();
        assert!(matches!(
            engine.run_test(0, 3),
            Err(EngineError::UnknownCase { index: 3, .. })
        ));
    }

    #[test]
    fn panic_message_extracts_strings() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        assert_eq!(panic_message(owned.as_ref()), "boom");
        let borrowed: Box<dyn Any + Send> = Box::new("bang");
        assert_eq!(panic_message(borrowed.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn run_test_honours_only_and_reports_case() {
        let sink = MemoryReporter::default();
        let mut pallet = Pallet::default();
        pallet.run.only = Some("b".to_string());
        let mut engine = Engine::start(pallet, Box::new(sink.clone())).unwrap();
        let suite = engine
            .create_suite("s")
            .case(TestCase::new("a").with_body(|_| Ok(())))
            .and_then(|s| s.case(TestCase::new("b").with_body(|_| Ok(()))))
            .unwrap();
        engine.add_suite(suite).unwrap();

        assert_eq!(engine.run_test(0, 0).unwrap(), CaseFlow::Excluded);
        assert_eq!(engine.run_test(0, 1).unwrap(), CaseFlow::Completed);
        let suite = engine.suite(0).unwrap();
        assert_eq!(suite.cases()[0].outcome(), Outcome::Empty);
        assert_eq!(suite.cases()[1].outcome(), Outcome::Pass);
        assert_eq!(suite.total_possible(), 1);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn end_without_run_returns_empty_summary() {
        let engine = Engine::start(Pallet::default(), Box::new(NullReporter)).unwrap();
        let summary = engine.end().unwrap();
        assert_eq!(summary.suites_run, 0);
        assert!(summary.ledger_hash.is_empty());
        assert_eq!(summary.feedback(), "No tests were run.");
    }
}
