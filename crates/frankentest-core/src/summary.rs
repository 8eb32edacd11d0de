//! Run summary, feedback sentence and elapsed-time formatting.

use serde::Serialize;

use crate::score::Score;
use crate::suite::TestSuite;

/// Per-suite slice of a run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub score: Score,
    pub total_score: u32,
    pub total_possible: u32,
    pub elapsed_ns: u64,
    pub ledger_hash: String,
    /// Case names in the order they ran.
    pub execution_order: Vec<String>,
}

impl SuiteReport {
    #[must_use]
    pub fn from_suite(suite: &TestSuite) -> Self {
        Self {
            name: suite.name().to_string(),
            score: *suite.score(),
            total_score: suite.total_score(),
            total_possible: suite.total_possible(),
            elapsed_ns: suite.elapsed_ns(),
            ledger_hash: suite.ledger().hash.clone(),
            execution_order: suite
                .execution_order()
                .iter()
                .map(|&i| suite.cases()[i].name().to_string())
                .collect(),
        }
    }
}

/// Aggregate result of `run_all`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub suites_run: usize,
    pub score: Score,
    pub score_total: u32,
    pub score_possible: u32,
    pub elapsed_ns: u64,
    /// True when fail-fast stopped the run early.
    pub aborted: bool,
    /// Engine-run ledger hash; empty if the engine never ran.
    pub ledger_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
    pub suites: Vec<SuiteReport>,
}

impl RunSummary {
    /// Percentage of possible points scored, 0 when nothing ran.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.score_possible == 0 {
            0.0
        } else {
            f64::from(self.score_total) / f64::from(self.score_possible) * 100.0
        }
    }

    #[must_use]
    pub fn feedback(&self) -> &'static str {
        summary_feedback(&self.score)
    }

    #[must_use]
    pub fn elapsed_clock(&self) -> String {
        format_clock(self.elapsed_ns)
    }

    /// No failed, timed out or unexpected case.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.score.has_failures()
    }

    /// Process exit code for this run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }
}

/// One-sentence verdict on a score.
#[must_use]
pub fn summary_feedback(score: &Score) -> &'static str {
    let total = score.total();
    if total == 0 {
        return "No tests were run.";
    }
    let total = f64::from(total);
    let pass_rate = f64::from(score.passed) / total * 100.0;
    let fail_ratio = f64::from(score.failed + score.unexpected) / total;

    if pass_rate >= 100.0 {
        "Perfect run! All tests passed. Great job."
    } else if fail_ratio > 0.5 {
        "High failure rate detected. Investigate the failing and unexpected tests."
    } else if score.timeout > 0 {
        "Some tests timed out. Check for infinite loops or delays."
    } else if score.skipped > 0 {
        "Some tests were skipped. Make sure all dependencies are in place."
    } else if score.empty > 0 && score.passed == 0 {
        "All tests are empty or unimplemented."
    } else {
        "Test run completed. Review failures and improve reliability."
    }
}

/// `"{s} s {us} us {ns} ns"`; `us` is the microsecond part below one second.
#[must_use]
pub fn format_ns(ns: u64) -> String {
    let secs = ns / 1_000_000_000;
    let micros = (ns % 1_000_000_000) / 1_000;
    let nanos = ns % 1_000;
    format!("{secs} s {micros} us {nanos} ns")
}

/// `HH:MM:SS.UUU,NNN`: hours, minutes, seconds, then the microsecond and nanosecond
/// thousandths.
#[must_use]
pub fn format_clock(ns: u64) -> String {
    let total_us = ns / 1_000;
    let total_s = total_us / 1_000_000;
    format!(
        "{:02}:{:02}:{:02}.{:03},{:03}",
        total_s / 3600,
        (total_s % 3600) / 60,
        total_s % 60,
        total_us % 1_000,
        ns % 1_000
    )
}
