use std::fmt;

use frankentest_ledger::{LedgerChain, LedgerIdentity, LedgerMaterial, LedgerRecord, StampClock};

use crate::case::{Hook, TestCase};
use crate::error::EngineError;
use crate::registry::reserve_slot;
use crate::score::Score;

/// Named, ordered collection of cases sharing setup and teardown.
pub struct TestSuite {
    name: String,
    pub(crate) cases: Vec<TestCase>,
    setup: Option<Hook>,
    teardown: Option<Hook>,
    pub(crate) identity: LedgerIdentity,
    pub(crate) clock: StampClock,
    pub(crate) score: Score,
    pub(crate) total_score: u32,
    pub(crate) total_possible: u32,
    pub(crate) elapsed_ns: u64,
    pub(crate) ledger: LedgerRecord,
    pub(crate) case_chain: LedgerChain,
    pub(crate) execution_order: Vec<usize>,
}

impl TestSuite {
    /// A suite stamped with the default identity and the wall clock.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_identity(name, LedgerIdentity::default(), StampClock::Wall)
    }

    #[must_use]
    pub fn with_identity(
        name: impl Into<String>,
        identity: LedgerIdentity,
        clock: StampClock,
    ) -> Self {
        let ledger = LedgerRecord::unstamped(&identity);
        Self {
            name: name.into(),
            cases: Vec::new(),
            setup: None,
            teardown: None,
            identity,
            clock,
            score: Score::default(),
            total_score: 0,
            total_possible: 0,
            elapsed_ns: 0,
            ledger,
            case_chain: LedgerChain::new(),
            execution_order: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_setup(mut self, setup: impl Fn() + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    #[must_use]
    pub fn with_teardown(mut self, teardown: impl Fn() + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Register a case at the end of the suite.
    ///
    /// Duplicate names are accepted as independent entries. The case is stamped onto
    /// the suite's case chain (material: name, criteria, author) before it is appended.
    /// On allocation failure neither the case list nor the chain changes.
    pub fn add_case(&mut self, mut case: TestCase) -> Result<(), EngineError> {
        reserve_slot(&mut self.cases, "case")?;
        self.case_chain.try_reserve(1)?;
        let material = LedgerMaterial::new("case.register")
            .field("name", case.name())
            .field("criteria", case.criteria())
            .field("author", &self.identity.author);
        case.ledger = self
            .case_chain
            .stamp(&self.identity, self.clock.now(), &material)?;
        self.cases.push(case);
        Ok(())
    }

    /// Builder form of [`Self::add_case`].
    pub fn case(mut self, case: TestCase) -> Result<Self, EngineError> {
        self.add_case(case)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cases in registration order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    #[must_use]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub fn total_possible(&self) -> u32 {
        self.total_possible
    }

    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    #[must_use]
    pub fn ledger(&self) -> &LedgerRecord {
        &self.ledger
    }

    /// Case registrations and results, in the order they were stamped.
    #[must_use]
    pub fn case_chain(&self) -> &LedgerChain {
        &self.case_chain
    }

    /// Case indices in the order the last run executed them.
    #[must_use]
    pub fn execution_order(&self) -> &[usize] {
        &self.execution_order
    }

    #[must_use]
    pub fn identity(&self) -> &LedgerIdentity {
        &self.identity
    }

    pub(crate) fn setup_hook(&self) -> Option<&Hook> {
        self.setup.as_ref()
    }

    pub(crate) fn teardown_hook(&self) -> Option<&Hook> {
        self.teardown.as_ref()
    }

    pub(crate) fn reset_run_state(&mut self) {
        self.score = Score::default();
        self.total_score = 0;
        self.total_possible = 0;
        self.elapsed_ns = 0;
        self.execution_order.clear();
    }
}

impl fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("cases", &self.cases)
            .field("score", &self.score)
            .field("total_possible", &self.total_possible)
            .field("elapsed_ns", &self.elapsed_ns)
            .field("ledger", &self.ledger.hash)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_case_preserves_insertion_order_and_duplicates() {
        let mut suite = TestSuite::new("math");
        for name in ["B", "A", "C", "A"] {
            suite.add_case(TestCase::new(name)).unwrap();
        }
        let names: Vec<&str> = suite.cases().iter().map(TestCase::name).collect();
        assert_eq!(names, ["B", "A", "C", "A"]);
    }

    #[test]
    fn registration_stamps_case_chain() {
        let suite = TestSuite::with_identity(
            "math",
            LedgerIdentity::new("qa", "ci"),
            StampClock::Fixed(100),
        )
        .case(TestCase::new("A").with_criteria("sums"))
        .and_then(|s| s.case(TestCase::new("B")))
        .unwrap();
        let chain = suite.case_chain();
        assert_eq!(chain.len(), 2);
        assert!(chain.verify().is_ok());
        assert_eq!(suite.cases()[0].ledger().hash, chain.records()[0].hash);
        assert_eq!(
            suite.cases()[1].ledger().prev_hash.as_deref(),
            Some(suite.cases()[0].ledger().hash.as_str())
        );
        assert_eq!(suite.cases()[0].ledger().author, "qa");
        assert_eq!(suite.cases()[0].ledger().timestamp, 100);
    }
}
