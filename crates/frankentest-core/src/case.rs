use std::fmt;

use frankentest_ledger::LedgerRecord;

use crate::assertion::{AssertResult, Probe};
use crate::outcome::Outcome;

/// Setup or teardown hook.
pub type Hook = Box<dyn Fn()>;
/// Case body. Returns `Err` on the first failed check.
pub type CaseBody = Box<dyn Fn(&mut Probe<'_>) -> AssertResult>;

/// A single named test unit.
///
/// Built at registration time; the engine fills in outcome, elapsed time and ledger
/// record during a run.
pub struct TestCase {
    name: String,
    tags: String,
    criteria: String,
    setup: Option<Hook>,
    body: Option<CaseBody>,
    teardown: Option<Hook>,
    pub(crate) outcome: Outcome,
    pub(crate) elapsed_ns: u64,
    pub(crate) ledger: LedgerRecord,
}

impl TestCase {
    /// A case with no body. Runs as `Empty` until a body is attached.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: String::new(),
            criteria: String::new(),
            setup: None,
            body: None,
            teardown: None,
            outcome: Outcome::Empty,
            elapsed_ns: 0,
            ledger: LedgerRecord::default(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    #[must_use]
    pub fn with_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.criteria = criteria.into();
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: impl Fn() + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Fn(&mut Probe<'_>) -> AssertResult + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    #[must_use]
    pub fn with_teardown(mut self, teardown: impl Fn() + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn tags(&self) -> &str {
        &self.tags
    }

    #[must_use]
    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    #[must_use]
    pub fn ledger(&self) -> &LedgerRecord {
        &self.ledger
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn setup_hook(&self) -> Option<&Hook> {
        self.setup.as_ref()
    }

    pub(crate) fn body(&self) -> Option<&CaseBody> {
        self.body.as_ref()
    }

    pub(crate) fn teardown_hook(&self) -> Option<&Hook> {
        self.teardown.as_ref()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("criteria", &self.criteria)
            .field("has_setup", &self.setup.is_some())
            .field("has_body", &self.body.is_some())
            .field("has_teardown", &self.teardown.is_some())
            .field("outcome", &self.outcome)
            .field("elapsed_ns", &self.elapsed_ns)
            .finish()
    }
}
