use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// One counter per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub timeout: u32,
    pub unexpected: u32,
    pub empty: u32,
}

impl Score {
    pub fn record(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Empty => &mut self.empty,
            Outcome::Pass => &mut self.passed,
            Outcome::Fail => &mut self.failed,
            Outcome::Timeout => &mut self.timeout,
            Outcome::Skipped => &mut self.skipped,
            Outcome::Unexpected => &mut self.unexpected,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Empty => self.empty,
            Outcome::Pass => self.passed,
            Outcome::Fail => self.failed,
            Outcome::Timeout => self.timeout,
            Outcome::Skipped => self.skipped,
            Outcome::Unexpected => self.unexpected,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        Outcome::ALL.iter().map(|o| self.get(*o)).sum()
    }

    /// Add another tally into this one.
    pub fn absorb(&mut self, other: &Score) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.timeout += other.timeout;
        self.unexpected += other.unexpected;
        self.empty += other.empty;
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed + self.timeout + self.unexpected > 0
    }
}
