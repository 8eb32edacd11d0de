//! Case outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final classification of a case after a run attempt.
///
/// `Empty` is both the pre-run default and the terminal state of a case without a body.
/// Ordinals follow declaration order and are what sorting by `result` compares.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Empty,
    Pass,
    Fail,
    Timeout,
    Skipped,
    Unexpected,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::Empty,
        Outcome::Pass,
        Outcome::Fail,
        Outcome::Timeout,
        Outcome::Skipped,
        Outcome::Unexpected,
    ];

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Pass => 1,
            Self::Fail => 2,
            Self::Timeout => 3,
            Self::Skipped => 4,
            Self::Unexpected => 5,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Timeout => "timeout",
            Self::Skipped => "skipped",
            Self::Unexpected => "unexpected",
        }
    }

    /// Parse a result label. Case-insensitive; accepts `passed`, `failed`, `skip`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "pass" | "passed" => Some(Self::Pass),
            "fail" | "failed" => Some(Self::Fail),
            "timeout" | "timed_out" => Some(Self::Timeout),
            "skip" | "skipped" => Some(Self::Skipped),
            "unexpected" => Some(Self::Unexpected),
            _ => None,
        }
    }

    /// Outcomes that make a run unsuccessful.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Timeout | Self::Unexpected)
    }

    /// Markup color used when rendering this outcome.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Pass => "green",
            Self::Fail | Self::Unexpected => "red",
            Self::Timeout | Self::Skipped => "yellow",
            Self::Empty => "cyan",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_declaration_order() {
        for (i, outcome) in Outcome::ALL.iter().enumerate() {
            assert_eq!(usize::from(outcome.ordinal()), i);
        }
        assert!(Outcome::Empty < Outcome::Unexpected);
    }

    #[test]
    fn loose_parsing_accepts_aliases() {
        assert_eq!(Outcome::from_str_loose("PASSED"), Some(Outcome::Pass));
        assert_eq!(Outcome::from_str_loose(" skip "), Some(Outcome::Skipped));
        assert_eq!(Outcome::from_str_loose("flaky"), None);
        for outcome in Outcome::ALL {
            assert_eq!(Outcome::from_str_loose(outcome.label()), Some(outcome));
        }
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(Outcome::default(), Outcome::Empty);
        assert!(!Outcome::Empty.is_failure());
        assert!(Outcome::Unexpected.is_failure());
    }
}
