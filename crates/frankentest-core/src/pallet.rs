//! Run configuration.
//!
//! The pallet is a read-only struct: the engine never parses flags or files itself.
//! Enumerated settings (`theme`, `show.mode`, `show.verbose`) parse loosely; unknown
//! values fall back to the default. Sort and shuffle keys stay raw strings so the
//! pipeline can report a mismatch instead of rejecting the whole configuration.

use std::time::Duration;

use frankentest_ledger::{LedgerIdentity, StampClock};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::outcome::Outcome;

/// Ceiling applied when neither the build nor the pallet overrides it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Upper bound for `run.repeat`.
pub const MAX_REPEAT: u32 = 100;

/// Timeout ceiling baked in at compile time via `FRANKENTEST_TIMEOUT_SECS`.
#[must_use]
pub fn build_timeout_secs() -> u64 {
    option_env!("FRANKENTEST_TIMEOUT_SECS")
        .and_then(|raw| raw.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

// ---------------------------------------------------------------------------
// Presentation selectors
// ---------------------------------------------------------------------------

/// Output vocabulary for case lines, assertion reports and summaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Fossil,
    Catch,
    Doctest,
    Cpputest,
    Tap,
    Googletest,
    Unity,
}

impl Theme {
    pub const ALL: [Theme; 7] = [
        Theme::Fossil,
        Theme::Catch,
        Theme::Doctest,
        Theme::Cpputest,
        Theme::Tap,
        Theme::Googletest,
        Theme::Unity,
    ];

    /// Parse from string (case-insensitive). Unknown names select `Fossil`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "catch" | "catch2" => Self::Catch,
            "doctest" => Self::Doctest,
            "cpputest" => Self::Cpputest,
            "tap" => Self::Tap,
            "googletest" | "gtest" | "google" => Self::Googletest,
            "unity" => Self::Unity,
            _ => Self::Fossil,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fossil => "fossil",
            Self::Catch => "catch",
            Self::Doctest => "doctest",
            Self::Cpputest => "cpputest",
            Self::Tap => "tap",
            Self::Googletest => "googletest",
            Self::Unity => "unity",
        }
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Self::from_str_loose(&s)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.name().to_string()
    }
}

/// Layout of reported case lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisplayMode {
    #[default]
    List,
    Tree,
    Graph,
}

impl DisplayMode {
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "graph" | "dag" => Self::Graph,
            _ => Self::List,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Tree => "tree",
            Self::Graph => "graph",
        }
    }
}

impl From<String> for DisplayMode {
    fn from(s: String) -> Self {
        Self::from_str_loose(&s)
    }
}

impl From<DisplayMode> for String {
    fn from(mode: DisplayMode) -> Self {
        mode.name().to_string()
    }
}

/// Wording of reported case lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verbosity {
    #[default]
    Plain,
    /// Machine-friendly `::FIELD::` markers, no color.
    Ci,
    /// Every field annotated with what it is.
    Doge,
}

impl Verbosity {
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "ci" | "machine" => Self::Ci,
            "doge" | "verbose" => Self::Doge,
            _ => Self::Plain,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ci => "ci",
            Self::Doge => "doge",
        }
    }
}

impl From<String> for Verbosity {
    fn from(s: String) -> Self {
        Self::from_str_loose(&s)
    }
}

impl From<Verbosity> for String {
    fn from(v: Verbosity) -> Self {
        v.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Pallet sections
// ---------------------------------------------------------------------------

/// Case selection. Absent filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Exact case name.
    pub name: Option<String>,
    /// Exact suite name.
    pub suite: Option<String>,
    /// Substring of the case's tag string.
    pub tag: Option<String>,
}

/// Pre-run ordering: `by` is `name`, `result` or `time`; `order` is `asc` or `desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    pub by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleSpec {
    pub enabled: bool,
    /// Explicit seed; wall-clock nanoseconds when absent.
    pub seed: Option<u64>,
    /// Key for an ascending sort applied after the shuffle.
    pub by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSpec {
    /// Run only the case with this name.
    pub only: Option<String>,
    /// Mark the case with this name `Skipped` without running it.
    pub skip: Option<String>,
    /// Iterations per case, 1..=100. The last iteration's outcome is kept.
    pub repeat: u32,
    /// Abort the whole remaining run on the first `Fail`.
    pub fail_fast: bool,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            only: None,
            skip: None,
            repeat: 1,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowSpec {
    pub mode: DisplayMode,
    pub verbose: Verbosity,
    /// Only report cases whose outcome label matches. Filtered cases still run.
    pub result: Option<String>,
}

/// Parsed run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pallet {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub shuffle: ShuffleSpec,
    pub run: RunSpec,
    pub theme: Theme,
    pub show: ShowSpec,
    /// Overrides the build-time timeout ceiling.
    pub timeout_secs: Option<u64>,
    pub author: Option<String>,
    pub origin: Option<String>,
    /// Pin ledger timestamps for reproducible chains.
    pub fixed_timestamp: Option<i64>,
    /// Log run id; derived from the start timestamp when absent.
    pub run_id: Option<String>,
}

impl Pallet {
    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=MAX_REPEAT).contains(&self.run.repeat) {
            return Err(EngineError::InvalidConfig(format!(
                "run.repeat must be within 1..={MAX_REPEAT}, got {}",
                self.run.repeat
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(EngineError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or_else(build_timeout_secs))
    }

    #[must_use]
    pub fn identity(&self) -> LedgerIdentity {
        let defaults = LedgerIdentity::default();
        LedgerIdentity::new(
            self.author.clone().unwrap_or(defaults.author),
            self.origin.clone().unwrap_or(defaults.origin_device_id),
        )
    }

    #[must_use]
    pub fn clock(&self) -> StampClock {
        self.fixed_timestamp
            .map_or(StampClock::Wall, StampClock::Fixed)
    }

    /// Parsed `show.result`; `None` when unset or unrecognized.
    #[must_use]
    pub fn show_result(&self) -> Option<Outcome> {
        self.show.result.as_deref().and_then(Outcome::from_str_loose)
    }
}
