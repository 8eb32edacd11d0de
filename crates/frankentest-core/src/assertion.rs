//! Assertion probe and failure propagation.
//!
//! A case body receives a [`Probe`] and returns [`AssertResult`]. The first failed
//! check produces an [`AssertFailure`] that the body hands back with `?`, which ends the
//! body at that point. The per-case guard in the engine is simply the call site of the
//! body, so nothing can escape past it and teardown still runs from the case loop.
//!
//! Repeated identical failures are tracked with a fingerprint of the call site and
//! message; see [`AnomalyTracker`].

use std::fmt;
use std::panic::Location;

use frankentest_ledger::{Digest32, fingerprint};
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::render::{self, Narration};
use crate::structured_log::{LogEntry, LogLevel};

/// Where an assertion was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: String,
}

impl CallSite {
    #[must_use]
    pub fn new(file: &'static str, line: u32, function: impl Into<String>) -> Self {
        Self {
            file,
            line,
            function: function.into(),
        }
    }

    /// Capture the caller's file and line.
    #[track_caller]
    #[must_use]
    pub fn caller(function: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), function)
    }

    /// `file:line:function`, the fingerprinted identity of the site.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.function)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}", self.file, self.line, self.function)
    }
}

/// A failed check. Returned by the probe and propagated out of the case body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("assertion failed: {message} ({site})")]
pub struct AssertFailure {
    pub message: String,
    pub site: CallSite,
    /// How many immediately preceding failures had the same fingerprint.
    pub anomaly_count: u32,
}

pub type AssertResult = Result<(), AssertFailure>;

/// Counts consecutive identical assertion failures.
///
/// A failure with the same fingerprint as the previous one increments the count; any
/// other failure resets it to zero and becomes the new reference.
#[derive(Debug, Clone, Default)]
pub struct AnomalyTracker {
    last: Option<Digest32>,
    count: u32,
}

impl AnomalyTracker {
    /// Record a failure and return its anomaly count.
    pub fn observe(&mut self, site: &CallSite, message: &str) -> u32 {
        let print = fingerprint(&site.key(), message);
        if self.last == Some(print) {
            self.count = self.count.saturating_add(1);
        } else {
            self.last = Some(print);
            self.count = 0;
        }
        self.count
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Handle a case body asserts through.
pub struct Probe<'a> {
    ctx: &'a mut ExecutionContext,
    suite_name: &'a str,
    case_name: &'a str,
}

impl<'a> Probe<'a> {
    #[must_use]
    pub fn new(ctx: &'a mut ExecutionContext, suite_name: &'a str, case_name: &'a str) -> Self {
        Self {
            ctx,
            suite_name,
            case_name,
        }
    }

    /// Check `condition` at the caller's file and line. The site's function is the case
    /// name; the macros record the enclosing function instead.
    #[track_caller]
    pub fn check(&mut self, condition: bool, message: &str) -> AssertResult {
        let site = CallSite::caller(self.case_name);
        self.assert_at(condition, message, site)
    }

    /// Check `condition` attributed to an explicit call site. Used by the macros.
    pub fn assert_at(&mut self, condition: bool, message: &str, site: CallSite) -> AssertResult {
        self.ctx.count_assertion();
        if condition {
            return Ok(());
        }
        let anomaly_count = self.ctx.anomalies_mut().observe(&site, message);
        let failure = AssertFailure {
            message: message.to_string(),
            site,
            anomaly_count,
        };
        let text = render::assertion_failure(self.ctx.theme(), &failure);
        self.ctx.report(&text);
        self.ctx.log(
            LogEntry::untraced(LogLevel::Error, "assertion_failure")
                .with_suite(self.suite_name)
                .with_case(self.case_name)
                .with_anomaly_count(anomaly_count)
                .with_message(failure.to_string()),
        );
        Err(failure)
    }

    pub fn given(&mut self, description: &str) {
        self.narrate(Narration::Given, description);
    }

    pub fn when(&mut self, description: &str) {
        self.narrate(Narration::When, description);
    }

    pub fn then(&mut self, description: &str) {
        self.narrate(Narration::Then, description);
    }

    pub fn on_skip(&mut self, description: &str) {
        self.narrate(Narration::OnSkip, description);
    }

    fn narrate(&mut self, kind: Narration, description: &str) {
        let text = render::narration(self.ctx.theme(), kind, description);
        self.ctx.report(&text);
    }

    /// Checks evaluated so far in the current case.
    #[must_use]
    pub fn assertion_count(&self) -> u64 {
        self.ctx.assertion_count()
    }

    #[must_use]
    pub fn case_name(&self) -> &str {
        self.case_name
    }

    #[must_use]
    pub fn suite_name(&self) -> &str {
        self.suite_name
    }
}

/// Name of the function the macro is expanded in, with closure frames dropped.
#[doc(hidden)]
#[must_use]
pub fn enclosing_function(type_name: &'static str) -> &'static str {
    let path = type_name.strip_suffix("::here").unwrap_or(type_name);
    let path = path.trim_end_matches("::{{closure}}");
    path.rsplit("::").next().unwrap_or(path)
}

/// Call site of the macro invocation: file, line and enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __call_site {
    () => {{
        fn here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::CallSite::new(
            file!(),
            line!(),
            $crate::assertion::enclosing_function(type_name_of(here)),
        )
    }};
}

/// Check a condition inside a case body, returning early on failure.
///
/// ```ignore
/// TestCase::new("adds").with_body(|p| {
///     check!(p, 2 + 2 == 4);
///     check!(p, v.is_empty(), "expected empty, got {v:?}");
///     Ok(())
/// })
/// ```
#[macro_export]
macro_rules! check {
    ($probe:expr, $cond:expr $(,)?) => {
        $probe.assert_at($cond, stringify!($cond), $crate::__call_site!())?
    };
    ($probe:expr, $cond:expr, $($arg:tt)+) => {
        $probe.assert_at($cond, &format!($($arg)+), $crate::__call_site!())?
    };
}

/// Check two values for equality inside a case body, returning early on failure.
#[macro_export]
macro_rules! check_eq {
    ($probe:expr, $left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                let equal = *left == *right;
                let message = if equal {
                    String::new()
                } else {
                    format!(
                        "{} == {} (left: {:?}, right: {:?})",
                        stringify!($left),
                        stringify!($right),
                        left,
                        right
                    )
                };
                $probe.assert_at(equal, &message, $crate::__call_site!())?
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __check_cmp {
    ($probe:expr, $actual:expr, $expected:expr, $op:tt, $phrase:literal) => {
        match (&$actual, &$expected) {
            (actual, expected) => {
                let holds = *actual $op *expected;
                let message = if holds {
                    String::new()
                } else {
                    format!(
                        concat!("Expected {} ({:?}) to ", $phrase, " {} ({:?})"),
                        stringify!($actual),
                        actual,
                        stringify!($expected),
                        expected
                    )
                };
                $probe.assert_at(holds, &message, $crate::__call_site!())?
            }
        }
    };
}

/// `actual != expected`.
#[macro_export]
macro_rules! check_ne {
    ($probe:expr, $actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!($probe, $actual, $expected, !=, "not be equal to")
    };
}

/// `actual < expected`.
#[macro_export]
macro_rules! check_lt {
    ($probe:expr, $actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!($probe, $actual, $expected, <, "be less than")
    };
}

/// `actual <= expected`.
#[macro_export]
macro_rules! check_le {
    ($probe:expr, $actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!($probe, $actual, $expected, <=, "be less than or equal to")
    };
}

/// `actual > expected`.
#[macro_export]
macro_rules! check_gt {
    ($probe:expr, $actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!($probe, $actual, $expected, >, "be more than")
    };
}

/// `actual >= expected`.
#[macro_export]
macro_rules! check_ge {
    ($probe:expr, $actual:expr, $expected:expr $(,)?) => {
        $crate::__check_cmp!($probe, $actual, $expected, >=, "be more than or equal to")
    };
}

/// `|actual - expected| <= tol`, compared as `f64`. NaN on either side fails.
#[macro_export]
macro_rules! check_near {
    ($probe:expr, $actual:expr, $expected:expr, $tol:expr $(,)?) => {
        match (f64::from($actual), f64::from($expected), f64::from($tol)) {
            (actual, expected, tol) => {
                let within = (actual - expected).abs() <= tol;
                let message = if within {
                    String::new()
                } else {
                    format!(
                        "Expected {} ({:?}) to be equal to {} ({:?}) within tolerance {} ({:?})",
                        stringify!($actual),
                        actual,
                        stringify!($expected),
                        expected,
                        stringify!($tol),
                        tol
                    )
                };
                $probe.assert_at(within, &message, $crate::__call_site!())?
            }
        }
    };
}

/// `|actual - expected| > tol`, compared as `f64`. NaN on either side fails.
#[macro_export]
macro_rules! check_not_near {
    ($probe:expr, $actual:expr, $expected:expr, $tol:expr $(,)?) => {
        match (f64::from($actual), f64::from($expected), f64::from($tol)) {
            (actual, expected, tol) => {
                let apart = (actual - expected).abs() > tol;
                let message = if apart {
                    String::new()
                } else {
                    format!(
                        "Expected {} ({:?}) to not be equal to {} ({:?}) within tolerance {} ({:?})",
                        stringify!($actual),
                        actual,
                        stringify!($expected),
                        expected,
                        stringify!($tol),
                        tol
                    )
                };
                $probe.assert_at(apart, &message, $crate::__call_site!())?
            }
        }
    };
}
