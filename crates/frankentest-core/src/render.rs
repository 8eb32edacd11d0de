//! Themed text for the reporter.
//!
//! Every function returns markup-tagged text; the sink decides whether tags become
//! ANSI colors or disappear.

use std::fmt::Write as _;

use crate::assertion::AssertFailure;
use crate::case::TestCase;
use crate::pallet::{DisplayMode, Theme, Verbosity};
use crate::suite::TestSuite;
use crate::summary::{RunSummary, format_ns};

/// BDD narration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narration {
    Given,
    When,
    Then,
    OnSkip,
}

impl Narration {
    const fn word(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::OnSkip => "On Skip",
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Given => "GIVEN",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::OnSkip => "SKIP",
        }
    }
}

#[must_use]
pub fn narration(theme: Theme, kind: Narration, description: &str) -> String {
    let word = kind.word();
    match theme {
        Theme::Fossil => {
            let color = if kind == Narration::OnSkip { "yellow" } else { "blue" };
            format!("{{{color}}}{word} {description}{{reset}}")
        }
        Theme::Cpputest => format!("[{}] {description}", kind.tag()),
        Theme::Tap => format!("# {word}: {description}"),
        Theme::Googletest if kind == Narration::OnSkip => format!("[ SKIPPED ] {description}"),
        Theme::Googletest => format!("[----------] {word}: {description}"),
        Theme::Unity => format!("Unity {word}: {description}"),
        Theme::Catch | Theme::Doctest => format!("{word}: {description}"),
    }
}

#[must_use]
pub fn assertion_failure(theme: Theme, failure: &AssertFailure) -> String {
    let AssertFailure {
        message,
        site,
        anomaly_count,
    } = failure;
    let at = format!("{}:{} in {}", site.file, site.line, site.function);
    let (head, dup) = match theme {
        Theme::Fossil => (
            format!("{{red,bold}}Assertion failed:{{reset}} {{yellow}}{message}{{reset}} {{blue}}({at}){{reset}}"),
            format!("{{yellow}}Duplicate or similar assertion detected [Anomaly Count: {anomaly_count}]{{reset}}"),
        ),
        Theme::Catch | Theme::Doctest => (
            format!("Assertion failed: {message} ({at})"),
            format!("Duplicate or similar assertion detected [Anomaly Count: {anomaly_count}]"),
        ),
        Theme::Cpputest => (
            format!("[ASSERTION FAILED] {message} ({at})"),
            format!("[DUPLICATE ASSERTION] Anomaly Count: {anomaly_count}"),
        ),
        Theme::Tap => (
            format!("not ok - Assertion failed: {message} ({at})"),
            format!("# Duplicate or similar assertion detected [Anomaly Count: {anomaly_count}]"),
        ),
        Theme::Googletest => (
            format!("[  FAILED  ] Assertion failed: {message} ({at})"),
            format!("[  WARNING ] Duplicate or similar assertion detected [Anomaly Count: {anomaly_count}]"),
        ),
        Theme::Unity => (
            format!("Unity Assertion Failed: {message} ({at})"),
            format!("Unity Duplicate Assertion Detected [Anomaly Count: {anomaly_count}]"),
        ),
    };
    if *anomaly_count > 0 {
        format!("{head}\n{dup}")
    } else {
        head
    }
}

// ---------------------------------------------------------------------------
// Case lines
// ---------------------------------------------------------------------------

/// Leading marker of a case line for a theme and layout.
fn case_marker(theme: Theme, mode: DisplayMode) -> &'static str {
    match (theme, mode) {
        (Theme::Fossil, DisplayMode::List) => " {blue}-{reset}",
        (Theme::Fossil, DisplayMode::Tree) => "  {blue}├─{reset}",
        (Theme::Fossil, DisplayMode::Graph) => "{blue}[CASE]{reset}",
        (Theme::Catch | Theme::Doctest | Theme::Cpputest, DisplayMode::Tree) => {
            "  {magenta}[CASE]{reset}"
        }
        (Theme::Catch | Theme::Doctest | Theme::Cpputest, _) => "{magenta}[CASE]{reset}",
        (Theme::Tap, DisplayMode::List) => "# {blue}-{reset}",
        (Theme::Tap, DisplayMode::Tree) => "  {yellow}# ├─{reset}",
        (Theme::Tap, DisplayMode::Graph) => "{yellow}# [CASE]{reset}",
        (Theme::Googletest, DisplayMode::Tree) => "  {blue}[----------]{reset}",
        (Theme::Googletest, _) => "{blue}[  CASE   ]{reset}",
        (Theme::Unity, DisplayMode::Tree) => "  {green}Unity Case:{reset}",
        (Theme::Unity, _) => "{green}Unity Case:{reset}",
    }
}

/// Marker used by the `ci` verbosity.
fn ci_marker(theme: Theme) -> &'static str {
    match theme {
        Theme::Tap => "# ::CASE::",
        Theme::Googletest => "[  CASE   ] ::CASE::",
        Theme::Unity => "::UNITY_CASE::",
        _ => "::CASE::",
    }
}

struct Fields<'a> {
    name: &'a str,
    tags: &'a str,
    criteria: &'a str,
    time: String,
    result: &'static str,
    result_color: &'static str,
}

impl<'a> Fields<'a> {
    fn of(case: &'a TestCase) -> Self {
        Self {
            name: case.name(),
            tags: case.tags(),
            criteria: case.criteria(),
            time: format_ns(case.elapsed_ns()),
            result: case.outcome().label(),
            result_color: case.outcome().color(),
        }
    }

    /// `(label, value, value color, doge annotation)` in display order.
    fn rows(&self) -> [(&'static str, &str, &'static str, &'static str); 4] {
        [
            ("Tags", self.tags, "white", "[with tag]"),
            ("Criteria", self.criteria, "white", "[given criteria]"),
            ("Time", self.time.as_str(), "white", "[the time]"),
            ("Result", self.result, self.result_color, "[the result]"),
        ]
    }
}

/// One reported case, laid out per theme, display mode and verbosity.
#[must_use]
pub fn case_line(theme: Theme, mode: DisplayMode, verbosity: Verbosity, case: &TestCase) -> String {
    let fields = Fields::of(case);
    match verbosity {
        Verbosity::Ci => ci_case_line(theme, mode, &fields),
        Verbosity::Plain | Verbosity::Doge => {
            styled_case_line(theme, mode, verbosity == Verbosity::Doge, &fields)
        }
    }
}

fn ci_case_line(theme: Theme, mode: DisplayMode, f: &Fields<'_>) -> String {
    let marker = ci_marker(theme);
    match mode {
        DisplayMode::List => format!(
            "{marker} {} ( ::TAGS:: {}, ::CRITERIA:: {}, ::TIME:: {}, ::RESULT:: {} )",
            f.name, f.tags, f.criteria, f.time, f.result
        ),
        DisplayMode::Graph => format!(
            "{marker} {} --[::TAGS:: {}, ::CRITERIA:: {}, ::TIME:: {}, ::RESULT:: {}]",
            f.name, f.tags, f.criteria, f.time, f.result
        ),
        DisplayMode::Tree => {
            let mut out = format!("  {marker} {}", f.name);
            for (label, value, _, _) in f.rows() {
                let _ = write!(out, "\n    ::{}:: {value}", label.to_ascii_uppercase());
            }
            out
        }
    }
}

fn styled_case_line(theme: Theme, mode: DisplayMode, doge: bool, f: &Fields<'_>) -> String {
    let marker = case_marker(theme, mode);
    let note = |text: &str| {
        if doge {
            format!(" {{yellow}}{text}{{reset}}")
        } else {
            String::new()
        }
    };
    let head = format!("{marker} {{cyan}}{}{{reset}}{}", f.name, note("[test case]"));
    match mode {
        DisplayMode::List => {
            let body: Vec<String> = f
                .rows()
                .iter()
                .map(|(label, value, color, ann)| {
                    format!("{{yellow}}{label}:{{reset}} {{{color}}}{value}{{reset}}{}", note(ann))
                })
                .collect();
            format!("{head} ({})", body.join(", "))
        }
        DisplayMode::Graph => {
            let body: Vec<String> = f
                .rows()
                .iter()
                .map(|(label, value, color, ann)| {
                    format!(
                        "{{yellow}}{}:{{reset}}{{{color}}}{value}{{reset}}{}",
                        label.to_ascii_lowercase(),
                        note(ann)
                    )
                })
                .collect();
            format!("{head} --[{}]", body.join(","))
        }
        DisplayMode::Tree => {
            let rows = f.rows();
            let mut out = head;
            for (i, (label, value, color, ann)) in rows.iter().enumerate() {
                let branch = match theme {
                    Theme::Fossil | Theme::Tap if i + 1 == rows.len() => "{blue}│   └─{reset}",
                    Theme::Fossil | Theme::Tap => "{blue}│   ├─{reset}",
                    _ => "  ",
                };
                let _ = write!(
                    out,
                    "\n  {branch} {{yellow}}{label:<8}{{reset}}: {{{color}}}{value}{{reset}}{}",
                    note(ann)
                );
            }
            out
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[must_use]
pub fn suite_summary(theme: Theme, suite: &TestSuite) -> String {
    let s = suite.score();
    let time = format_ns(suite.elapsed_ns());
    let counts = format!(
        "passed {}, failed {}, skipped {}, timeout {}, unexpected {}, empty {}",
        s.passed, s.failed, s.skipped, s.timeout, s.unexpected, s.empty
    );
    match theme {
        Theme::Fossil => format!(
            "{{blue,bold}}Suite{{reset}} {{cyan}}{}{{reset}}: {counts} {{blue}}[{time}]{{reset}}",
            suite.name()
        ),
        Theme::Catch | Theme::Doctest => {
            format!("{{magenta}}Suite:{{reset}} {} ({counts}) in {time}", suite.name())
        }
        Theme::Cpputest => format!("[SUITE] {} ({counts}) {time}", suite.name()),
        Theme::Tap => format!(
            "# Suite {}: {counts}\n1..{}",
            suite.name(),
            suite.total_possible()
        ),
        Theme::Googletest => format!(
            "[----------] {} tests from {} ({time})",
            suite.total_possible(),
            suite.name()
        ),
        Theme::Unity => format!("Unity Suite {}: {counts}", suite.name()),
    }
}

#[must_use]
pub fn run_summary(theme: Theme, summary: &RunSummary) -> String {
    let s = &summary.score;
    let rows: [(&str, String); 10] = [
        ("Suites run", summary.suites_run.to_string()),
        ("Tests run", summary.score_possible.to_string()),
        (
            "Score",
            format!("{}/{}", summary.score_total, summary.score_possible),
        ),
        ("Passed", s.passed.to_string()),
        ("Failed", s.failed.to_string()),
        ("Skipped", s.skipped.to_string()),
        ("Timeouts", s.timeout.to_string()),
        ("Unexpected", s.unexpected.to_string()),
        ("Empty", s.empty.to_string()),
        ("Success Rate", format!("{:.2}%", summary.success_rate())),
    ];
    let mut out = match theme {
        Theme::Fossil => "{blue,bold}=========================================================================\nFrankentest Summary\n========================================================================={reset}".to_string(),
        Theme::Catch | Theme::Doctest => "{magenta}Test run summary{reset}".to_string(),
        Theme::Cpputest => "{cyan}[TEST SUMMARY]{reset}".to_string(),
        Theme::Tap => "# Summary".to_string(),
        Theme::Googletest => "[==========] Summary".to_string(),
        Theme::Unity => "Unity Test Summary".to_string(),
    };
    for (label, value) in &rows {
        let line = match theme {
            Theme::Fossil => format!("{{blue}}{label:<12}:{{cyan}} {value}{{reset}}"),
            Theme::Catch | Theme::Doctest => format!("{{magenta}}{label:<13}:{{reset}} {value}"),
            Theme::Cpputest => format!(
                "{{blue}}[{:<13}]{{reset}} {value}",
                label.to_ascii_uppercase()
            ),
            Theme::Tap => format!("# {label}: {value}"),
            Theme::Googletest => format!("[ {label:<10} ] {value}"),
            Theme::Unity => format!("{label}: {value}"),
        };
        out.push('\n');
        out.push_str(&line);
    }
    let _ = write!(out, "\nElapsed: {}", summary.elapsed_clock());
    if summary.aborted {
        out.push_str("\n{red,bold}Run aborted by fail-fast.{reset}");
    }
    let _ = write!(out, "\n{{bold}}{{blue}}Feedback:{{reset}} {}", summary.feedback());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::CallSite;
    use crate::markup::strip;
    use crate::outcome::Outcome;

    fn sample() -> TestCase {
        let mut case = TestCase::new("adds")
            .with_tags("math")
            .with_criteria("sum");
        case.outcome = Outcome::Pass;
        case.elapsed_ns = 1_500;
        case
    }

    #[test]
    fn list_plain_fossil() {
        let text = strip(&case_line(
            Theme::Fossil,
            DisplayMode::List,
            Verbosity::Plain,
            &sample(),
        ));
        assert_eq!(
            text,
            " - adds (Tags: math, Criteria: sum, Time: 0 s 1 us 500 ns, Result: pass)"
        );
    }

    #[test]
    fn ci_has_no_markup() {
        for theme in Theme::ALL {
            for mode in [DisplayMode::List, DisplayMode::Tree, DisplayMode::Graph] {
                let text = case_line(theme, mode, Verbosity::Ci, &sample());
                assert_eq!(text, strip(&text));
                assert!(text.contains("::RESULT:: pass"), "{theme:?} {mode:?}: {text}");
            }
        }
    }

    #[test]
    fn doge_annotates_fields() {
        let text = strip(&case_line(
            Theme::Cpputest,
            DisplayMode::Graph,
            Verbosity::Doge,
            &sample(),
        ));
        assert!(text.starts_with("[CASE] adds [test case] --["));
        assert!(text.contains("result:pass [the result]"));
    }

    #[test]
    fn tree_spans_multiple_lines() {
        let text = strip(&case_line(
            Theme::Fossil,
            DisplayMode::Tree,
            Verbosity::Plain,
            &sample(),
        ));
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().last().unwrap().contains("└─"));
    }

    #[test]
    fn assertion_failure_mentions_anomaly_only_when_repeated() {
        let mut failure = AssertFailure {
            message: "2+2 == 5".to_string(),
            site: CallSite::new("math.rs", 7, "adds"),
            anomaly_count: 0,
        };
        let first = strip(&assertion_failure(Theme::Googletest, &failure));
        assert_eq!(
            first,
            "[  FAILED  ] Assertion failed: 2+2 == 5 (math.rs:7 in adds)"
        );
        failure.anomaly_count = 2;
        let again = assertion_failure(Theme::Tap, &failure);
        assert!(again.ends_with("[Anomaly Count: 2]"));
    }

    #[test]
    fn narration_per_theme() {
        assert_eq!(
            narration(Theme::Cpputest, Narration::When, "x"),
            "[WHEN] x"
        );
        assert_eq!(
            narration(Theme::Googletest, Narration::OnSkip, "db down"),
            "[ SKIPPED ] db down"
        );
        assert_eq!(
            strip(&narration(Theme::Fossil, Narration::Given, "y")),
            "Given y"
        );
    }
}
