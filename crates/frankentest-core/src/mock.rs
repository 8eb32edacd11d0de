//! Call recording for code under test.
//!
//! Not a mock framework: a [`CallRecorder`] only remembers `function(args…)` calls so a
//! case body can check what happened. Clones share the same log, so a recorder can be
//! moved into a stub and into the case body at once.

use std::fmt::{self, Display};
use std::sync::Arc;

use parking_lot::Mutex;

/// One recorded call with its arguments rendered through `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub function: String,
    pub args: Vec<String>,
}

impl Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.args.join(", "))
    }
}

fn render_args(args: &[&dyn Display]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, function: &str, args: &[&dyn Display]) {
        self.calls.lock().push(RecordedCall {
            function: function.to_string(),
            args: render_args(args),
        });
    }

    /// Every call in the order it was recorded.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self, function: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.function == function)
            .count()
    }

    /// True when some call matches `function` and renders to the same arguments.
    #[must_use]
    pub fn was_called_with(&self, function: &str, args: &[&dyn Display]) -> bool {
        let expected = render_args(args);
        self.calls
            .lock()
            .iter()
            .any(|c| c.function == function && c.args == expected)
    }

    /// Compare the full call log against `expected`, given as rendered calls such as
    /// `"add(2, 3)"`. The error names the first mismatch.
    pub fn verify_sequence(&self, expected: &[&str]) -> Result<(), String> {
        let calls = self.calls.lock();
        for (i, want) in expected.iter().enumerate() {
            match calls.get(i) {
                Some(call) if call.to_string() == *want => {}
                Some(call) => return Err(format!("call {i}: expected {want}, got {call}")),
                None => return Err(format!("call {i}: expected {want}, got nothing")),
            }
        }
        if calls.len() > expected.len() {
            return Err(format!(
                "{} unexpected trailing call(s), first: {}",
                calls.len() - expected.len(),
                calls[expected.len()]
            ));
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let recorder = CallRecorder::new();
        let stub = recorder.clone();
        stub.record("add", &[&2, &3]);
        stub.record("log", &[&"done"]);
        assert_eq!(recorder.call_count("add"), 1);
        assert!(recorder.was_called_with("add", &[&2, &3]));
        assert!(!recorder.was_called_with("add", &[&3, &2]));
        assert_eq!(recorder.calls()[1].to_string(), "log(done)");
    }

    #[test]
    fn verify_sequence_reports_first_mismatch() {
        let recorder = CallRecorder::new();
        recorder.record("open", &[&"a.txt"]);
        recorder.record("close", &[]);
        assert!(recorder.verify_sequence(&["open(a.txt)", "close()"]).is_ok());
        let err = recorder.verify_sequence(&["open(b.txt)"]).unwrap_err();
        assert!(err.contains("expected open(b.txt), got open(a.txt)"), "{err}");
        let err = recorder.verify_sequence(&["open(a.txt)"]).unwrap_err();
        assert!(err.contains("trailing"), "{err}");
        recorder.clear();
        assert!(recorder.calls().is_empty());
    }
}
