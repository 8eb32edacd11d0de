//! Run-scoped execution state.

use crate::assertion::AnomalyTracker;
use crate::pallet::Theme;
use crate::reporter::Reporter;
use crate::structured_log::{LogEmitter, LogEntry};

/// Everything a running case may touch besides its own suite: theme, assertion
/// counter, anomaly tracker, reporter and the optional run log.
///
/// Owned by the engine and passed by reference into each case body through a
/// [`Probe`](crate::Probe).
pub struct ExecutionContext {
    theme: Theme,
    assertions: u64,
    anomalies: AnomalyTracker,
    reporter: Box<dyn Reporter>,
    log: Option<LogEmitter>,
    log_error: Option<std::io::Error>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(theme: Theme, reporter: Box<dyn Reporter>) -> Self {
        Self {
            theme,
            assertions: 0,
            anomalies: AnomalyTracker::default(),
            reporter,
            log: None,
            log_error: None,
        }
    }

    pub fn set_log(&mut self, emitter: LogEmitter) {
        self.log = Some(emitter);
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn report(&mut self, text: &str) {
        self.reporter.emit(self.theme, text);
    }

    /// Write a log entry if logging is enabled.
    ///
    /// Write errors are held until [`Self::check_log`] so a case body never has to
    /// deal with them.
    pub fn log(&mut self, entry: LogEntry) {
        let Some(emitter) = self.log.as_mut() else {
            return;
        };
        if let Err(err) = emitter.emit_entry(entry)
            && self.log_error.is_none()
        {
            self.log_error = Some(err);
        }
    }

    /// Surface the first deferred log write error, if any.
    pub fn check_log(&mut self) -> std::io::Result<()> {
        match self.log_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn flush_log(&mut self) -> std::io::Result<()> {
        self.check_log()?;
        match self.log.as_mut() {
            Some(emitter) => emitter.flush(),
            None => Ok(()),
        }
    }

    pub fn count_assertion(&mut self) {
        self.assertions += 1;
    }

    #[must_use]
    pub fn assertion_count(&self) -> u64 {
        self.assertions
    }

    pub fn reset_assertions(&mut self) {
        self.assertions = 0;
    }

    #[must_use]
    pub fn anomalies(&self) -> &AnomalyTracker {
        &self.anomalies
    }

    pub(crate) fn anomalies_mut(&mut self) -> &mut AnomalyTracker {
        &mut self.anomalies
    }
}
