//! Formatted-output seam.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::markup;
use crate::pallet::Theme;

/// Receives markup-tagged text (`{red}`, `{blue,bold}`, `{reset}`) for one theme.
///
/// Called once per reported case, once per suite summary, once per run summary, and
/// for every assertion failure and narration line.
pub trait Reporter {
    fn emit(&mut self, theme: Theme, text: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn emit(&mut self, _theme: Theme, _text: &str) {}
}

/// Keeps every emitted line in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    entries: Arc<Mutex<Vec<(Theme, String)>>>,
}

impl MemoryReporter {
    #[must_use]
    pub fn entries(&self) -> Vec<(Theme, String)> {
        self.entries.lock().clone()
    }

    /// Raw text including markup.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    /// Text with markup tags removed.
    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(_, t)| markup::strip(t))
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Reporter for MemoryReporter {
    fn emit(&mut self, theme: Theme, text: &str) {
        self.entries.lock().push((theme, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let sink = MemoryReporter::default();
        let mut writer = sink.clone();
        writer.emit(Theme::Unity, "{green}ok{reset}");
        assert_eq!(sink.lines(), vec!["{green}ok{reset}".to_string()]);
        assert_eq!(sink.plain_lines(), vec!["ok".to_string()]);
        sink.clear();
        assert!(sink.entries().is_empty());
    }
}
