//! Terminal reporter: markup tags become ANSI escapes or disappear.

use std::io::{IsTerminal, Write};

use frankentest_core::markup;
use frankentest_core::{Reporter, Theme};

/// When to emit ANSI color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Parse from string (case-insensitive). Unknown values select `Auto`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "on" | "yes" => Self::Always,
            "never" | "off" | "no" => Self::Never,
            _ => Self::Auto,
        }
    }

    /// Resolve against the environment of the current process.
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

/// Writes each report as one block of lines.
///
/// A write error (a closed pipe, typically) silences the reporter for the rest of the
/// run and is reported by [`Self::failed`].
pub struct ConsoleReporter {
    writer: Box<dyn Write>,
    color: bool,
    failed: bool,
}

impl ConsoleReporter {
    #[must_use]
    pub fn stdout(choice: ColorChoice) -> Self {
        Self::to_writer(std::io::stdout(), choice.enabled())
    }

    #[must_use]
    pub fn to_writer(writer: impl Write + 'static, color: bool) -> Self {
        Self {
            writer: Box::new(writer),
            color,
            failed: false,
        }
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&mut self, _theme: Theme, text: &str) {
        if self.failed {
            return;
        }
        let rendered = markup::render(text, self.color);
        if writeln!(self.writer, "{rendered}")
            .and_then(|()| self.writer.flush())
            .is_err()
        {
            self.failed = true;
        }
    }
}
