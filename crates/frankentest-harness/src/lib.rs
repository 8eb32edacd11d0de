//! Runner tooling for frankentest.
//!
//! This crate provides:
//! - [`config`]: pallet loading from JSON plus command-line overrides
//! - [`console`]: a terminal [`Reporter`](frankentest_core::Reporter) with ANSI markup
//! - [`audit`]: ledger export and offline chain verification
//! - [`demo`]: the built-in suites the `frankentest run` subcommand executes

#![forbid(unsafe_code)]

pub mod audit;
pub mod config;
pub mod console;
pub mod demo;

pub use audit::{AuditReport, LedgerExport, audit_export, audit_file};
pub use config::{ConfigError, PalletOverrides, load_pallet, parse_seed, resolve_pallet};
pub use console::{ColorChoice, ConsoleReporter};
pub use demo::DemoSet;
