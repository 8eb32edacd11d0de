//! frankentest core: suite/case registry, run engine and assertion probe.
//!
//! This crate provides:
//! - [`Engine`]: registry of suites plus the filter → sort → shuffle → run pipeline
//! - [`TestSuite`] / [`TestCase`]: registration-time builders, ledger-stamped on insert
//! - [`Probe`]: the handle a case body asserts through; failures propagate as
//!   [`AssertFailure`] values instead of unwinding
//! - [`Pallet`]: the parsed run configuration the engine reads
//! - [`Reporter`]: the formatted-output seam, fed markup-tagged text
//! - [`structured_log`]: JSONL run log with trace ids and schema validation

#![forbid(unsafe_code)]

pub mod assertion;
pub mod case;
pub mod context;
pub mod engine;
pub mod error;
pub mod markup;
pub mod mock;
pub mod outcome;
pub mod pallet;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod reporter;
pub mod score;
pub mod structured_log;
pub mod suite;
pub mod summary;

pub use assertion::{AnomalyTracker, AssertFailure, AssertResult, CallSite, Probe};
pub use case::TestCase;
pub use context::ExecutionContext;
pub use engine::{CaseFlow, Engine, SuiteFlow};
pub use error::EngineError;
pub use mock::CallRecorder;
pub use outcome::Outcome;
pub use pallet::{DisplayMode, Pallet, Theme, Verbosity};
pub use reporter::{MemoryReporter, NullReporter, Reporter};
pub use score::Score;
pub use suite::TestSuite;
pub use summary::{RunSummary, SuiteReport};
