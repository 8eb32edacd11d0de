use frankentest_ledger::ChainError;
use thiserror::Error;

/// Errors surfaced by registration and run operations.
///
/// Assertion failures and panicking case bodies are not errors: they become case
/// outcomes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("allocation failed while growing the {what} registry")]
    Allocation { what: &'static str },
    #[error("no suite at index {index} (engine holds {count})")]
    UnknownSuite { index: usize, count: usize },
    #[error("no case at index {index} in suite '{suite}'")]
    UnknownCase { suite: String, index: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("ledger: {0}")]
    Ledger(ChainError),
    #[error("log io: {0}")]
    Log(#[from] std::io::Error),
}

impl From<ChainError> for EngineError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Reserve { .. } => Self::Allocation { what: "ledger" },
            other => Self::Ledger(other),
        }
    }
}
