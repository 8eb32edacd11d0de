//! Hash-chained run ledger for frankentest.
//!
//! This crate provides:
//! - [`digest`]: the hashing primitive used for ledger stamping and assertion fingerprints
//! - [`LedgerMaterial`]: deterministic, length-delimited hash input builder
//! - [`LedgerRecord`]: the audit record attached to every case, suite and engine run
//! - [`LedgerChain`]: an append-only chain of records with link verification
//!
//! The chain is tamper-evidence for "what happened" during a run. It is not a
//! security credential: nothing is keyed and nothing is signed.

#![forbid(unsafe_code)]

pub mod chain;
pub mod digest;
pub mod material;
pub mod record;

pub use chain::{ChainError, LedgerChain, verify_links};
pub use digest::{DIGEST_SIZE, Digest32, chain_digest, fingerprint, is_hex_digest, to_hex};
pub use material::LedgerMaterial;
pub use record::{LedgerIdentity, LedgerRecord, StampClock};
