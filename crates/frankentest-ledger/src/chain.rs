//! Append-only record chain.

use thiserror::Error;

use crate::digest::{chain_digest, is_hex_digest, to_hex};
use crate::material::LedgerMaterial;
use crate::record::{LedgerIdentity, LedgerRecord};

/// Chain integrity failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("record {index}: prev_hash {found:?} does not match preceding hash {expected:?}")]
    BrokenLink {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },
    #[error("record {index}: malformed digest '{value}'")]
    MalformedDigest { index: usize, value: String },
    #[error("capacity reservation failed for {requested} records")]
    Reserve { requested: usize },
}

/// Ordered, owned list of stamped records.
///
/// `records[i].prev_hash == Some(records[i - 1].hash)` for every `i > 0`, and the first
/// record has no predecessor. The chain only grows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerChain {
    records: Vec<LedgerRecord>,
}

impl LedgerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the most recent record, if any.
    #[must_use]
    pub fn head_hash(&self) -> Option<&str> {
        self.records.last().map(|r| r.hash.as_str())
    }

    /// Reserve room for `additional` more records without panicking on OOM.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), ChainError> {
        self.records
            .try_reserve(additional)
            .map_err(|_| ChainError::Reserve {
                requested: self.records.len().saturating_add(additional),
            })
    }

    /// Hash `material` onto the current head and append the resulting record.
    ///
    /// Returns a copy of the appended record so callers can attach it to the entity it
    /// describes.
    pub fn stamp(
        &mut self,
        identity: &LedgerIdentity,
        timestamp: i64,
        material: &LedgerMaterial,
    ) -> Result<LedgerRecord, ChainError> {
        self.try_reserve(1)?;
        let prev = self.head_hash().map(str::to_owned);
        let digest = chain_digest(
            material.as_bytes(),
            prev.as_deref().unwrap_or_default().as_bytes(),
        );
        let record = LedgerRecord {
            hash: to_hex(&digest),
            prev_hash: prev,
            timestamp,
            ..LedgerRecord::unstamped(identity)
        };
        self.records.push(record.clone());
        Ok(record)
    }

    #[must_use]
    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check link integrity and digest shape of every record.
    pub fn verify(&self) -> Result<(), ChainError> {
        verify_links(&self.records)
    }
}

/// Verify a slice of records as a single chain.
///
/// Only linkage and digest shape are checked: the hashed material is not persisted with
/// the record, so digests cannot be recomputed offline.
pub fn verify_links(records: &[LedgerRecord]) -> Result<(), ChainError> {
    let mut expected: Option<&str> = None;
    for (index, record) in records.iter().enumerate() {
        if !is_hex_digest(&record.hash) {
            return Err(ChainError::MalformedDigest {
                index,
                value: record.hash.clone(),
            });
        }
        if record.prev_hash.as_deref() != expected {
            return Err(ChainError::BrokenLink {
                index,
                expected: expected.map(str::to_owned),
                found: record.prev_hash.clone(),
            });
        }
        expected = Some(record.hash.as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp_n(chain: &mut LedgerChain, n: usize) {
        let id = LedgerIdentity::default();
        for i in 0..n {
            let material = LedgerMaterial::new("case.register").field("name", i);
            chain.stamp(&id, 1_700_000_000, &material).unwrap();
        }
    }

    #[test]
    fn first_record_has_no_predecessor() {
        let mut chain = LedgerChain::new();
        stamp_n(&mut chain, 1);
        assert_eq!(chain.records()[0].prev_hash, None);
        assert_eq!(chain.records()[0].hash.len(), 64);
    }

    #[test]
    fn records_link_to_predecessor() {
        let mut chain = LedgerChain::new();
        stamp_n(&mut chain, 5);
        for pair in chain.records().windows(2) {
            assert_eq!(pair[1].prev_hash.as_deref(), Some(pair[0].hash.as_str()));
        }
        assert!(chain.verify().is_ok());
        assert_eq!(chain.head_hash(), Some(chain.records()[4].hash.as_str()));
    }

    #[test]
    fn identical_material_differs_by_position() {
        let id = LedgerIdentity::default();
        let material = LedgerMaterial::new("case.register").field("name", "dup");
        let mut chain = LedgerChain::new();
        let a = chain.stamp(&id, 0, &material).unwrap();
        let b = chain.stamp(&id, 0, &material).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn tampered_link_is_reported() {
        let mut chain = LedgerChain::new();
        stamp_n(&mut chain, 3);
        let mut records = chain.records().to_vec();
        records[2].prev_hash = Some("0".repeat(64));
        let err = verify_links(&records).unwrap_err();
        assert!(matches!(err, ChainError::BrokenLink { index: 2, .. }));
    }

    #[test]
    fn malformed_digest_is_reported() {
        let mut chain = LedgerChain::new();
        stamp_n(&mut chain, 2);
        let mut records = chain.records().to_vec();
        records[0].hash = "not-a-digest".to_string();
        let err = verify_links(&records).unwrap_err();
        assert_eq!(
            err,
            ChainError::MalformedDigest {
                index: 0,
                value: "not-a-digest".to_string()
            }
        );
    }

    #[test]
    fn stamp_keeps_identity() {
        let id = LedgerIdentity::new("qa", "ci-runner-7");
        let mut chain = LedgerChain::new();
        let rec = chain
            .stamp(&id, 42, &LedgerMaterial::new("suite.register"))
            .unwrap();
        assert_eq!(rec.author, "qa");
        assert_eq!(rec.origin_device_id, "ci-runner-7");
        assert_eq!(rec.timestamp, 42);
        assert!(rec.is_stamped());
    }
}
