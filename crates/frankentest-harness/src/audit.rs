//! Ledger export and offline audit.
//!
//! A run's chains are exported to one JSON document:
//! - the engine chain (suite registrations, suite runs, engine runs)
//! - one case chain per suite (case registrations and results)
//!
//! The audit re-checks link integrity and digest shape of every chain. Hashed material
//! is not exported, so digests are not recomputed.

use std::path::Path;

use frankentest_core::Engine;
use frankentest_ledger::{ChainError, LedgerRecord, is_hex_digest, to_hex, verify_links};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EXPORT_SCHEMA_VERSION: &str = "v1";
pub const ENGINE_CHAIN: &str = "engine";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("ledger io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainExport {
    pub name: String,
    pub records: Vec<LedgerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerExport {
    pub schema_version: String,
    pub run_id: String,
    pub engine: ChainExport,
    pub suites: Vec<ChainExport>,
}

impl LedgerExport {
    #[must_use]
    pub fn from_engine(engine: &Engine) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            run_id: engine.run_id().to_string(),
            engine: ChainExport {
                name: ENGINE_CHAIN.to_string(),
                records: engine.chain().records().to_vec(),
            },
            suites: engine
                .suites()
                .iter()
                .map(|suite| ChainExport {
                    name: suite.name().to_string(),
                    records: suite.case_chain().records().to_vec(),
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), AuditError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, AuditError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn chains(&self) -> impl Iterator<Item = &ChainExport> {
        std::iter::once(&self.engine).chain(self.suites.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditViolation {
    pub code: String,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditReport {
    pub ok: bool,
    pub schema_version: String,
    pub run_id: String,
    pub chains_checked: usize,
    pub records_checked: usize,
    /// sha256 of the audited document, when audited from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_sha256: Option<String>,
    pub violations: Vec<AuditViolation>,
}

impl AuditReport {
    fn push(&mut self, v: AuditViolation) {
        self.ok = false;
        self.violations.push(v);
    }
}

fn chain_violation(chain: &str, err: &ChainError) -> AuditViolation {
    let (code, index) = match err {
        ChainError::BrokenLink { index, .. } => ("chain.broken_link", Some(*index)),
        ChainError::MalformedDigest { index, .. } => ("chain.malformed_digest", Some(*index)),
        ChainError::Reserve { .. } => ("chain.reserve", None),
    };
    AuditViolation {
        code: code.to_string(),
        chain: chain.to_string(),
        index,
        message: err.to_string(),
    }
}

/// Check every chain in `export`.
#[must_use]
pub fn audit_export(export: &LedgerExport) -> AuditReport {
    let mut report = AuditReport {
        ok: true,
        schema_version: export.schema_version.clone(),
        run_id: export.run_id.clone(),
        chains_checked: 0,
        records_checked: 0,
        export_sha256: None,
        violations: Vec::new(),
    };

    if export.schema_version != EXPORT_SCHEMA_VERSION {
        report.push(AuditViolation {
            code: "export.schema_version".to_string(),
            chain: String::new(),
            index: None,
            message: format!(
                "unsupported schema_version '{}', expected '{EXPORT_SCHEMA_VERSION}'",
                export.schema_version
            ),
        });
    }

    for chain in export.chains() {
        report.chains_checked += 1;
        report.records_checked += chain.records.len();
        if let Err(err) = verify_links(&chain.records) {
            report.push(chain_violation(&chain.name, &err));
        }
        for (index, record) in chain.records.iter().enumerate() {
            if let Some(prev) = record.prev_hash.as_deref()
                && !is_hex_digest(prev)
            {
                report.push(AuditViolation {
                    code: "record.malformed_prev_hash".to_string(),
                    chain: chain.name.clone(),
                    index: Some(index),
                    message: format!("prev_hash '{prev}' is not a 64-char lowercase hex digest"),
                });
            }
            if !(0.0..=1.0).contains(&record.trust_score) || !(0.0..=1.0).contains(&record.confidence)
            {
                report.push(AuditViolation {
                    code: "record.score_range".to_string(),
                    chain: chain.name.clone(),
                    index: Some(index),
                    message: format!(
                        "trust_score {} / confidence {} outside 0..=1",
                        record.trust_score, record.confidence
                    ),
                });
            }
        }
    }

    report
}

/// Read and audit an exported ledger file.
pub fn audit_file(path: &Path) -> Result<AuditReport, AuditError> {
    use sha2::Digest;
    let bytes = std::fs::read(path)?;
    let export: LedgerExport = serde_json::from_slice(&bytes)?;
    let mut report = audit_export(&export);
    report.export_sha256 = Some(to_hex(&sha2::Sha256::digest(&bytes)));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frankentest_core::{NullReporter, Pallet, TestCase};

    fn ran_engine() -> Engine {
        let pallet = Pallet {
            fixed_timestamp: Some(1_767_225_600),
            run_id: Some("audit-run".to_string()),
            ..Pallet::default()
        };
        let mut engine = Engine::start(pallet, Box::new(NullReporter)).unwrap();
        let suite = engine
            .create_suite("s")
            .case(TestCase::new("a").with_body(|_| Ok(())))
            .unwrap();
        engine.add_suite(suite).unwrap();
        engine.run_all().unwrap();
        engine
    }

    #[test]
    fn clean_export_passes() {
        let export = LedgerExport::from_engine(&ran_engine());
        assert_eq!(export.run_id, "audit-run");
        assert_eq!(export.engine.records.len(), 3);
        assert_eq!(export.suites[0].records.len(), 2);
        let report = audit_export(&export);
        assert!(report.ok, "{:?}", report.violations);
        assert_eq!(report.chains_checked, 2);
        assert_eq!(report.records_checked, 5);
    }

    #[test]
    fn tampering_is_reported_per_chain() {
        let mut export = LedgerExport::from_engine(&ran_engine());
        export.suites[0].records[1].prev_hash = Some("0".repeat(64));
        export.engine.records[0].hash = "not-hex".to_string();
        let report = audit_export(&export);
        assert!(!report.ok);
        let codes: Vec<(&str, &str)> = report
            .violations
            .iter()
            .map(|v| (v.code.as_str(), v.chain.as_str()))
            .collect();
        assert!(codes.contains(&("chain.malformed_digest", "engine")), "{codes:?}");
        assert!(codes.contains(&("chain.broken_link", "s")), "{codes:?}");
    }

    #[test]
    fn unknown_schema_version_is_flagged() {
        let mut export = LedgerExport::from_engine(&ran_engine());
        export.schema_version = "v0".to_string();
        let report = audit_export(&export);
        assert!(!report.ok);
        assert_eq!(report.violations[0].code, "export.schema_version");
    }
}
