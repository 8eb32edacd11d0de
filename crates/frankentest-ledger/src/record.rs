//! Ledger record and stamping identity.

use serde::{Deserialize, Serialize};

/// Default author recorded when none is configured.
pub const DEFAULT_AUTHOR: &str = "anonymous";
/// Default origin device recorded when none is configured.
pub const DEFAULT_ORIGIN: &str = "unknown";

/// Who stamps records and where from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerIdentity {
    pub author: String,
    pub origin_device_id: String,
}

impl Default for LedgerIdentity {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            origin_device_id: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl LedgerIdentity {
    #[must_use]
    pub fn new(author: impl Into<String>, origin_device_id: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            origin_device_id: origin_device_id.into(),
        }
    }
}

/// Source of record timestamps.
///
/// `Fixed` exists for reproducible ledgers: with a fixed clock, identical runs produce
/// byte-identical chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StampClock {
    #[default]
    Wall,
    Fixed(i64),
}

impl StampClock {
    /// Current timestamp in unix seconds.
    #[must_use]
    pub fn now(self) -> i64 {
        match self {
            Self::Fixed(ts) => ts,
            Self::Wall => std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
                .unwrap_or_default(),
        }
    }
}

/// Audit record attached to a case, suite or engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Hex-encoded 32-byte digest. Empty until the record is stamped.
    pub hash: String,
    /// Hash of the preceding record in the same chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    /// Unix seconds.
    pub timestamp: i64,
    pub origin_device_id: String,
    pub author: String,
    pub trust_score: f64,
    pub confidence: f64,
    pub immutable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Default for LedgerRecord {
    fn default() -> Self {
        Self::unstamped(&LedgerIdentity::default())
    }
}

impl LedgerRecord {
    /// A record carrying identity defaults but no hash yet.
    #[must_use]
    pub fn unstamped(identity: &LedgerIdentity) -> Self {
        Self {
            hash: String::new(),
            prev_hash: None,
            timestamp: 0,
            origin_device_id: identity.origin_device_id.clone(),
            author: identity.author.clone(),
            trust_score: 0.0,
            confidence: 0.0,
            immutable: false,
            signature: None,
        }
    }

    #[must_use]
    pub fn is_stamped(&self) -> bool {
        !self.hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ledger_contract() {
        let rec = LedgerRecord::default();
        assert_eq!(rec.author, "anonymous");
        assert_eq!(rec.origin_device_id, "unknown");
        assert_eq!(rec.trust_score, 0.0);
        assert_eq!(rec.confidence, 0.0);
        assert!(!rec.immutable);
        assert!(rec.signature.is_none());
        assert!(!rec.is_stamped());
    }

    #[test]
    fn fixed_clock_is_constant() {
        let clock = StampClock::Fixed(1_760_000_000);
        assert_eq!(clock.now(), 1_760_000_000);
        assert_eq!(clock.now(), clock.now());
        assert!(StampClock::Wall.now() > 0);
    }

    #[test]
    fn record_serializes_without_empty_optionals() {
        let rec = LedgerRecord::default();
        let json = serde_json::to_value(&rec).expect("serialize record");
        assert!(json.get("prev_hash").is_none());
        assert!(json.get("signature").is_none());
        assert_eq!(json["author"], "anonymous");
    }
}
