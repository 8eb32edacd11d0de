//! Hash input builder.

use std::fmt::Display;

const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// Deterministic concatenation of named fields that gets hashed into a record.
///
/// Each field is encoded as `name 0x1F value 0x1E`. The leading `kind` tag keeps
/// registration, result and run events from ever sharing a preimage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMaterial {
    bytes: Vec<u8>,
}

impl LedgerMaterial {
    /// Start material for an event kind, e.g. `case.result`.
    #[must_use]
    pub fn new(kind: &str) -> Self {
        let mut bytes = Vec::with_capacity(96);
        bytes.extend_from_slice(kind.as_bytes());
        bytes.push(RECORD_SEP);
        Self { bytes }
    }

    /// Append a displayable field.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Display) -> Self {
        self.bytes.extend_from_slice(name.as_bytes());
        self.bytes.push(FIELD_SEP);
        self.bytes.extend_from_slice(value.to_string().as_bytes());
        self.bytes.push(RECORD_SEP);
        self
    }

    /// Append a float rounded to two decimals, so `0.1 + 0.2` and `0.3` agree.
    #[must_use]
    pub fn field_f64(self, name: &str, value: f64) -> Self {
        self.field(name, format_args!("{value:.2}"))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
