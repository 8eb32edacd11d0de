//! Hashing primitive.
//!
//! `chain_digest(content, chain_prev)` is SHA-256 over a domain tag followed by the
//! length-prefixed content and the length-prefixed previous hash. Length prefixes keep
//! `("ab", "c")` and `("a", "bc")` from colliding.
//!
//! Assertion fingerprints use BLAKE3 in derive-key mode; they only need to be fast and
//! stable within one process.

use sha2::{Digest as _, Sha256};

/// Raw digest size in bytes.
pub const DIGEST_SIZE: usize = 32;
/// Length of a hex-encoded digest.
pub const HEX_DIGEST_LEN: usize = DIGEST_SIZE * 2;

/// A 32-byte digest.
pub type Digest32 = [u8; DIGEST_SIZE];

const CHAIN_DOMAIN: &[u8] = b"frankentest.ledger.v1";
const FINGERPRINT_CONTEXT: &str = "frankentest 2026 assertion fingerprint v1";

/// Deterministic content hash of `content` chained onto `chain_prev`.
#[must_use]
pub fn chain_digest(content: &[u8], chain_prev: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(CHAIN_DOMAIN);
    hasher.update((content.len() as u64).to_le_bytes());
    hasher.update(content);
    hasher.update((chain_prev.len() as u64).to_le_bytes());
    hasher.update(chain_prev);
    hasher.finalize().into()
}

/// Fingerprint of an assertion call site plus its failure message.
#[must_use]
pub fn fingerprint(site: &str, message: &str) -> Digest32 {
    let mut hasher = blake3::Hasher::new_derive_key(FINGERPRINT_CONTEXT);
    hasher.update(&(site.len() as u64).to_le_bytes());
    hasher.update(site.as_bytes());
    hasher.update(message.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Lowercase hex encoding.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(char::from(HEX[usize::from(b >> 4)]));
        out.push(char::from(HEX[usize::from(b & 0x0f)]));
    }
    out
}

/// Decode a 64-character hex digest. Accepts either case.
#[must_use]
pub fn from_hex(s: &str) -> Option<Digest32> {
    if s.len() != HEX_DIGEST_LEN {
        return None;
    }
    let mut out = [0u8; DIGEST_SIZE];
    let bytes = s.as_bytes();
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = hex_value(bytes[i * 2])?;
        let lo = hex_value(bytes[i * 2 + 1])?;
        *slot = (hi << 4) | lo;
    }
    Some(out)
}

/// True when `s` is a well-formed hex digest.
#[must_use]
pub fn is_hex_digest(s: &str) -> bool {
    from_hex(s).is_some()
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_digest_is_deterministic() {
        let a = chain_digest(b"math|anonymous|unknown", b"");
        let b = chain_digest(b"math|anonymous|unknown", b"");
        assert_eq!(a, b);
    }

    #[test]
    fn chain_digest_depends_on_prev() {
        let base = chain_digest(b"case", b"");
        let chained = chain_digest(b"case", b"00ff");
        assert_ne!(base, chained);
    }

    #[test]
    fn length_prefix_separates_boundaries() {
        assert_ne!(chain_digest(b"ab", b"c"), chain_digest(b"a", b"bc"));
    }

    #[test]
    fn fingerprint_separates_site_and_message() {
        let a = fingerprint("tests.rs:10:math", "2+2 == 5");
        let b = fingerprint("tests.rs:10:math", "2+2 == 5");
        let c = fingerprint("tests.rs:11:math", "2+2 == 5");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hex_round_trip_and_rejects_garbage() {
        let digest = chain_digest(b"x", b"");
        let hex = to_hex(&digest);
        assert_eq!(hex.len(), HEX_DIGEST_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(from_hex(&hex), Some(digest));
        assert_eq!(from_hex(&hex.to_ascii_uppercase()), Some(digest));
        assert!(from_hex("abc").is_none());
        assert!(!is_hex_digest(&"zz".repeat(DIGEST_SIZE)));
    }
}
