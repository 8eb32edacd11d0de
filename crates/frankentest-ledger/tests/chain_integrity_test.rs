//! Integration tests for ledger chain integrity.

use frankentest_ledger::{
    ChainError, LedgerChain, LedgerIdentity, LedgerMaterial, LedgerRecord, StampClock, verify_links,
};

fn build(names: &[&str], clock: StampClock) -> LedgerChain {
    let id = LedgerIdentity::default();
    let mut chain = LedgerChain::new();
    for name in names {
        let material = LedgerMaterial::new("case.result")
            .field("name", name)
            .field("author", &id.author)
            .field("origin", &id.origin_device_id)
            .field("result", 1)
            .field_f64("trust", 0.0)
            .field_f64("confidence", 0.0);
        chain
            .stamp(&id, clock.now(), &material)
            .expect("stamp should succeed");
    }
    chain
}

#[test]
fn adjacent_records_are_linked() {
    let chain = build(&["A", "B", "C", "D"], StampClock::Fixed(1_760_000_000));
    let records = chain.records();
    assert_eq!(records.len(), 4);
    assert!(records[0].prev_hash.is_none());
    for i in 1..records.len() {
        assert_eq!(
            records[i].prev_hash.as_deref(),
            Some(records[i - 1].hash.as_str()),
            "record {i} must link to record {}",
            i - 1
        );
    }
}

#[test]
fn fixed_clock_reproduces_chain() {
    let a = build(&["A", "B"], StampClock::Fixed(7));
    let b = build(&["A", "B"], StampClock::Fixed(7));
    assert_eq!(a, b);
}

#[test]
fn exported_chain_verifies_after_json_round_trip() {
    let chain = build(&["A", "B", "C"], StampClock::Fixed(7));
    let json = serde_json::to_string(chain.records()).expect("serialize chain");
    let restored: Vec<LedgerRecord> = serde_json::from_str(&json).expect("parse chain");
    assert!(verify_links(&restored).is_ok());
}

#[test]
fn dropped_record_breaks_chain() {
    let chain = build(&["A", "B", "C"], StampClock::Fixed(7));
    let mut records = chain.records().to_vec();
    records.remove(1);
    match verify_links(&records) {
        Err(ChainError::BrokenLink { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected broken link, got {other:?}"),
    }
}
