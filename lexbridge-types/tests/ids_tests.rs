use lexbridge_types::{guid_key, Guid};
use std::collections::HashSet;
use std::str::FromStr;

// ── Guid ─────────────────────────────────────────────────────────

#[test]
fn guid_new_is_unique() {
    let a = Guid::new();
    let b = Guid::new();
    assert_ne!(a, b);
}

#[test]
fn guid_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::new_v4();
    let id = Guid::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn guid_parse_is_case_insensitive() {
    let lower = Guid::parse("c1ec5c4d-e382-11de-8a39-0800200c9a66").unwrap();
    let upper = Guid::parse("C1EC5C4D-E382-11DE-8A39-0800200C9A66").unwrap();
    assert_eq!(lower, upper);
}

#[test]
fn guid_displays_lower_case() {
    let id = Guid::parse("C1EC5C4D-E382-11DE-8A39-0800200C9A66").unwrap();
    assert_eq!(id.to_string(), "c1ec5c4d-e382-11de-8a39-0800200c9a66");
}

#[test]
fn guid_from_str() {
    let id = Guid::new();
    let parsed = Guid::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn guid_parse_invalid() {
    assert!(Guid::parse("not-a-guid").is_err());
    assert!(Guid::from_str("").is_err());
}

#[test]
fn guid_order_matches_text_order() {
    let mut ids: Vec<Guid> = (0..32).map(|_| Guid::new()).collect();
    let mut texts: Vec<String> = ids.iter().map(Guid::to_string).collect();
    ids.sort();
    texts.sort();
    let sorted: Vec<String> = ids.iter().map(Guid::to_string).collect();
    assert_eq!(sorted, texts);
}

#[test]
fn guid_hash_and_eq() {
    let id = Guid::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(Guid::parse(&id.to_string().to_uppercase()).unwrap());
    assert_eq!(set.len(), 1);
}

#[test]
fn guid_serialization_roundtrip() {
    let id = Guid::new();
    let json = serde_json::to_string(&id).unwrap();
    let parsed: Guid = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}

// ── guid_key ─────────────────────────────────────────────────────

#[test]
fn guid_key_lowercases_and_trims() {
    assert_eq!(guid_key(" ABC-def "), "abc-def");
}
