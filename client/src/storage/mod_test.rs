use std::collections::HashMap;

use serde::Deserialize;

use super::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Draft {
    title: String,
    tags: Vec<String>,
}

fn quota_store(limit: usize) -> Store {
    Store::new(Box::new(MemoryBackend::with_quota(limit)), Box::new(MemoryBackend::new()))
}

// =============================================================
// Round trips
// =============================================================

#[test]
fn set_then_get_returns_equal_value() {
    let store = Store::in_memory();
    let draft = Draft { title: "hello".into(), tags: vec!["a".into(), "b".into()] };

    store.set(Scope::Local, "draft", &draft);
    assert_eq!(store.get::<Draft>(Scope::Local, "draft"), Some(draft));
}

#[test]
fn scopes_are_independent() {
    let store = Store::in_memory();
    store.set(Scope::Local, "k", "local");
    store.set(Scope::Session, "k", "session");

    assert_eq!(store.get::<String>(Scope::Local, "k").as_deref(), Some("local"));
    assert_eq!(store.get::<String>(Scope::Session, "k").as_deref(), Some("session"));

    store.clear(Scope::Session);
    assert_eq!(store.get::<String>(Scope::Session, "k"), None);
    assert_eq!(store.get::<String>(Scope::Local, "k").as_deref(), Some("local"));
}

#[test]
fn remove_deletes_key() {
    let store = Store::in_memory();
    store.set(Scope::Local, "k", &1);
    store.remove(Scope::Local, "k");
    store.remove(Scope::Local, "never-set");
    assert_eq!(store.get::<i32>(Scope::Local, "k"), None);
}

// =============================================================
// Degraded reads
// =============================================================

#[test]
fn missing_key_is_none() {
    let store = Store::in_memory();
    assert_eq!(store.get::<String>(Scope::Local, "nope"), None);
}

#[test]
fn stored_null_is_none() {
    let store = Store::in_memory();
    store.set(Scope::Local, "k", &Option::<String>::None);
    assert_eq!(store.get::<String>(Scope::Local, "k"), None);
}

#[test]
fn malformed_raw_value_is_none() {
    let backend = MemoryBackend::new();
    backend.set("k", "{not json".to_owned()).unwrap();
    let store = Store::new(Box::new(backend), Box::new(MemoryBackend::new()));

    assert_eq!(store.get::<serde_json::Value>(Scope::Local, "k"), None);
}

#[test]
fn wrong_shape_is_none() {
    let store = Store::in_memory();
    store.set(Scope::Local, "k", "a string");
    assert_eq!(store.get::<Draft>(Scope::Local, "k"), None);
}

// =============================================================
// Swallowed write failures
// =============================================================

#[test]
fn unserializable_value_is_dropped() {
    let store = Store::in_memory();
    let mut map = HashMap::new();
    map.insert((1, 2), 3);

    store.set(Scope::Local, "bad", &map);
    assert_eq!(store.get::<serde_json::Value>(Scope::Local, "bad"), None);
}

#[test]
fn quota_failure_is_dropped_and_previous_value_kept() {
    let store = quota_store(16);
    store.set(Scope::Local, "k", "small");
    store.set(Scope::Local, "k", &"x".repeat(64));

    assert_eq!(store.get::<String>(Scope::Local, "k").as_deref(), Some("small"));
}
