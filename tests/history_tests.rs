//! # History Tests
//!
//! Tests for the JSON history log: persistence, fallback to an empty log and
//! operator-only access.

use std::fs;
use std::sync::Arc;
use std::thread;

use calc_bot::history::{AccessDenied, HistoryEntry, HistoryError, HistoryStore};
use tempfile::TempDir;

const OPERATOR: u64 = 1000;

fn entry(user: u64, numbers: &[f64], result: f64) -> HistoryEntry {
    HistoryEntry {
        user,
        numbers: numbers.to_vec(),
        result,
    }
}

fn store_in(dir: &TempDir) -> HistoryStore {
    HistoryStore::new(dir.path().join("history.json"), Some(OPERATOR))
}

#[test]
fn test_load_after_first_append() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let e = entry(42, &[2.0, 2.0], 4.0);
    store.append(e.clone()).unwrap();

    assert_eq!(store.load(), vec![e]);
}

#[test]
fn test_appends_keep_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.append(entry(1, &[1.0], 1.0)).unwrap();
    store.append(entry(2, &[2.0, 3.0], 6.0)).unwrap();
    store.append(entry(1, &[9.0], -9.0)).unwrap();

    let users: Vec<u64> = store.load().iter().map(|e| e.user).collect();
    assert_eq!(users, vec![1, 2, 1]);
}

#[test]
fn test_missing_log_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.load().is_empty());
}

#[test]
fn test_truncated_log_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), r#"[{ "user": 1, "numbers": [1"#).unwrap();

    assert!(store.load().is_empty());

    // The next append starts a fresh log
    store.append(entry(5, &[5.0], 5.0)).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_log_is_pretty_printed_json_array() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.append(entry(7, &[1.0, 2.0], 3.0)).unwrap();

    let content = fs::read_to_string(store.path()).unwrap();
    assert!(content.starts_with("[\n"));

    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value[0]["user"], 7);
    assert_eq!(value[0]["numbers"].as_array().unwrap().len(), 2);
    assert_eq!(value[0]["result"], 3.0);
}

#[test]
fn test_write_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("missing").join("history.json"), None);

    let result = store.append(entry(1, &[1.0], 1.0));
    assert!(matches!(result, Err(HistoryError::Io { .. })));
}

#[test]
fn test_concurrent_appends_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(store_in(&dir));

    let handles: Vec<_> = (0..8)
        .map(|user| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..5 {
                    store.append(entry(user, &[i as f64], i as f64)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load().len(), 40);
}

#[test]
fn test_only_operator_can_list() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.append(entry(42, &[1.0], 1.0)).unwrap();

    assert_eq!(store.list_for(42), Err(AccessDenied));
    assert_eq!(store.list_for(OPERATOR).unwrap().len(), 1);
}

#[test]
fn test_nobody_can_list_without_operator() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"), None);
    store.append(entry(42, &[1.0], 1.0)).unwrap();

    assert_eq!(store.list_for(42), Err(AccessDenied));
    assert_eq!(store.list_for(OPERATOR), Err(AccessDenied));
}
