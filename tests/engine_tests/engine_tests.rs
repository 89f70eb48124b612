//! Tests for Engine
//!
//! These tests verify:
//! - Basic get/put/delete operations
//! - Overwrite and delete semantics against the log and index
//! - Persistence across reopen
//! - Engine lifecycle (open/close)

use chromodb::config::{Config, SyncStrategy};
use chromodb::engine::Engine;
use chromodb::error::ChromoError;
use chromodb::record::{encoded_len, Record};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = open_in(&temp_dir);
    (temp_dir, engine)
}

fn open_in(temp_dir: &TempDir) -> Engine {
    Engine::open_with(
        temp_dir.path().join("chromo.db"),
        temp_dir.path().join("chromo.idx"),
        SyncStrategy::EveryWrite, // Sync every write for test reliability
    )
    .unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_open_creates_files_and_directories() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("nested").join("chromo.db");
    let index = temp_dir.path().join("other").join("chromo.idx");

    let engine = Engine::open(&data, &index).unwrap();

    assert!(engine.is_open());
    assert!(data.exists());
    assert!(index.exists());
    assert!(engine.is_empty().unwrap());
}

#[test]
fn test_engine_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_path(temp_dir.path().join("a.db"))
        .index_path(temp_dir.path().join("a.idx"))
        .build();

    let mut engine = Engine::from_config(&config).unwrap();
    engine.put(b"k", b"v").unwrap();

    assert_eq!(engine.get(b"k").unwrap(), b"v");
    assert!(temp_dir.path().join("a.db").exists());
}

#[test]
fn test_engine_put_get() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"name", b"alex").unwrap();

    assert_eq!(engine.get(b"name").unwrap(), b"alex");
}

#[test]
fn test_engine_get_nonexistent_key() {
    let (_temp, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.get(b"nonexistent"),
        Err(ChromoError::KeyNotFound)
    ));
}

#[test]
fn test_engine_overwrite() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"key", b"value1").unwrap();
    engine.put(b"key", b"value2").unwrap();

    assert_eq!(engine.get(b"key").unwrap(), b"value2");
    assert_eq!(engine.len().unwrap(), 1);
}

#[test]
fn test_engine_delete() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"key", b"value").unwrap();
    engine.delete(b"key").unwrap();

    assert!(matches!(engine.get(b"key"), Err(ChromoError::KeyNotFound)));
    assert!(engine.is_empty().unwrap());
}

#[test]
fn test_engine_delete_nonexistent_key() {
    let (_temp, mut engine) = setup_temp_engine();
    engine.put(b"other", b"value").unwrap();

    assert!(matches!(
        engine.delete(b"missing"),
        Err(ChromoError::KeyNotFound)
    ));
    assert_eq!(engine.get(b"other").unwrap(), b"value");
}

#[test]
fn test_engine_empty_value() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"empty", b"").unwrap();

    assert_eq!(engine.get(b"empty").unwrap(), b"");
}

#[test]
fn test_engine_put_after_delete() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"key", b"first").unwrap();
    engine.delete(b"key").unwrap();
    engine.put(b"key", b"second").unwrap();

    assert_eq!(engine.get(b"key").unwrap(), b"second");
}

// =============================================================================
// Log / Index Layout Tests
// =============================================================================

#[test]
fn test_overwrite_leaves_old_record_in_log() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"key", b"old").unwrap();
    engine.put(b"key", b"new").unwrap();

    let records: Vec<(u64, Record)> = engine
        .data_log()
        .unwrap()
        .scan()
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(
        records,
        vec![
            (0, Record::new("key", "old")),
            (encoded_len(3, 3), Record::new("key", "new")),
        ]
    );
    assert_eq!(engine.index().unwrap().find(b"key"), Some(encoded_len(3, 3)));
}

#[test]
fn test_delete_does_not_shrink_log() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put(b"key", b"value").unwrap();
    let before = engine.data_len().unwrap();
    engine.delete(b"key").unwrap();

    assert_eq!(engine.data_len().unwrap(), before);
    assert_eq!(engine.index().unwrap().file_len(), 0);
}

#[test]
fn test_keys_are_sorted() {
    let (_temp, mut engine) = setup_temp_engine();

    for key in ["pear", "apple", "fig", "banana"] {
        engine.put(key.as_bytes(), b"fruit").unwrap();
    }

    assert_eq!(
        engine.keys().unwrap(),
        vec![
            b"apple".to_vec(),
            b"banana".to_vec(),
            b"fig".to_vec(),
            b"pear".to_vec(),
        ]
    );
}

#[test]
fn test_many_keys_mixed_workload() {
    let (_temp, mut engine) = setup_temp_engine();

    for i in 0..200u32 {
        let key = format!("key{:04}", i);
        engine.put(key.as_bytes(), format!("v{}", i).as_bytes()).unwrap();
    }
    for i in (0..200u32).step_by(3) {
        engine.delete(format!("key{:04}", i).as_bytes()).unwrap();
    }
    for i in (1..200u32).step_by(3) {
        let key = format!("key{:04}", i);
        engine.put(key.as_bytes(), b"updated").unwrap();
    }

    for i in 0..200u32 {
        let key = format!("key{:04}", i);
        let result = engine.get(key.as_bytes());
        match i % 3 {
            0 => assert!(matches!(result, Err(ChromoError::KeyNotFound))),
            1 => assert_eq!(result.unwrap(), b"updated"),
            _ => assert_eq!(result.unwrap(), format!("v{}", i).as_bytes()),
        }
    }
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_engine_reopen_persists_state() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = open_in(&temp_dir);
        engine.put(b"name", b"alex").unwrap();
        engine.put(b"city", b"paris").unwrap();
        engine.put(b"name", b"sam").unwrap();
        engine.delete(b"city").unwrap();
        engine.close().unwrap();
    }

    let mut engine = open_in(&temp_dir);

    assert_eq!(engine.get(b"name").unwrap(), b"sam");
    assert!(matches!(engine.get(b"city"), Err(ChromoError::KeyNotFound)));
    assert_eq!(engine.keys().unwrap(), vec![b"name".to_vec()]);
}

#[test]
fn test_engine_drop_persists_state() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open_with(
            temp_dir.path().join("chromo.db"),
            temp_dir.path().join("chromo.idx"),
            SyncStrategy::EveryNWrites { count: 1000 },
        )
        .unwrap();
        engine.put(b"key", b"value").unwrap();
    }

    let mut engine = open_in(&temp_dir);
    assert_eq!(engine.get(b"key").unwrap(), b"value");
}

#[test]
fn test_index_pointing_at_wrong_record_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = open_in(&temp_dir);
        engine.put(b"a", b"1").unwrap();
        engine.put(b"b", b"2").unwrap();
    }

    // Point "b" at the record for "a".
    let mut index = Vec::new();
    index.extend_from_slice(&1u32.to_le_bytes());
    index.extend_from_slice(b"b");
    index.extend_from_slice(&0i64.to_le_bytes());
    std::fs::write(temp_dir.path().join("chromo.idx"), index).unwrap();

    let mut engine = open_in(&temp_dir);
    assert!(matches!(
        engine.get(b"b"),
        Err(ChromoError::CorruptRecord { offset: 0, .. })
    ));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_closed_rejects_operations() {
    let (_temp, mut engine) = setup_temp_engine();
    engine.put(b"key", b"value").unwrap();

    engine.close().unwrap();

    assert!(!engine.is_open());
    assert!(matches!(engine.put(b"k", b"v"), Err(ChromoError::EngineClosed)));
    assert!(matches!(engine.get(b"key"), Err(ChromoError::EngineClosed)));
    assert!(matches!(engine.delete(b"key"), Err(ChromoError::EngineClosed)));
    assert!(matches!(engine.len(), Err(ChromoError::EngineClosed)));
}

#[test]
fn test_engine_close_twice() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.close().unwrap();
    engine.close().unwrap();

    assert!(!engine.is_open());
}
