//! Integration tests for conversation memory persistence
//!
//! Memory is exercised against real files in a temporary directory.

use nexus_engine::conductor::{ConversationMemory, Role};
use serde_json::{json, Map, Value};
use std::fs;
use tempfile::TempDir;

fn meta(mode: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("mode".to_string(), Value::from(mode));
    map
}

#[test]
fn test_round_trip_through_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");

    {
        let mut memory = ConversationMemory::open(&path, 10);
        memory.append(Role::User, "What time is it?", meta("Standard"));
        memory.append(Role::Assistant, "It is 10:00:00", Map::new());
        memory.set_context("last_topic", "time");
    }

    let memory = ConversationMemory::open(&path, 10);
    let history = memory.history(None);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].metadata["mode"], "Standard");
    assert_eq!(history[1].content, "It is 10:00:00");
    assert_eq!(memory.context()["last_topic"], "time");
}

#[test]
fn test_stored_layout_is_history_and_context() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");

    let mut memory = ConversationMemory::open(&path, 10);
    memory.append(Role::User, "hi", Map::new());

    let stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored["history"][0]["role"], "user");
    assert_eq!(stored["history"][0]["content"], "hi");
    assert!(stored["history"][0]["timestamp"].is_string());
    assert_eq!(stored["context"], json!({}));
}

#[test]
fn test_fifo_eviction_persists() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");

    let mut memory = ConversationMemory::open(&path, 3);
    for i in 0..5 {
        memory.append(Role::User, format!("message {}", i), Map::new());
    }

    let reloaded = ConversationMemory::open(&path, 3);
    let contents: Vec<&str> = reloaded
        .history(None)
        .iter()
        .map(|i| i.content.as_str())
        .collect();
    assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
}

#[test]
fn test_smaller_bound_trims_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");

    let mut memory = ConversationMemory::open(&path, 10);
    for i in 0..6 {
        memory.append(Role::User, format!("message {}", i), Map::new());
    }

    let reloaded = ConversationMemory::open(&path, 4);
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded.history(None)[0].content, "message 2");
}

#[test]
fn test_corrupt_file_starts_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");
    fs::write(&path, "not json at all").unwrap();

    let mut memory = ConversationMemory::open(&path, 10);
    assert!(memory.is_empty());

    // The next append replaces the unreadable file
    memory.append(Role::User, "fresh start", Map::new());
    let reloaded = ConversationMemory::open(&path, 10);
    assert_eq!(reloaded.history(None)[0].content, "fresh start");
}

#[test]
fn test_clear_persists_empty_state() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memory.json");

    let mut memory = ConversationMemory::open(&path, 10);
    memory.append(Role::User, "remember me", Map::new());
    memory.set_context("k", 1);
    memory.clear();

    let reloaded = ConversationMemory::open(&path, 10);
    assert!(reloaded.is_empty());
    assert!(reloaded.context().is_empty());
}

#[test]
fn test_export_then_import_into_fresh_memory() {
    let temp = TempDir::new().unwrap();
    let export_path = temp.path().join("export.json");

    let mut source = ConversationMemory::in_memory(10);
    source.append(Role::User, "Calculate 2 + 2", Map::new());
    source.append(Role::Assistant, "4", Map::new());
    source.set_context("project", "nexus");
    source.export(&export_path).unwrap();

    let exported: Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(exported["stats"]["total_interactions"], 2);
    assert!(exported["exported_at"].is_string());

    let mut target = ConversationMemory::open(temp.path().join("memory.json"), 10);
    target.append(Role::User, "old", Map::new());
    target.import(&export_path).unwrap();

    assert_eq!(target.len(), 2);
    assert_eq!(target.history(None)[1].content, "4");
    assert_eq!(target.context()["project"], "nexus");
}

#[test]
fn test_import_missing_file_keeps_memory() {
    let temp = TempDir::new().unwrap();
    let mut memory = ConversationMemory::in_memory(10);
    memory.append(Role::User, "keep", Map::new());

    memory.import(&temp.path().join("absent.json")).unwrap();
    assert_eq!(memory.len(), 1);
}

#[test]
fn test_stats_and_search() {
    let mut memory = ConversationMemory::in_memory(10);
    memory.append(Role::User, "search for Rust news", Map::new());
    memory.append(Role::Assistant, "Rust 2.0 released", Map::new());
    memory.append(Role::User, "thanks", Map::new());

    let stats = memory.stats();
    assert_eq!(stats.total_interactions, 3);
    assert_eq!(stats.role_distribution["user"], 2);
    assert_eq!(stats.role_distribution["assistant"], 1);

    let hits = memory.search("rust", 10);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].content, "Rust 2.0 released");
}
