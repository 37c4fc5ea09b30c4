//! Backend Tests
//!
//! Tests verify:
//! - Change flags from do_store / do_remove
//! - Partition isolation
//! - File backend persistence, new-partition markers and migration
//! - The service on top of the file backend

use std::fs;

use scopedkv::backend::{FileBackend, InMemoryBackend, StorageBackend};
use scopedkv::model::IS_NEW_KEY;
use scopedkv::{
    BackendKind, Config, Scope, StorageError, StorageService, Target, WorkspaceIdentity,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn workspace(id: &str) -> WorkspaceIdentity {
    WorkspaceIdentity::new(id)
}

fn file_config(dir: &TempDir, id: &str) -> Config {
    Config::builder()
        .backend(BackendKind::File)
        .data_dir(dir.path())
        .workspace(workspace(id))
        .build()
}

// =============================================================================
// In-Memory Backend Tests
// =============================================================================

#[test]
fn test_memory_store_reports_change() {
    let backend = InMemoryBackend::new();

    assert!(backend.do_store("k", "v", Scope::Global).unwrap());
    assert!(!backend.do_store("k", "v", Scope::Global).unwrap());
    assert!(backend.do_store("k", "v2", Scope::Global).unwrap());
    assert_eq!(backend.get("k", Scope::Global), Some("v2".to_string()));
}

#[test]
fn test_memory_remove_reports_presence() {
    let backend = InMemoryBackend::new();

    assert!(!backend.do_remove("k", Scope::Workspace).unwrap());
    backend.do_store("k", "v", Scope::Workspace).unwrap();
    assert!(backend.do_remove("k", Scope::Workspace).unwrap());
    assert_eq!(backend.get("k", Scope::Workspace), None);
}

#[test]
fn test_memory_partitions_are_isolated() {
    let backend = InMemoryBackend::new();

    backend.do_store("k", "g", Scope::Global).unwrap();

    assert_eq!(backend.get("k", Scope::Workspace), None);
    assert_eq!(backend.entries(Scope::Global), vec![("k".to_string(), "g".to_string())]);
    assert!(backend.entries(Scope::Workspace).is_empty());
}

#[test]
fn test_memory_entries_sorted() {
    let backend = InMemoryBackend::new();

    for key in ["c", "a", "b"] {
        backend.do_store(key, key, Scope::Global).unwrap();
    }

    let keys: Vec<String> = backend.entries(Scope::Global).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_memory_flush_and_migrate_are_noops() {
    let backend = InMemoryBackend::new();
    backend.do_store("k", "v", Scope::Workspace).unwrap();

    backend.do_flush().unwrap();
    backend.migrate(&workspace("elsewhere")).unwrap();

    assert!(!backend.supports_migration());
    assert_eq!(backend.get("k", Scope::Workspace), Some("v".to_string()));
    assert_eq!(backend.get(IS_NEW_KEY, Scope::Global), None);
}

// =============================================================================
// File Backend Tests
// =============================================================================

#[test]
fn test_file_open_creates_layout() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("state");

    let backend = FileBackend::open(&data_dir, Some(&workspace("ws1"))).unwrap();
    backend.do_flush().unwrap();

    assert!(data_dir.join("global.json").is_file());
    assert!(data_dir.join("workspaces").join("ws1.json").is_file());
    assert_eq!(backend.data_dir(), data_dir.as_path());
}

#[test]
fn test_file_is_new_then_not_new() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), Some(&workspace("ws1"))).unwrap();
    assert_eq!(backend.get(IS_NEW_KEY, Scope::Global), Some("true".to_string()));
    assert_eq!(backend.get(IS_NEW_KEY, Scope::Workspace), Some("true".to_string()));
    backend.do_flush().unwrap();
    drop(backend);

    let reopened = FileBackend::open(temp.path(), Some(&workspace("ws1"))).unwrap();
    assert_eq!(reopened.get(IS_NEW_KEY, Scope::Global), Some("false".to_string()));
    assert_eq!(reopened.get(IS_NEW_KEY, Scope::Workspace), Some("false".to_string()));
}

#[test]
fn test_file_without_workspace_keeps_workspace_in_memory() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), None).unwrap();
    backend.do_store("k", "v", Scope::Workspace).unwrap();
    backend.do_flush().unwrap();

    assert_eq!(backend.get(IS_NEW_KEY, Scope::Workspace), None);
    assert!(!temp.path().join("workspaces").exists());
    assert_eq!(backend.locations().1, "in-memory");
}

#[test]
fn test_file_values_survive_reopen() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), Some(&workspace("ws1"))).unwrap();
    backend.do_store("g", "1", Scope::Global).unwrap();
    backend.do_store("w", "2", Scope::Workspace).unwrap();
    assert!(backend.is_dirty(Scope::Global));
    backend.do_flush().unwrap();
    assert!(!backend.is_dirty(Scope::Global));
    drop(backend);

    let reopened = FileBackend::open(temp.path(), Some(&workspace("ws1"))).unwrap();
    assert_eq!(reopened.get("g", Scope::Global), Some("1".to_string()));
    assert_eq!(reopened.get("w", Scope::Workspace), Some("2".to_string()));
}

#[test]
fn test_file_unflushed_writes_are_lost() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), None).unwrap();
    backend.do_flush().unwrap();
    backend.do_store("g", "1", Scope::Global).unwrap();
    drop(backend);

    let reopened = FileBackend::open(temp.path(), None).unwrap();
    assert_eq!(reopened.get("g", Scope::Global), None);
}

#[test]
fn test_file_equal_write_does_not_dirty() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), None).unwrap();
    backend.do_store("g", "1", Scope::Global).unwrap();
    backend.do_flush().unwrap();

    assert!(!backend.do_store("g", "1", Scope::Global).unwrap());
    assert!(!backend.is_dirty(Scope::Global));
    assert!(!backend.do_remove("missing", Scope::Global).unwrap());
    assert!(!backend.is_dirty(Scope::Global));
}

#[test]
fn test_file_rejects_unsafe_workspace_ids() {
    let temp = TempDir::new().unwrap();

    for id in ["", ".", "..", "../escape", "a/b", "with space"] {
        assert!(
            matches!(
                FileBackend::open(temp.path(), Some(&workspace(id))),
                Err(StorageError::InvalidWorkspace(_))
            ),
            "id {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_file_corrupt_partition_is_an_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("global.json"), "{not json").unwrap();

    assert!(matches!(
        FileBackend::open(temp.path(), None),
        Err(StorageError::Serialization(_))
    ));
}

#[test]
fn test_file_migrate_moves_workspace_only() {
    let temp = TempDir::new().unwrap();

    let backend = FileBackend::open(temp.path(), Some(&workspace("old"))).unwrap();
    backend.do_store("g", "global", Scope::Global).unwrap();
    backend.do_store("w", "local", Scope::Workspace).unwrap();

    assert!(backend.supports_migration());
    backend.migrate(&workspace("new")).unwrap();

    assert!(temp.path().join("workspaces").join("new.json").is_file());
    assert!(backend.locations().1.ends_with("new.json"));
    assert_eq!(backend.get("w", Scope::Workspace), Some("local".to_string()));
    drop(backend);

    let reopened = FileBackend::open(temp.path(), Some(&workspace("new"))).unwrap();
    assert_eq!(reopened.get("w", Scope::Workspace), Some("local".to_string()));
    assert_eq!(reopened.get("g", Scope::Global), Some("global".to_string()));
}

// =============================================================================
// Service over File Backend Tests
// =============================================================================

#[test]
fn test_service_file_round_trip_with_targets() {
    let temp = TempDir::new().unwrap();

    let service = StorageService::open(file_config(&temp, "ws1")).unwrap();
    assert!(service.is_new(Scope::Global));
    assert!(service.is_new(Scope::Workspace));
    service.store2("fontSize", 14, Scope::Workspace, Target::User).unwrap();
    service.store2("flag", true, Scope::Global, Target::Machine).unwrap();
    service.close().unwrap();

    let reopened = StorageService::open(file_config(&temp, "ws1")).unwrap();
    assert!(!reopened.is_new(Scope::Global));
    assert_eq!(reopened.get_number_or("fontSize", Scope::Workspace, 0.0), 14.0);
    assert!(reopened.get_boolean_or("flag", Scope::Global, false));
    assert_eq!(reopened.keys(Scope::Workspace, Target::User), vec!["fontSize"]);
    assert_eq!(reopened.keys(Scope::Global, Target::Machine), vec!["flag"]);
}

#[test]
fn test_service_shutdown_store_is_persisted() {
    let temp = TempDir::new().unwrap();

    let service = std::sync::Arc::new(StorageService::open(file_config(&temp, "ws1")).unwrap());
    let weak = std::sync::Arc::downgrade(&service);
    let _sub = service.on_will_save_state(move |_| {
        if let Some(service) = weak.upgrade() {
            service
                .store2("session", "saved", Scope::Workspace, Target::Machine)
                .unwrap();
        }
    });

    service.flush().unwrap();
    drop(_sub);
    drop(service);

    let reopened = StorageService::open(file_config(&temp, "ws1")).unwrap();
    assert_eq!(reopened.get("session", Scope::Workspace), Some("saved".to_string()));
}

#[test]
fn test_service_migrate_keeps_global() {
    let temp = TempDir::new().unwrap();

    let service = StorageService::open(file_config(&temp, "before")).unwrap();
    service.store2("w", "1", Scope::Workspace, Target::User).unwrap();
    service.store2("g", "2", Scope::Global, Target::User).unwrap();

    assert!(service.can_migrate());
    service.migrate(&workspace("after")).unwrap();
    service.close().unwrap();

    let reopened = StorageService::open(file_config(&temp, "after")).unwrap();
    assert_eq!(reopened.get("w", Scope::Workspace), Some("1".to_string()));
    assert_eq!(reopened.keys(Scope::Workspace, Target::User), vec!["w"]);
    assert_eq!(reopened.get("g", Scope::Global), Some("2".to_string()));
}
