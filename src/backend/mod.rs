//! Backend Module
//!
//! Raw key-value partitions underneath the storage service.
//!
//! ## Responsibilities
//! - Hold the text value of every key, per scope
//! - Report whether a primitive write actually changed anything
//! - Persist state on flush (durable variants only)
//! - Re-home workspace data on migrate (where supported)
//!
//! Backends know nothing about targets or events. The service derives both
//! from the change flag returned by `do_store` / `do_remove`.
//!
//! ## Variants
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ InMemoryBackend  │ two HashMaps, flush/migrate are no-ops       │
//! │ FileBackend      │ global.json + workspaces/{id}.json           │
//! └──────────────────┴──────────────────────────────────────────────┘
//! ```

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::InMemoryBackend;

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Scope, WorkspaceIdentity};

/// Primitive operations a backend must provide
///
/// Each call must be atomic on its own; the service serializes compound
/// updates (value + target map) itself.
pub trait StorageBackend: Send + Sync {
    /// Raw text stored for `key`, if any
    fn get(&self, key: &str, scope: Scope) -> Option<String>;

    /// Set `key` to `value`; returns `false` when the text was already equal
    fn do_store(&self, key: &str, value: &str, scope: Scope) -> Result<bool>;

    /// Remove `key`; returns `false` when it was absent
    fn do_remove(&self, key: &str, scope: Scope) -> Result<bool>;

    /// Make all accepted writes durable
    fn do_flush(&self) -> Result<()>;

    /// Move workspace-scoped data to `workspace`
    fn migrate(&self, workspace: &WorkspaceIdentity) -> Result<()>;

    /// Whether `migrate` does anything
    fn supports_migration(&self) -> bool {
        false
    }

    /// Snapshot of a partition, sorted by key
    fn entries(&self, scope: Scope) -> Vec<(String, String)>;

    /// Display labels for the global and workspace partitions
    fn locations(&self) -> (String, String);
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn get(&self, key: &str, scope: Scope) -> Option<String> {
        (**self).get(key, scope)
    }

    fn do_store(&self, key: &str, value: &str, scope: Scope) -> Result<bool> {
        (**self).do_store(key, value, scope)
    }

    fn do_remove(&self, key: &str, scope: Scope) -> Result<bool> {
        (**self).do_remove(key, scope)
    }

    fn do_flush(&self) -> Result<()> {
        (**self).do_flush()
    }

    fn migrate(&self, workspace: &WorkspaceIdentity) -> Result<()> {
        (**self).migrate(workspace)
    }

    fn supports_migration(&self) -> bool {
        (**self).supports_migration()
    }

    fn entries(&self, scope: Scope) -> Vec<(String, String)> {
        (**self).entries(scope)
    }

    fn locations(&self) -> (String, String) {
        (**self).locations()
    }
}
