//! In-memory reference backend
//!
//! Two independent HashMaps behind RwLocks. Nothing is durable, so flush
//! and migrate complete immediately and no partition is ever "new".

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::model::{Scope, WorkspaceIdentity};

use super::StorageBackend;

/// Non-durable two-partition backend
#[derive(Default)]
pub struct InMemoryBackend {
    global: RwLock<HashMap<String, String>>,
    workspace: RwLock<HashMap<String, String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, scope: Scope) -> &RwLock<HashMap<String, String>> {
        match scope {
            Scope::Global => &self.global,
            Scope::Workspace => &self.workspace,
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, key: &str, scope: Scope) -> Option<String> {
        self.partition(scope).read().get(key).cloned()
    }

    fn do_store(&self, key: &str, value: &str, scope: Scope) -> Result<bool> {
        let mut items = self.partition(scope).write();
        if items.get(key).map(String::as_str) == Some(value) {
            return Ok(false);
        }

        items.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn do_remove(&self, key: &str, scope: Scope) -> Result<bool> {
        Ok(self.partition(scope).write().remove(key).is_some())
    }

    fn do_flush(&self) -> Result<()> {
        Ok(())
    }

    fn migrate(&self, workspace: &WorkspaceIdentity) -> Result<()> {
        tracing::debug!("In-memory backend ignores migrate to {}", workspace);
        Ok(())
    }

    fn entries(&self, scope: Scope) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .partition(scope)
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }

    fn locations(&self) -> (String, String) {
        ("in-memory".to_string(), "in-memory".to_string())
    }
}
