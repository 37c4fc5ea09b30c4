//! JSON file backend
//!
//! Keeps each partition in an in-memory cache and writes it out as a JSON
//! object on flush.
//!
//! ## Layout
//! ```text
//! {data_dir}/
//!   ├── global.json
//!   └── workspaces/
//!       └── {workspace_id}.json
//! ```
//!
//! ## New-partition marker
//! On open, a partition whose file did not exist gets `IS_NEW_KEY = "true"`.
//! A partition that existed and still carries `"true"` from its first
//! session is flipped to `"false"`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::{Result, StorageError};
use crate::model::{Scope, WorkspaceIdentity, IS_NEW_KEY};

use super::StorageBackend;

/// One partition's cached contents and where they live on disk
struct FilePartition {
    items: BTreeMap<String, String>,

    /// `None` keeps the partition in memory (no workspace opened)
    path: Option<PathBuf>,

    /// Set by every accepted write, cleared by flush
    dirty: bool,
}

/// File-backed storage with one JSON file per partition
///
/// ## Concurrency:
/// - Each partition: RwLock around its cache
/// - `flush_lock`: serializes physical file writes (flush, migrate)
pub struct FileBackend {
    data_dir: PathBuf,
    global: RwLock<FilePartition>,
    workspace: RwLock<FilePartition>,
    flush_lock: Mutex<()>,
}

impl FileBackend {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const GLOBAL_FILENAME: &'static str = "global.json";
    const WORKSPACE_DIR: &'static str = "workspaces";

    /// Open or create storage in `data_dir`
    ///
    /// On startup:
    /// 1. Create the directory layout if it doesn't exist
    /// 2. Load global.json (and the workspace file, if a workspace is given)
    /// 3. Set the new-partition markers
    pub fn open(data_dir: &Path, workspace: Option<&WorkspaceIdentity>) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let global = Self::load_partition(Some(data_dir.join(Self::GLOBAL_FILENAME)))?;

        let workspace_path = match workspace {
            Some(identity) => {
                let path = Self::workspace_path(data_dir, identity)?;
                fs::create_dir_all(data_dir.join(Self::WORKSPACE_DIR))?;
                Some(path)
            }
            None => None,
        };
        let workspace = Self::load_partition(workspace_path)?;

        tracing::info!(
            "Opened file storage at {} ({} global, {} workspace entries)",
            data_dir.display(),
            global.items.len(),
            workspace.items.len()
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            global: RwLock::new(global),
            workspace: RwLock::new(workspace),
            flush_lock: Mutex::new(()),
        })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether a partition has writes not yet flushed
    pub fn is_dirty(&self, scope: Scope) -> bool {
        self.partition(scope).read().dirty
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn partition(&self, scope: Scope) -> &RwLock<FilePartition> {
        match scope {
            Scope::Global => &self.global,
            Scope::Workspace => &self.workspace,
        }
    }

    /// Read a partition file and set its new-partition marker
    fn load_partition(path: Option<PathBuf>) -> Result<FilePartition> {
        let Some(file_path) = path else {
            return Ok(FilePartition {
                items: BTreeMap::new(),
                path: None,
                dirty: false,
            });
        };

        let existed = file_path.is_file();
        let mut items: BTreeMap<String, String> = if existed {
            let contents = fs::read_to_string(&file_path)?;
            serde_json::from_str(&contents).map_err(|e| {
                StorageError::Serialization(format!("{}: {}", file_path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        let mut dirty = false;
        if !existed {
            items.insert(IS_NEW_KEY.to_string(), "true".to_string());
            dirty = true;
        } else if items.get(IS_NEW_KEY).map(String::as_str) == Some("true") {
            items.insert(IS_NEW_KEY.to_string(), "false".to_string());
            dirty = true;
        }

        Ok(FilePartition {
            items,
            path: Some(file_path),
            dirty,
        })
    }

    /// Write a dirty partition to disk (tmp file + rename)
    fn write_partition(partition: &mut FilePartition) -> Result<()> {
        if !partition.dirty {
            return Ok(());
        }

        if let Some(path) = &partition.path {
            let contents = serde_json::to_string_pretty(&partition.items)?;
            let tmp_path = path.with_extension("json.tmp");
            fs::write(&tmp_path, contents)?;
            fs::rename(&tmp_path, path)?;
            tracing::debug!("Wrote {} entries to {}", partition.items.len(), path.display());
        }

        partition.dirty = false;
        Ok(())
    }

    /// "{data_dir}/workspaces/{id}.json", rejecting ids unsafe as file names
    fn workspace_path(data_dir: &Path, workspace: &WorkspaceIdentity) -> Result<PathBuf> {
        let id = workspace.id();
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

        if !valid {
            return Err(StorageError::InvalidWorkspace(id.to_string()));
        }

        Ok(data_dir
            .join(Self::WORKSPACE_DIR)
            .join(format!("{}.json", id)))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str, scope: Scope) -> Option<String> {
        self.partition(scope).read().items.get(key).cloned()
    }

    fn do_store(&self, key: &str, value: &str, scope: Scope) -> Result<bool> {
        let mut partition = self.partition(scope).write();
        if partition.items.get(key).map(String::as_str) == Some(value) {
            return Ok(false);
        }

        partition.items.insert(key.to_string(), value.to_string());
        partition.dirty = true;
        Ok(true)
    }

    fn do_remove(&self, key: &str, scope: Scope) -> Result<bool> {
        let mut partition = self.partition(scope).write();
        if partition.items.remove(key).is_none() {
            return Ok(false);
        }

        partition.dirty = true;
        Ok(true)
    }

    fn do_flush(&self) -> Result<()> {
        let _flush_guard = self.flush_lock.lock();

        for scope in Scope::ALL {
            Self::write_partition(&mut self.partition(scope).write())?;
        }

        Ok(())
    }

    /// Flush, then point the workspace partition at the new identity's file
    /// and write the current workspace contents there
    fn migrate(&self, workspace: &WorkspaceIdentity) -> Result<()> {
        let new_path = Self::workspace_path(&self.data_dir, workspace)?;
        fs::create_dir_all(self.data_dir.join(Self::WORKSPACE_DIR))?;

        self.do_flush()?;

        let _flush_guard = self.flush_lock.lock();
        let mut partition = self.workspace.write();
        partition.path = Some(new_path);
        partition.dirty = true;
        Self::write_partition(&mut partition)?;

        tracing::info!(
            "Migrated {} workspace entries to {}",
            partition.items.len(),
            workspace
        );
        Ok(())
    }

    fn supports_migration(&self) -> bool {
        true
    }

    fn entries(&self, scope: Scope) -> Vec<(String, String)> {
        self.partition(scope)
            .read()
            .items
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn locations(&self) -> (String, String) {
        let label = |scope: Scope| match &self.partition(scope).read().path {
            Some(path) => path.display().to_string(),
            None => "in-memory".to_string(),
        };
        (label(Scope::Global), label(Scope::Workspace))
    }
}
