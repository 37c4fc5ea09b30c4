//! Configuration for scopedkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::model::WorkspaceIdentity;

/// Main configuration for a storage service instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Which backend variant to open
    pub backend: BackendKind,

    /// Root directory for the file backend (ignored in memory)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── global.json          (global partition)
    ///     └── workspaces/
    ///         └── {id}.json        (one file per workspace)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Workspace Configuration
    // -------------------------------------------------------------------------
    /// Workspace whose partition is opened; `None` keeps the workspace
    /// partition in memory only
    pub workspace: Option<WorkspaceIdentity>,
}

/// Backend variants a service can be opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Non-durable two-partition map (tests, ephemeral sessions)
    InMemory,

    /// JSON files under `data_dir`
    File,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::InMemory,
            data_dir: PathBuf::from("./scopedkv_data"),
            workspace: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backend variant
    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend = kind;
        self
    }

    /// Set the data directory (root for the file backend)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the workspace identity
    pub fn workspace(mut self, workspace: WorkspaceIdentity) -> Self {
        self.config.workspace = Some(workspace);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
