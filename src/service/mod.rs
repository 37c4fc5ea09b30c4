//! Service Module
//!
//! The storage service that sits between callers and a backend.
//!
//! ## Responsibilities
//! - Typed access (text, boolean, number) with fallbacks
//! - Maintain the per-partition target map alongside every write/remove
//! - Emit change events only for writes that changed backend state
//! - Derive target-change events from changes to the target map entry
//! - Broadcast will-save-state before every flush

mod target_map;

use parking_lot::ReentrantMutex;

use crate::backend::{FileBackend, InMemoryBackend, StorageBackend};
use crate::config::{BackendKind, Config};
use crate::diagnostics::StorageReport;
use crate::error::{Result, StorageError};
use crate::event::{
    Emitter, StorageChangeEvent, Subscription, TargetChangeEvent, WillSaveStateEvent,
};
use crate::model::{
    is_reserved_key, parse_bool, parse_leading_int, Scope, StorableValue, Target,
    WillSaveStateReason, WorkspaceIdentity, IS_NEW_KEY, TARGET_KEY,
};

use target_map::TargetMap;

/// Scoped key-value storage with target tracking and change events
///
/// ## Concurrency Model
///
/// - **Reads** go straight to the backend (backend-internal locks only)
/// - **Writes** (store/store2/remove) are serialized by `write_lock` so the
///   value write and the target map read-modify-write form one unit
///   - The lock is re-entrant: a change listener may write back into the
///     service on the same thread
/// - **Flush** takes no service lock; will-save listeners run first and may
///   store freely, then the backend flushes
pub struct StorageService {
    /// Raw partitions
    backend: Box<dyn StorageBackend>,

    on_did_change_storage: Emitter<StorageChangeEvent>,
    on_did_change_target: Emitter<TargetChangeEvent>,
    on_will_save_state: Emitter<WillSaveStateEvent>,

    /// Serializes write operations (value + target map)
    write_lock: ReentrantMutex<()>,

    /// Turns changes of `TARGET_KEY` into target-change events
    _target_forwarder: Subscription,
}

impl StorageService {
    /// Create a service over any backend
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        let on_did_change_storage: Emitter<StorageChangeEvent> = Emitter::new();
        let on_did_change_target: Emitter<TargetChangeEvent> = Emitter::new();

        let forward_to = on_did_change_target.clone();
        let target_forwarder = on_did_change_storage.subscribe(move |event: &StorageChangeEvent| {
            if event.key == TARGET_KEY {
                forward_to.fire(&TargetChangeEvent { scope: event.scope });
            }
        });

        Self {
            backend: Box::new(backend),
            on_did_change_storage,
            on_did_change_target,
            on_will_save_state: Emitter::new(),
            write_lock: ReentrantMutex::new(()),
            _target_forwarder: target_forwarder,
        }
    }

    /// Service over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(InMemoryBackend::new())
    }

    /// Open the backend named by `config`
    pub fn open(config: Config) -> Result<Self> {
        let service = match config.backend {
            BackendKind::InMemory => Self::in_memory(),
            BackendKind::File => {
                if config.data_dir.as_os_str().is_empty() {
                    return Err(StorageError::Config(
                        "file backend requires a data directory".to_string(),
                    ));
                }
                Self::new(FileBackend::open(&config.data_dir, config.workspace.as_ref())?)
            }
        };

        tracing::info!("Storage service opened with {:?} backend", config.backend);
        Ok(service)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Notified after a value actually changed
    pub fn on_did_change_storage<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StorageChangeEvent) + Send + Sync + 'static,
    {
        self.on_did_change_storage.subscribe(listener)
    }

    /// Notified after a partition's target map changed
    pub fn on_did_change_target<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TargetChangeEvent) + Send + Sync + 'static,
    {
        self.on_did_change_target.subscribe(listener)
    }

    /// Notified before every flush; stores made here are flushed too
    pub fn on_will_save_state<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&WillSaveStateEvent) + Send + Sync + 'static,
    {
        self.on_will_save_state.subscribe(listener)
    }

    // =========================================================================
    // Typed Reads
    // =========================================================================

    /// Stored text, or `None` if absent
    pub fn get(&self, key: &str, scope: Scope) -> Option<String> {
        self.backend.get(key, scope)
    }

    pub fn get_or(&self, key: &str, scope: Scope, fallback: &str) -> String {
        self.get(key, scope).unwrap_or_else(|| fallback.to_string())
    }

    /// `Some(true)` only for the exact text "true"; any other text is false
    pub fn get_boolean(&self, key: &str, scope: Scope) -> Option<bool> {
        self.get(key, scope).map(|text| parse_bool(&text))
    }

    pub fn get_boolean_or(&self, key: &str, scope: Scope, fallback: bool) -> bool {
        self.get_boolean(key, scope).unwrap_or(fallback)
    }

    /// Leading base-10 integer of the stored text
    ///
    /// Present but non-numeric text yields `Some(NaN)`, not the fallback.
    pub fn get_number(&self, key: &str, scope: Scope) -> Option<f64> {
        self.get(key, scope).map(|text| parse_leading_int(&text))
    }

    pub fn get_number_or(&self, key: &str, scope: Scope, fallback: f64) -> f64 {
        self.get_number(key, scope).unwrap_or(fallback)
    }

    /// Keys recorded in the partition's target map with `target`, in map
    /// order
    pub fn keys(&self, scope: Scope, target: Target) -> Vec<String> {
        self.load_targets(scope).keys_for(target)
    }

    /// Whether the backend created this partition during this session
    pub fn is_new(&self, scope: Scope) -> bool {
        self.get_boolean_or(IS_NEW_KEY, scope, false)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store with `Target::Machine`
    #[deprecated(note = "use store2 and pass an explicit target")]
    pub fn store<V: StorableValue>(&self, key: &str, value: V, scope: Scope) -> Result<()> {
        self.store2(key, value, scope, Target::Machine)
    }

    /// Store `value` under `key` and record its target
    ///
    /// A `None` value removes the key instead.
    pub fn store2<V: StorableValue>(
        &self,
        key: &str,
        value: V,
        scope: Scope,
        target: Target,
    ) -> Result<()> {
        Self::check_key(key)?;

        let Some(text) = value.into_stored_text() else {
            return self.remove(key, scope);
        };

        let _write_guard = self.write_lock.lock();
        self.store_raw(key, &text, scope)?;
        self.update_target(key, scope, Some(target))
    }

    /// Remove `key` and forget its target
    pub fn remove(&self, key: &str, scope: Scope) -> Result<()> {
        Self::check_key(key)?;

        let _write_guard = self.write_lock.lock();
        if self.backend.do_remove(key, scope)? {
            tracing::debug!(key, %scope, "removed");
            self.on_did_change_storage.fire(&StorageChangeEvent {
                key: key.to_string(),
                scope,
            });
        }
        self.update_target(key, scope, None)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Broadcast will-save-state, then flush the backend
    pub fn flush(&self) -> Result<()> {
        self.flush_with_reason(WillSaveStateReason::None)
    }

    /// Move workspace data to `workspace`
    ///
    /// Completes as a no-op on backends without migration support; use
    /// `can_migrate` to tell the two apart.
    pub fn migrate(&self, workspace: &WorkspaceIdentity) -> Result<()> {
        if !self.backend.supports_migration() {
            tracing::debug!("Backend does not support migration, ignoring {}", workspace);
            return Ok(());
        }

        self.flush()?;
        self.backend.migrate(workspace)?;
        tracing::info!("Workspace storage migrated to {}", workspace);
        Ok(())
    }

    pub fn can_migrate(&self) -> bool {
        self.backend.supports_migration()
    }

    /// Assemble a report of both partitions and log it
    pub fn log_storage(&self) -> StorageReport {
        let (global_label, workspace_label) = self.backend.locations();
        let report = StorageReport::new(
            global_label,
            workspace_label,
            self.backend.entries(Scope::Global),
            self.backend.entries(Scope::Workspace),
        );

        tracing::info!("\n{}", report);
        report
    }

    /// Final flush with `Shutdown` reason, then release all listeners
    pub fn close(self) -> Result<()> {
        self.flush_with_reason(WillSaveStateReason::Shutdown)?;
        self.dispose();
        Ok(())
    }

    /// Release all listeners; later events reach nobody
    pub fn dispose(&self) {
        self.on_did_change_storage.dispose();
        self.on_did_change_target.dispose();
        self.on_will_save_state.dispose();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Underlying backend (bypasses target tracking and events)
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_key(key: &str) -> Result<()> {
        if is_reserved_key(key) {
            return Err(StorageError::ReservedKey(key.to_string()));
        }
        Ok(())
    }

    fn flush_with_reason(&self, reason: WillSaveStateReason) -> Result<()> {
        self.on_will_save_state.fire(&WillSaveStateEvent { reason });
        self.backend.do_flush()?;
        tracing::debug!(?reason, "flushed");
        Ok(())
    }

    /// Backend write plus change event when state actually changed
    fn store_raw(&self, key: &str, text: &str, scope: Scope) -> Result<()> {
        if self.backend.do_store(key, text, scope)? {
            tracing::debug!(key, %scope, "stored");
            self.on_did_change_storage.fire(&StorageChangeEvent {
                key: key.to_string(),
                scope,
            });
        }
        Ok(())
    }

    fn load_targets(&self, scope: Scope) -> TargetMap {
        TargetMap::parse(self.backend.get(TARGET_KEY, scope).as_deref(), scope)
    }

    /// Set (`Some`) or clear (`None`) the target of `key`, persisting the
    /// target map only if it changed
    fn update_target(&self, key: &str, scope: Scope, target: Option<Target>) -> Result<()> {
        let mut targets = self.load_targets(scope);
        let changed = match target {
            Some(target) => targets.set(key, target),
            None => targets.remove(key),
        };

        if changed {
            self.store_raw(TARGET_KEY, &targets.encode()?, scope)?;
        }
        Ok(())
    }
}

impl Drop for StorageService {
    fn drop(&mut self) {
        self.dispose();
    }
}
