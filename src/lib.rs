//! # scopedkv
//!
//! Scoped key-value storage for small pieces of application state with:
//! - Two partitions per key space (global / workspace)
//! - Per-key target metadata (user / machine)
//! - Change notifications derived from actual state changes
//! - A flush protocol that lets listeners store state right before saving
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Callers                             │
//! │        get / store2 / remove / keys / flush / migrate        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    StorageService                            │
//! │   typed access · target map · events · will-save broadcast   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  InMemory   │          │    File     │
//!   │  Backend    │          │   Backend   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod event;
pub mod backend;
pub mod diagnostics;
pub mod service;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StorageError, Result};
pub use config::{BackendKind, Config};
pub use model::{Scope, StorableValue, Target, WillSaveStateReason, WorkspaceIdentity};
pub use service::StorageService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of scopedkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
