//! Event Module
//!
//! The three notification streams exposed by the storage service.
//!
//! ## Streams
//! - `StorageChangeEvent`: a value in a partition actually changed
//! - `TargetChangeEvent`: a partition's target map entry changed
//! - `WillSaveStateEvent`: a flush is about to capture state
//!
//! Delivery is synchronous and in subscription order. No emitter lock is
//! held while listeners run, so a listener may write back into storage.

mod emitter;

pub use emitter::{Emitter, Listener, Subscription};

use crate::model::{Scope, WillSaveStateReason};

/// A value was written or removed and the backend state changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChangeEvent {
    pub key: String,
    pub scope: Scope,
}

/// The target map of a partition changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetChangeEvent {
    pub scope: Scope,
}

/// Sent to every subscriber before a flush begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WillSaveStateEvent {
    pub reason: WillSaveStateReason,
}
