//! Model Module
//!
//! The two classifications applied to every stored key, plus the
//! reserved keys and value conversions shared by every backend.
//!
//! ## Axes
//! - **Scope** selects the partition a key lives in (global vs workspace)
//! - **Target** is portability metadata (user vs machine), recorded in a
//!   per-partition target map rather than alongside the value
//!
//! ## Reserved Keys
//! Both partitions carry two metadata entries that share the key space with
//! caller data. Mutating them through the service is rejected.
//! ```text
//! __$__isNewStorageMarker   "true" | "false"       (set by the backend)
//! __$__targetStorageMarker  {"key": 0|1, ...}      (maintained by the service)
//! ```

mod scope;
mod value;

pub use scope::{Scope, Target, WillSaveStateReason, WorkspaceIdentity};
pub use value::StorableValue;

pub(crate) use value::{parse_bool, parse_leading_int};

/// Reserved boolean key marking a partition created during this session
pub const IS_NEW_KEY: &str = "__$__isNewStorageMarker";

/// Reserved key holding the JSON-encoded target map of a partition
pub const TARGET_KEY: &str = "__$__targetStorageMarker";

/// Whether `key` belongs to storage metadata rather than caller data
pub fn is_reserved_key(key: &str) -> bool {
    key == IS_NEW_KEY || key == TARGET_KEY
}
