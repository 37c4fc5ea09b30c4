//! Scope, target and save-reason enumerations
//!
//! Ordinals are persisted (the target map stores `Target` as a number) and
//! must stay stable.

use std::fmt;

/// Partition a key is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Scope {
    /// Shared across all workspaces
    Global = 0,

    /// Local to the currently opened workspace
    Workspace = 1,
}

/// Intended portability of a stored key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Target {
    /// Follows the user across machines
    User = 0,

    /// Specific to this machine
    Machine = 1,
}

/// Why a will-save-state broadcast was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WillSaveStateReason {
    /// Ordinary flush
    None = 0,

    /// The host is shutting down; this is the last chance to store state
    Shutdown = 1,
}

macro_rules! ordinal_conversions {
    ($ty:ident { $($ordinal:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            /// Stable numeric ordinal
            pub fn as_u8(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $ty {
            type Error = u8;

            fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
                match value {
                    $($ordinal => Ok($ty::$variant),)+
                    other => Err(other),
                }
            }
        }
    };
}

ordinal_conversions!(Scope { 0 => Global, 1 => Workspace });
ordinal_conversions!(Target { 0 => User, 1 => Machine });
ordinal_conversions!(WillSaveStateReason { 0 => None, 1 => Shutdown });

impl Scope {
    /// Both partitions, in ordinal order
    pub const ALL: [Scope; 2] = [Scope::Global, Scope::Workspace];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Workspace => write!(f, "workspace"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User => write!(f, "user"),
            Target::Machine => write!(f, "machine"),
        }
    }
}

/// Opaque identity of a workspace, handed in by the host
///
/// Backends decide what the identity maps to; the file backend uses it as a
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceIdentity {
    id: String,
}

impl WorkspaceIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for WorkspaceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
