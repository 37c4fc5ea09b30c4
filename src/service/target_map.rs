//! Target map helper
//!
//! The target map is a JSON object `{"key": 0|1, ...}` stored under
//! `TARGET_KEY` in the partition it describes. It is always read and
//! rewritten as a whole.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{Scope, Target};

/// Decoded target map of one partition, in JSON object order
///
/// Values are kept as raw JSON so entries with an unknown ordinal survive a
/// rewrite; only `keys_for` interprets them.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct TargetMap {
    entries: Vec<(String, Value)>,
}

impl TargetMap {
    /// Decode the stored text; anything unreadable counts as empty
    pub fn parse(raw: Option<&str>, scope: Scope) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let object: Map<String, Value> = match serde_json::from_str(raw) {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!("Ignoring unreadable {} target map: {}", scope, e);
                return Self::default();
            }
        };

        Self {
            entries: object.into_iter().collect(),
        }
    }

    /// Record `target` for `key`; returns whether anything changed
    pub fn set(&mut self, key: &str, target: Target) -> bool {
        let value = Value::from(target.as_u8());
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) if *existing == value => false,
            Some((_, existing)) => {
                *existing = value;
                true
            }
            None => {
                self.entries.push((key.to_string(), value));
                true
            }
        }
    }

    /// Forget `key`; returns whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    /// Keys whose value is the ordinal of `target`; unknown values never match
    pub fn keys_for(&self, target: Target) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, value)| decode_target(value) == Some(target))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn encode(&self) -> Result<String> {
        let mut object = Map::new();
        for (key, value) in &self.entries {
            object.insert(key.clone(), value.clone());
        }
        Ok(serde_json::to_string(&Value::Object(object))?)
    }
}

fn decode_target(value: &Value) -> Option<Target> {
    let ordinal = u8::try_from(value.as_u64()?).ok()?;
    Target::try_from(ordinal).ok()
}
