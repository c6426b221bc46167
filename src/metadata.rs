use serde_json::{Map, Value};

use crate::types::FieldName;

pub use crate::constants::sidecar::{FIELD_SIGNATURE_ID, FIELD_SORT};

/// Canonical name of a whitelisted sidecar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldKey {
    name: FieldName,
}

impl FieldKey {
    /// Create a field key with a canonical static name.
    pub const fn new(name: FieldName) -> Self {
        Self { name }
    }

    /// Return the raw key name.
    pub const fn as_str(&self) -> FieldName {
        self.name
    }

    /// Build a single-key sidecar entry (for example `{"sort": 2}`).
    pub fn entry(&self, value: Value) -> Map<String, Value> {
        let mut entry = Map::new();
        entry.insert(self.name.to_string(), value);
        entry
    }

    /// Return the value of `entry` when its leading key is this field.
    ///
    /// Sidecar entries are keyed by their first key; a multi-key header entry
    /// never shadows a later single-key field entry.
    pub fn value_in<'a>(&self, entry: &'a Map<String, Value>) -> Option<&'a Value> {
        let (key, value) = entry.iter().next()?;
        (key == self.name).then_some(value)
    }
}
