use serde_json::Value;
use std::collections::BTreeMap;

/// Accumulated baseline fields carried by a derived bridge instance.
///
/// Immutable once constructed: derived scopes get their own merged copy and
/// hold no back-reference to the parent, so a parent and its children can be
/// read by any number of threads without locking.
#[derive(Debug, Clone, Default)]
pub struct ScopedFields {
    entries: BTreeMap<String, Value>,
}

impl ScopedFields {
    pub fn new() -> Self {
        ScopedFields::default()
    }

    /// Copy-on-write extension: a fresh map equal to `self` with every entry
    /// of `extra` applied on top, the new value winning on key collision.
    /// The receiver is untouched.
    pub fn merged_with(&self, extra: BTreeMap<String, Value>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(extra);
        ScopedFields { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn to_map(&self) -> BTreeMap<String, Value> {
        self.entries.clone()
    }
}
