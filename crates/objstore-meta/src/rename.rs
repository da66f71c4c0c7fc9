//! Class rename map: lets stored data survive class renames without a migration script.

use std::collections::HashMap;

/// The outcome of resolving a stored class name during rehydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassResolution {
    /// The class name is used as stored.
    Known(String),
    /// The rename map mapped the stored name to a new one.
    Renamed(String),
    /// Neither the stored name nor a rename entry apply; the caller
    /// should fall back to a `Placeholder`.
    Unknown,
}

/// Maps `old_class -> new_class`, consulted during rehydration before instantiation.
#[derive(Debug, Clone, Default)]
pub struct ClassRenameMap {
    renames: HashMap<String, String>,
}

impl ClassRenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old_class: impl Into<String>, new_class: impl Into<String>) {
        self.renames.insert(old_class.into(), new_class.into());
    }

    /// Resolve a stored class name.
    ///
    /// `known_classes` is the set of classes the caller can actually
    /// instantiate; a name outside it with no rename entry resolves
    /// to [`ClassResolution::Unknown`].
    pub fn resolve(&self, stored_class: &str, known_classes: &dyn Fn(&str) -> bool) -> ClassResolution {
        if let Some(renamed) = self.renames.get(stored_class) {
            return ClassResolution::Renamed(renamed.clone());
        }
        if known_classes(stored_class) {
            ClassResolution::Known(stored_class.to_string())
        } else {
            ClassResolution::Unknown
        }
    }
}
