//! Access-control name lists
//!
//! Blacklist and whitelist share one shape: a set of stream names plus an
//! enable flag. Matching is by stream name only (the final path segment),
//! never by app.

use std::collections::HashSet;

/// One access-control list (used for both blacklist and whitelist)
#[derive(Debug, Default)]
pub struct AccessList {
    names: HashSet<String>,
    enabled: bool,
}

impl AccessList {
    /// Create an empty, disabled list
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the list
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the list is currently enforced
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Add a name; returns false if it was already present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Remove a name; returns false if it was not present
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Whether the list contains a name
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names in the list
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the list holds no names
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Blacklist semantics: deny when enabled and the name is listed
    pub fn denies(&self, name: &str) -> bool {
        self.enabled && self.names.contains(name)
    }

    /// Whitelist semantics: deny when enabled and the name is not listed
    pub fn excludes(&self, name: &str) -> bool {
        self.enabled && !self.names.contains(name)
    }
}
