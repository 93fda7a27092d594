//! Ordered cache of registered tool entries.

use crate::tool_bridge::domain::RegisteredToolEntry;
use thiserror::Error;

/// Errors raised while filling a [`DescriptorCache`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorCacheError {
    /// Another entry already uses this exposed name.
    #[error("tool name {0} is already registered")]
    DuplicateExposedName(String),
}

/// Registered tool entries in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorCache {
    entries: Vec<RegisteredToolEntry>,
}

impl DescriptorCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry, keeping discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorCacheError::DuplicateExposedName`] when the
    /// exposed name is already cached.
    pub fn append(&mut self, entry: RegisteredToolEntry) -> Result<(), DescriptorCacheError> {
        if self.contains(entry.exposed_name()) {
            return Err(DescriptorCacheError::DuplicateExposedName(
                entry.exposed_name().to_owned(),
            ));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Returns whether an entry with `exposed_name` is cached.
    #[must_use]
    pub fn contains(&self, exposed_name: &str) -> bool {
        self.get(exposed_name).is_some()
    }

    /// Looks up an entry by exposed name.
    #[must_use]
    pub fn get(&self, exposed_name: &str) -> Option<&RegisteredToolEntry> {
        self.entries
            .iter()
            .find(|entry| entry.exposed_name() == exposed_name)
    }

    /// Returns all entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[RegisteredToolEntry] {
        &self.entries
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
