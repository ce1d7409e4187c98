//! Keyed storage shared by the GPIO and SPI registries.

use std::collections::BTreeMap;

use crate::error::WiringError;
use crate::key::ResourceKey;

/// Outcome of a registry-wide sweep
#[derive(Debug, Default)]
pub struct Sweep {
    /// Entries removed from the registry
    pub removed: usize,
    /// Kernel calls that failed while removing them
    pub failures: Vec<WiringError>,
}

/// Live entries indexed by [`ResourceKey`]
///
/// An entry exists exactly while the resource it wraps is held. The map is
/// unsynchronised; callers serialise access through `&mut`.
#[derive(Debug)]
pub struct Registry<V> {
    entries: BTreeMap<ResourceKey, V>,
}

impl<V> Registry<V> {
    /// Create a new empty registry
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &ResourceKey) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `value`, handing back whatever it replaced.
    pub fn insert(&mut self, key: ResourceKey, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &ResourceKey) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all live entries, in key order.
    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.entries.keys().copied()
    }

    /// Removes every entry, in key order.
    pub fn drain(&mut self) -> impl Iterator<Item = (ResourceKey, V)> {
        core::mem::take(&mut self.entries).into_iter()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}
