//! Handle/value maps carried by attribute updates and interactions.

use crate::handles::{AttributeHandle, ParameterHandle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Encoded values keyed by attribute or parameter handle.
///
/// Values are opaque byte buffers; encoding of application data is the
/// federate's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleValueMap<H: Eq + Hash> {
    values: HashMap<H, Vec<u8>>,
}

impl<H: Eq + Hash + Copy + Ord> HandleValueMap<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, handle: H, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(handle, value.into());
        self
    }

    pub fn insert(&mut self, handle: H, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.values.insert(handle, value.into())
    }

    /// Borrow the value mapped to `handle`, if any.
    #[must_use]
    pub fn value_ref(&self, handle: H) -> Option<&[u8]> {
        self.values.get(&handle).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.values.contains_key(&handle)
    }

    /// Handles present in the map, sorted.
    #[must_use]
    pub fn handles(&self) -> BTreeSet<H> {
        self.values.keys().copied().collect()
    }

    /// Keep only the entries whose handle is in `keep`.
    pub fn retain_handles(&mut self, keep: &BTreeSet<H>) {
        self.values.retain(|handle, _| keep.contains(handle));
    }

    /// Copy every entry of `other` into this map, overwriting on collision.
    pub fn merge(&mut self, other: &Self) {
        for (handle, value) in &other.values {
            self.values.insert(*handle, value.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&H, &Vec<u8>)> {
        self.values.iter()
    }
}

impl<H: Eq + Hash + Copy + Ord> Default for HandleValueMap<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Eq + Hash + Copy + Ord> FromIterator<(H, Vec<u8>)> for HandleValueMap<H> {
    fn from_iter<I: IntoIterator<Item = (H, Vec<u8>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Attribute values of one object instance update.
pub type AttributeValueMap = HandleValueMap<AttributeHandle>;

/// Parameter values of one interaction.
pub type ParameterValueMap = HandleValueMap<ParameterHandle>;
