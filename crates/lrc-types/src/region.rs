//! # Regions
//!
//! A region is a set of per-dimension extents inside one routing space. Regions
//! travel with updates and interactions as snapshots so that a receiving
//! federate can test them against its own subscription regions.

use crate::handles::{DimensionHandle, RegionToken, SpaceHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-open range `[lower, upper)` along one dimension.
///
/// A degenerate extent (`lower == upper`) denotes the single point `lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub lower: u64,
    pub upper: u64,
}

impl Extent {
    #[must_use]
    pub const fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }

    #[must_use]
    pub const fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    /// Whether `value` lies inside this extent.
    #[must_use]
    pub const fn contains(&self, value: u64) -> bool {
        if self.is_point() {
            value == self.lower
        } else {
            self.lower <= value && value < self.upper
        }
    }

    /// Symmetric intersection test.
    #[must_use]
    pub const fn overlaps(&self, other: &Extent) -> bool {
        match (self.is_point(), other.is_point()) {
            (true, true) => self.lower == other.lower,
            (true, false) => other.contains(self.lower),
            (false, true) => self.contains(other.lower),
            (false, false) => self.lower < other.upper && other.lower < self.upper,
        }
    }
}

/// Snapshot of a region: its space and the extent on each of its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub token: RegionToken,
    pub space: SpaceHandle,
    pub extents: BTreeMap<DimensionHandle, Extent>,
}

impl Region {
    #[must_use]
    pub fn new(token: RegionToken, space: SpaceHandle) -> Self {
        Self {
            token,
            space,
            extents: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_extent(mut self, dimension: DimensionHandle, extent: Extent) -> Self {
        self.extents.insert(dimension, extent);
        self
    }

    #[must_use]
    pub fn extent(&self, dimension: DimensionHandle) -> Option<&Extent> {
        self.extents.get(&dimension)
    }

    /// Two regions overlap iff their extents intersect on every dimension they
    /// share. Regions with no dimension in common overlap vacuously.
    ///
    /// Walks the smaller extent map and stops at the first disjoint dimension.
    #[must_use]
    pub fn overlaps(&self, other: &Region) -> bool {
        let (small, large) = if self.extents.len() <= other.extents.len() {
            (self, other)
        } else {
            (other, self)
        };

        small.extents.iter().all(|(dimension, extent)| {
            large
                .extents
                .get(dimension)
                .map_or(true, |theirs| extent.overlaps(theirs))
        })
    }
}
