//! # Region Store
//!
//! Regions created by the local federate, keyed by token. Extents are validated
//! against the object model before they reach the store, so every stored
//! extent satisfies `lower <= upper <= upper_bound`.

use crate::domain::object_model::SpaceInfo;
use crate::error::{KernelError, KernelResult};
use lrc_types::{DimensionHandle, Extent, Region, RegionToken};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RegionStore {
    regions: BTreeMap<RegionToken, Region>,
    next_token: u32,
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            next_token: 1,
        }
    }

    /// Create a region in `space` and return its token.
    pub fn create(
        &mut self,
        space: &SpaceInfo,
        extents: BTreeMap<DimensionHandle, Extent>,
    ) -> KernelResult<RegionToken> {
        space.validate_extents(&extents)?;

        let token = RegionToken(self.next_token);
        self.next_token += 1;
        self.regions.insert(
            token,
            Region {
                token,
                space: space.handle,
                extents,
            },
        );
        Ok(token)
    }

    /// Replace the extents of an existing region. Dimensions not named in
    /// `extents` keep their current range.
    pub fn modify(
        &mut self,
        token: RegionToken,
        space: &SpaceInfo,
        extents: BTreeMap<DimensionHandle, Extent>,
    ) -> KernelResult<()> {
        space.validate_extents(&extents)?;
        let region = self
            .regions
            .get_mut(&token)
            .ok_or(KernelError::RegionNotKnown { token })?;
        region.extents.extend(extents);
        Ok(())
    }

    pub fn delete(&mut self, token: RegionToken) -> KernelResult<Region> {
        self.regions
            .remove(&token)
            .ok_or(KernelError::RegionNotKnown { token })
    }

    pub fn get(&self, token: RegionToken) -> KernelResult<&Region> {
        self.regions
            .get(&token)
            .ok_or(KernelError::RegionNotKnown { token })
    }

    /// Snapshot the regions named by `tokens`, failing on the first unknown one.
    pub fn resolve(&self, tokens: &[RegionToken]) -> KernelResult<Vec<Region>> {
        tokens
            .iter()
            .map(|token| self.get(*token).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

/// Region filter of the delivery decision.
///
/// Passes when either side carries no regions. Otherwise at least one
/// subscriber region must overlap at least one publisher region.
///
/// Pairwise baseline: O(P x S x D) for P publisher regions, S subscriber
/// regions and D shared dimensions, stopping at the first disjoint dimension
/// of each pair and at the first overlapping pair.
#[must_use]
pub fn region_filter_passes(subscriber: &[Region], publisher: &[Region]) -> bool {
    if subscriber.is_empty() || publisher.is_empty() {
        return true;
    }
    subscriber
        .iter()
        .any(|ours| publisher.iter().any(|theirs| ours.overlaps(theirs)))
}
