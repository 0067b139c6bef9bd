//! Object model metadata as seen by the kernel.
//!
//! The object model itself is loaded and owned elsewhere; the kernel only reads
//! these records through the `ObjectModelProvider` port.

use crate::error::{KernelError, KernelResult};
use lrc_types::{
    AttributeHandle, DimensionHandle, Extent, InteractionClassHandle, ObjectClassHandle,
    ParameterHandle, SpaceHandle,
};
use std::collections::BTreeMap;

/// An object class and its declared attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectClassInfo {
    pub handle: ObjectClassHandle,
    pub name: String,
    pub attributes: BTreeMap<AttributeHandle, String>,
}

impl ObjectClassInfo {
    /// Attribute metadata, or `AttributeNotDefined`.
    pub fn attribute(&self, attribute: AttributeHandle) -> KernelResult<&str> {
        self.attributes
            .get(&attribute)
            .map(String::as_str)
            .ok_or(KernelError::AttributeNotDefined {
                class: self.handle,
                attribute,
            })
    }

    /// Fails on the first handle in `attributes` the class does not declare.
    pub fn check_attributes<'a>(
        &self,
        attributes: impl IntoIterator<Item = &'a AttributeHandle>,
    ) -> KernelResult<()> {
        for attribute in attributes {
            self.attribute(*attribute)?;
        }
        Ok(())
    }
}

/// An interaction class and its declared parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionClassInfo {
    pub handle: InteractionClassHandle,
    pub name: String,
    pub parameters: BTreeMap<ParameterHandle, String>,
}

impl InteractionClassInfo {
    pub fn check_parameters<'a>(
        &self,
        parameters: impl IntoIterator<Item = &'a ParameterHandle>,
    ) -> KernelResult<()> {
        for parameter in parameters {
            if !self.parameters.contains_key(parameter) {
                return Err(KernelError::ParameterNotDefined {
                    class: self.handle,
                    parameter: *parameter,
                });
            }
        }
        Ok(())
    }
}

/// One axis of a routing space. Legal values are `[0, upper_bound]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionInfo {
    pub handle: DimensionHandle,
    pub name: String,
    pub upper_bound: u64,
}

/// A routing space and its dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceInfo {
    pub handle: SpaceHandle,
    pub name: String,
    pub dimensions: BTreeMap<DimensionHandle, DimensionInfo>,
}

impl SpaceInfo {
    /// Check every extent names a dimension of this space and lies within
    /// `lower <= upper <= upper_bound`.
    pub fn validate_extents(&self, extents: &BTreeMap<DimensionHandle, Extent>) -> KernelResult<()> {
        for (dimension, extent) in extents {
            let info = self
                .dimensions
                .get(dimension)
                .ok_or(KernelError::DimensionNotDefined {
                    space: self.handle,
                    dimension: *dimension,
                })?;

            if extent.lower > extent.upper || extent.upper > info.upper_bound {
                return Err(KernelError::InvalidRangeBound {
                    dimension: *dimension,
                    lower: extent.lower,
                    upper: extent.upper,
                    bound: info.upper_bound,
                });
            }
        }
        Ok(())
    }
}
