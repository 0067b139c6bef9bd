//! In-memory object model
//!
//! Implements the `ObjectModelProvider` port over maps built once with
//! `ObjectModelBuilder`. Handles are assigned in declaration order, starting
//! at 1 for each kind.

use crate::domain::{DimensionInfo, InteractionClassInfo, ObjectClassInfo, SpaceInfo};
use crate::ports::outbound::ObjectModelProvider;
use lrc_types::{
    AttributeHandle, DimensionHandle, InteractionClassHandle, ObjectClassHandle, ParameterHandle,
    SpaceHandle,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct InMemoryObjectModel {
    object_classes: HashMap<ObjectClassHandle, ObjectClassInfo>,
    interaction_classes: HashMap<InteractionClassHandle, InteractionClassInfo>,
    spaces: HashMap<SpaceHandle, SpaceInfo>,
}

impl InMemoryObjectModel {
    #[must_use]
    pub fn builder() -> ObjectModelBuilder {
        ObjectModelBuilder::default()
    }

    /// Look up an object class handle by name.
    pub fn object_class_handle(&self, name: &str) -> Option<ObjectClassHandle> {
        self.object_classes
            .values()
            .find(|info| info.name == name)
            .map(|info| info.handle)
    }

    pub fn interaction_class_handle(&self, name: &str) -> Option<InteractionClassHandle> {
        self.interaction_classes
            .values()
            .find(|info| info.name == name)
            .map(|info| info.handle)
    }
}

impl ObjectModelProvider for InMemoryObjectModel {
    fn object_class(&self, class: ObjectClassHandle) -> Option<ObjectClassInfo> {
        self.object_classes.get(&class).cloned()
    }

    fn interaction_class(&self, class: InteractionClassHandle) -> Option<InteractionClassInfo> {
        self.interaction_classes.get(&class).cloned()
    }

    fn space(&self, space: SpaceHandle) -> Option<SpaceInfo> {
        self.spaces.get(&space).cloned()
    }
}

/// Declares classes and spaces of an `InMemoryObjectModel`.
#[derive(Debug, Default)]
pub struct ObjectModelBuilder {
    model: InMemoryObjectModel,
    next_dimension: u32,
}

impl ObjectModelBuilder {
    /// Declare an object class with named attributes (handles 1..=n).
    #[must_use]
    pub fn object_class(mut self, name: &str, attributes: &[&str]) -> Self {
        let handle = ObjectClassHandle(self.model.object_classes.len() as u32 + 1);
        let attributes = attributes
            .iter()
            .zip(1u32..)
            .map(|(attr, i)| (AttributeHandle(i), (*attr).to_string()))
            .collect();
        self.model.object_classes.insert(
            handle,
            ObjectClassInfo {
                handle,
                name: name.to_string(),
                attributes,
            },
        );
        self
    }

    /// Declare an interaction class with named parameters (handles 1..=n).
    #[must_use]
    pub fn interaction_class(mut self, name: &str, parameters: &[&str]) -> Self {
        let handle = InteractionClassHandle(self.model.interaction_classes.len() as u32 + 1);
        let parameters = parameters
            .iter()
            .zip(1u32..)
            .map(|(param, i)| (ParameterHandle(i), (*param).to_string()))
            .collect();
        self.model.interaction_classes.insert(
            handle,
            InteractionClassInfo {
                handle,
                name: name.to_string(),
                parameters,
            },
        );
        self
    }

    /// Declare a routing space. Dimension handles are unique across spaces.
    #[must_use]
    pub fn space(mut self, name: &str, dimensions: &[(&str, u64)]) -> Self {
        let handle = SpaceHandle(self.model.spaces.len() as u32 + 1);
        let mut declared = BTreeMap::new();
        for (dimension, upper_bound) in dimensions {
            self.next_dimension += 1;
            let dimension_handle = DimensionHandle(self.next_dimension);
            declared.insert(
                dimension_handle,
                DimensionInfo {
                    handle: dimension_handle,
                    name: (*dimension).to_string(),
                    upper_bound: *upper_bound,
                },
            );
        }
        self.model.spaces.insert(
            handle,
            SpaceInfo {
                handle,
                name: name.to_string(),
                dimensions: declared,
            },
        );
        self
    }

    #[must_use]
    pub fn build(self) -> InMemoryObjectModel {
        self.model
    }
}
