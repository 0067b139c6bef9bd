//! # Interest Manager
//!
//! The local federate's publications and subscriptions, keyed by class.
//! Declaring an empty attribute set is the same as withdrawing the declaration.

use lrc_types::{AttributeHandle, InteractionClassHandle, ObjectClassHandle, RegionToken};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Class an interest query is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterestClass {
    Object(ObjectClassHandle),
    Interaction(InteractionClassHandle),
}

/// Active subscription to an object class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSubscription {
    pub attributes: BTreeSet<AttributeHandle>,
    /// Subscriber regions; empty means no spatial restriction.
    pub regions: Vec<RegionToken>,
}

/// Active subscription to an interaction class.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InteractionSubscription {
    pub regions: Vec<RegionToken>,
}

#[derive(Debug, Default)]
pub struct InterestManager {
    published_objects: HashMap<ObjectClassHandle, BTreeSet<AttributeHandle>>,
    subscribed_objects: HashMap<ObjectClassHandle, ObjectSubscription>,
    published_interactions: HashSet<InteractionClassHandle>,
    subscribed_interactions: HashMap<InteractionClassHandle, InteractionSubscription>,
}

impl InterestManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // OBJECT CLASSES
    // =========================================================================

    /// Replace the published attribute set of `class`.
    pub fn publish_object_class(
        &mut self,
        class: ObjectClassHandle,
        attributes: BTreeSet<AttributeHandle>,
    ) {
        if attributes.is_empty() {
            self.published_objects.remove(&class);
        } else {
            self.published_objects.insert(class, attributes);
        }
    }

    /// Returns false if the class was not published.
    pub fn unpublish_object_class(&mut self, class: ObjectClassHandle) -> bool {
        self.published_objects.remove(&class).is_some()
    }

    pub fn published_attributes(&self, class: ObjectClassHandle) -> Option<&BTreeSet<AttributeHandle>> {
        self.published_objects.get(&class)
    }

    /// Replace the subscription to `class`.
    pub fn subscribe_object_class(
        &mut self,
        class: ObjectClassHandle,
        attributes: BTreeSet<AttributeHandle>,
        regions: Vec<RegionToken>,
    ) {
        if attributes.is_empty() {
            self.subscribed_objects.remove(&class);
        } else {
            self.subscribed_objects
                .insert(class, ObjectSubscription { attributes, regions });
        }
    }

    pub fn unsubscribe_object_class(&mut self, class: ObjectClassHandle) -> bool {
        self.subscribed_objects.remove(&class).is_some()
    }

    pub fn object_subscription(&self, class: ObjectClassHandle) -> Option<&ObjectSubscription> {
        self.subscribed_objects.get(&class)
    }

    /// Subscribed attributes of `class` among `updated`. Empty when the class
    /// is not subscribed or the sets are disjoint.
    #[must_use]
    pub fn interested_attributes(
        &self,
        class: ObjectClassHandle,
        updated: &BTreeSet<AttributeHandle>,
    ) -> BTreeSet<AttributeHandle> {
        self.subscribed_objects
            .get(&class)
            .map(|sub| sub.attributes.intersection(updated).copied().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // INTERACTION CLASSES
    // =========================================================================

    pub fn publish_interaction_class(&mut self, class: InteractionClassHandle) {
        self.published_interactions.insert(class);
    }

    pub fn unpublish_interaction_class(&mut self, class: InteractionClassHandle) -> bool {
        self.published_interactions.remove(&class)
    }

    pub fn is_interaction_published(&self, class: InteractionClassHandle) -> bool {
        self.published_interactions.contains(&class)
    }

    pub fn subscribe_interaction_class(
        &mut self,
        class: InteractionClassHandle,
        regions: Vec<RegionToken>,
    ) {
        self.subscribed_interactions
            .insert(class, InteractionSubscription { regions });
    }

    pub fn unsubscribe_interaction_class(&mut self, class: InteractionClassHandle) -> bool {
        self.subscribed_interactions.remove(&class).is_some()
    }

    pub fn interaction_subscription(
        &self,
        class: InteractionClassHandle,
    ) -> Option<&InteractionSubscription> {
        self.subscribed_interactions.get(&class)
    }

    // =========================================================================
    // REGIONS
    // =========================================================================

    /// Whether any subscription references `token`.
    #[must_use]
    pub fn region_in_use(&self, token: RegionToken) -> bool {
        self.subscribed_objects
            .values()
            .any(|sub| sub.regions.contains(&token))
            || self
                .subscribed_interactions
                .values()
                .any(|sub| sub.regions.contains(&token))
    }

    /// Drop every declaration (used on resign).
    pub fn clear(&mut self) {
        self.published_objects.clear();
        self.subscribed_objects.clear();
        self.published_interactions.clear();
        self.subscribed_interactions.clear();
    }
}
