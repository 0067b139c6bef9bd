//! # LRC Shared Types
//!
//! Vocabulary shared between the local coordination kernel and its
//! collaborators (transport, object model, federation coordinator).
//!
//! ## Contents
//!
//! - **Handles**: typed ids for federates, classes, attributes, regions, ...
//! - **Logical time**: `LogicalTime` and `LogicalInterval` (lookahead)
//! - **Messages**: `Message` header + `Payload`, with the derived `MessageKind`
//! - **Values**: attribute/parameter handle-value maps
//! - **Regions**: per-dimension extents and the overlap predicate

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod handles;
pub mod message;
pub mod region;
pub mod time;
pub mod values;

pub use handles::{
    AttributeHandle, DimensionHandle, FederateHandle, FederationHandle, InteractionClassHandle,
    ObjectClassHandle, ObjectInstanceHandle, ParameterHandle, RegionToken, SpaceHandle,
};
pub use message::{Message, MessageError, MessageKind, Payload};
pub use region::{Extent, Region};
pub use time::{LogicalInterval, LogicalTime};
pub use values::{AttributeValueMap, HandleValueMap, ParameterValueMap};
