//! # Messages
//!
//! A `Message` is one request or notification exchanged between a federate and
//! the rest of the federation. Header fields are private: once a message is
//! built only the outbound preparation step may fill in routing fields, and the
//! timestamp can be set at most once.

use crate::handles::{
    AttributeHandle, DimensionHandle, FederateHandle, FederationHandle, InteractionClassHandle,
    ObjectClassHandle, ObjectInstanceHandle, RegionToken, SpaceHandle,
};
use crate::region::{Extent, Region};
use crate::time::{LogicalInterval, LogicalTime};
use crate::values::{AttributeValueMap, ParameterValueMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Errors raised by message header mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessageError {
    /// The timestamp of a message is write-once.
    #[error("Timestamp already set to {existing}")]
    TimestampAlreadySet { existing: LogicalTime },
}

/// Enumerated message kind. Derived from the payload, never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    JoinFederation,
    ResignFederation,
    EnableTimeRegulation,
    DisableTimeRegulation,
    EnableTimeConstrained,
    DisableTimeConstrained,
    ModifyLookahead,
    TimeAdvanceRequest,
    TimeAdvanceGrant,
    PublishObjectClass,
    UnpublishObjectClass,
    SubscribeObjectClass,
    UnsubscribeObjectClass,
    PublishInteractionClass,
    UnpublishInteractionClass,
    SubscribeInteractionClass,
    UnsubscribeInteractionClass,
    CreateRegion,
    ModifyRegion,
    DeleteRegion,
    RegisterObject,
    UpdateAttributes,
    DeleteObject,
    SendInteraction,
}

impl MessageKind {
    /// Whether this kind is a service defined by the interoperability standard.
    ///
    /// Only these kinds are ever timestamped. Internal control messages (the
    /// re-injected grant resumption) never carry a timestamp.
    #[must_use]
    pub const fn is_spec_defined(self) -> bool {
        !matches!(self, MessageKind::TimeAdvanceGrant)
    }

    /// Whether the local federate must be joined before this kind is processed.
    #[must_use]
    pub const fn requires_membership(self) -> bool {
        !matches!(self, MessageKind::JoinFederation)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind-specific message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    JoinFederation {
        federation_name: String,
        federate_name: String,
        federate_type: String,
    },
    ResignFederation,
    EnableTimeRegulation {
        lookahead: LogicalInterval,
    },
    DisableTimeRegulation,
    EnableTimeConstrained,
    DisableTimeConstrained,
    ModifyLookahead {
        lookahead: LogicalInterval,
    },
    TimeAdvanceRequest {
        time: LogicalTime,
    },
    TimeAdvanceGrant {
        time: LogicalTime,
    },
    PublishObjectClass {
        class: ObjectClassHandle,
        attributes: BTreeSet<AttributeHandle>,
    },
    UnpublishObjectClass {
        class: ObjectClassHandle,
    },
    SubscribeObjectClass {
        class: ObjectClassHandle,
        attributes: BTreeSet<AttributeHandle>,
        regions: Vec<RegionToken>,
    },
    UnsubscribeObjectClass {
        class: ObjectClassHandle,
    },
    PublishInteractionClass {
        class: InteractionClassHandle,
    },
    UnpublishInteractionClass {
        class: InteractionClassHandle,
    },
    SubscribeInteractionClass {
        class: InteractionClassHandle,
        regions: Vec<RegionToken>,
    },
    UnsubscribeInteractionClass {
        class: InteractionClassHandle,
    },
    CreateRegion {
        space: SpaceHandle,
        extents: BTreeMap<DimensionHandle, Extent>,
    },
    ModifyRegion {
        token: RegionToken,
        extents: BTreeMap<DimensionHandle, Extent>,
    },
    DeleteRegion {
        token: RegionToken,
    },
    RegisterObject {
        class: ObjectClassHandle,
        /// Assigned by the registering kernel; `None` on the local request.
        instance: Option<ObjectInstanceHandle>,
        name: Option<String>,
    },
    UpdateAttributes {
        instance: ObjectInstanceHandle,
        class: ObjectClassHandle,
        values: AttributeValueMap,
        /// Sender-side region tokens, resolved into `regions` before sending.
        region_tokens: Vec<RegionToken>,
        regions: Vec<Region>,
    },
    DeleteObject {
        instance: ObjectInstanceHandle,
    },
    SendInteraction {
        class: InteractionClassHandle,
        parameters: ParameterValueMap,
        region_tokens: Vec<RegionToken>,
        regions: Vec<Region>,
    },
}

impl Payload {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::JoinFederation { .. } => MessageKind::JoinFederation,
            Payload::ResignFederation => MessageKind::ResignFederation,
            Payload::EnableTimeRegulation { .. } => MessageKind::EnableTimeRegulation,
            Payload::DisableTimeRegulation => MessageKind::DisableTimeRegulation,
            Payload::EnableTimeConstrained => MessageKind::EnableTimeConstrained,
            Payload::DisableTimeConstrained => MessageKind::DisableTimeConstrained,
            Payload::ModifyLookahead { .. } => MessageKind::ModifyLookahead,
            Payload::TimeAdvanceRequest { .. } => MessageKind::TimeAdvanceRequest,
            Payload::TimeAdvanceGrant { .. } => MessageKind::TimeAdvanceGrant,
            Payload::PublishObjectClass { .. } => MessageKind::PublishObjectClass,
            Payload::UnpublishObjectClass { .. } => MessageKind::UnpublishObjectClass,
            Payload::SubscribeObjectClass { .. } => MessageKind::SubscribeObjectClass,
            Payload::UnsubscribeObjectClass { .. } => MessageKind::UnsubscribeObjectClass,
            Payload::PublishInteractionClass { .. } => MessageKind::PublishInteractionClass,
            Payload::UnpublishInteractionClass { .. } => MessageKind::UnpublishInteractionClass,
            Payload::SubscribeInteractionClass { .. } => MessageKind::SubscribeInteractionClass,
            Payload::UnsubscribeInteractionClass { .. } => {
                MessageKind::UnsubscribeInteractionClass
            }
            Payload::CreateRegion { .. } => MessageKind::CreateRegion,
            Payload::ModifyRegion { .. } => MessageKind::ModifyRegion,
            Payload::DeleteRegion { .. } => MessageKind::DeleteRegion,
            Payload::RegisterObject { .. } => MessageKind::RegisterObject,
            Payload::UpdateAttributes { .. } => MessageKind::UpdateAttributes,
            Payload::DeleteObject { .. } => MessageKind::DeleteObject,
            Payload::SendInteraction { .. } => MessageKind::SendInteraction,
        }
    }
}

/// One request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    source: Option<FederateHandle>,
    target_federation: Option<FederationHandle>,
    /// Empty means broadcast to every federate.
    targets: Vec<FederateHandle>,
    timestamp: Option<LogicalTime>,
    payload: Payload,
}

impl Message {
    /// A message with no source, no target (broadcast) and no timestamp.
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self {
            source: None,
            target_federation: None,
            targets: Vec::new(),
            timestamp: None,
            payload,
        }
    }

    /// Internal grant resumption addressed from and to `federate`.
    #[must_use]
    pub fn grant(federate: FederateHandle, time: LogicalTime) -> Self {
        Self::new(Payload::TimeAdvanceGrant { time })
            .from_federate(federate)
            .to_federates(vec![federate])
    }

    #[must_use]
    pub fn from_federate(mut self, source: FederateHandle) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn to_federates(mut self, targets: Vec<FederateHandle>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn in_federation(mut self, federation: FederationHandle) -> Self {
        self.target_federation = Some(federation);
        self
    }

    /// Builder form of [`Message::stamp`] for messages that are explicitly timed.
    /// Fails like `stamp` if a timestamp is already present.
    pub fn at(mut self, time: LogicalTime) -> Result<Self, MessageError> {
        self.stamp(time)?;
        Ok(self)
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    #[must_use]
    pub fn source(&self) -> Option<FederateHandle> {
        self.source
    }

    #[must_use]
    pub fn target_federation(&self) -> Option<FederationHandle> {
        self.target_federation
    }

    #[must_use]
    pub fn targets(&self) -> &[FederateHandle] {
        &self.targets
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn is_targeted_at(&self, federate: FederateHandle) -> bool {
        self.targets.contains(&federate)
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<LogicalTime> {
        self.timestamp
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Kind-specific content only; the header, timestamp included, stays
    /// reachable solely through its setters.
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn set_source(&mut self, source: FederateHandle) {
        self.source = Some(source);
    }

    pub fn set_target_federation(&mut self, federation: FederationHandle) {
        self.target_federation = Some(federation);
    }

    pub fn set_targets(&mut self, targets: Vec<FederateHandle>) {
        self.targets = targets;
    }

    /// Fill in the timestamp. Fails if one is already present.
    pub fn stamp(&mut self, time: LogicalTime) -> Result<(), MessageError> {
        match self.timestamp {
            Some(existing) => Err(MessageError::TimestampAlreadySet { existing }),
            None => {
                self.timestamp = Some(time);
                Ok(())
            }
        }
    }
}
