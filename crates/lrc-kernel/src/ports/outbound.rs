//! Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the kernel consumes: the object model, the transport and the
//! federation coordinator.

use crate::domain::{InteractionClassInfo, ObjectClassInfo, SpaceInfo, TimeReport};
use crate::error::{CoordinatorError, DeliveryError, KernelError, KernelResult, QueueError};
use crate::ipc::queue::InboundSender;
use async_trait::async_trait;
use lrc_types::{
    FederateHandle, FederationHandle, InteractionClassHandle, LogicalTime, Message,
    ObjectClassHandle, SpaceHandle,
};

/// Read-only object model metadata.
pub trait ObjectModelProvider: Send + Sync {
    fn object_class(&self, class: ObjectClassHandle) -> Option<ObjectClassInfo>;

    fn interaction_class(&self, class: InteractionClassHandle) -> Option<InteractionClassInfo>;

    fn space(&self, space: SpaceHandle) -> Option<SpaceInfo>;

    /// Object class, or `ObjectClassNotDefined`.
    fn require_object_class(&self, class: ObjectClassHandle) -> KernelResult<ObjectClassInfo> {
        self.object_class(class)
            .ok_or(KernelError::ObjectClassNotDefined { class })
    }

    fn require_interaction_class(
        &self,
        class: InteractionClassHandle,
    ) -> KernelResult<InteractionClassInfo> {
        self.interaction_class(class)
            .ok_or(KernelError::InteractionClassNotDefined { class })
    }

    fn require_space(&self, space: SpaceHandle) -> KernelResult<SpaceInfo> {
        self.space(space).ok_or(KernelError::SpaceNotDefined { space })
    }
}

/// Outbound transport. Encoding and routing are the implementation's business.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Join handshake request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinRequest {
    pub federation_name: String,
    pub federate_name: String,
    pub federate_type: String,
}

/// Identity handed out by the coordinator on join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JoinGrant {
    pub federate: FederateHandle,
    pub federation: FederationHandle,
}

/// Resumes a pending time advance by re-injecting a grant into the
/// requesting federate's inbound queue.
#[derive(Clone, Debug)]
pub struct GrantWaker {
    federate: FederateHandle,
    inbox: InboundSender,
}

impl GrantWaker {
    #[must_use]
    pub fn new(federate: FederateHandle, inbox: InboundSender) -> Self {
        Self { federate, inbox }
    }

    pub fn federate(&self) -> FederateHandle {
        self.federate
    }

    pub fn wake(&self, time: LogicalTime) -> Result<(), QueueError> {
        self.inbox.enqueue(Message::grant(self.federate, time))
    }
}

/// Federation-wide coordination: membership and time-advance arbitration.
#[async_trait]
pub trait FederationCoordinator: Send + Sync {
    async fn join(&self, request: JoinRequest) -> Result<JoinGrant, CoordinatorError>;

    async fn resign(&self, federate: FederateHandle) -> Result<(), CoordinatorError>;

    /// Report the federate's clock, lookahead and constrained flag.
    async fn report_time_status(
        &self,
        federate: FederateHandle,
        report: TimeReport,
    ) -> Result<(), CoordinatorError>;

    /// Register a constrained advance. The coordinator calls `waker` once no
    /// regulating federate can still send anything timestamped before `target`.
    async fn request_time_advance(
        &self,
        federate: FederateHandle,
        target: LogicalTime,
        waker: GrantWaker,
    ) -> Result<(), CoordinatorError>;
}
