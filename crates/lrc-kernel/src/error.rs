//! Error types for the local coordination kernel
//!
//! Every fault a handler can raise is a `KernelError`. The `ErrorClass` of a
//! variant decides how the dispatcher treats it: fatal faults abort the
//! session and surface as `Err` from dispatch, everything else is written into
//! the message context as a typed error response.

use lrc_types::{
    AttributeHandle, DimensionHandle, FederateHandle, InteractionClassHandle, LogicalInterval,
    LogicalTime, MessageError, MessageKind, ObjectClassHandle, ObjectInstanceHandle,
    ParameterHandle, RegionToken, SpaceHandle,
};
use thiserror::Error;

/// Classification of a kernel fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Request violates a service precondition.
    Validation,
    /// A handle was not found in the object model.
    Lookup,
    /// The request needs federation membership and the federate is not joined.
    Membership,
    /// The transport failed to deliver an outbound message.
    Delivery,
    /// The federation coordinator rejected or failed a request.
    Coordinator,
    /// Programming fault; terminates the affected session.
    Fatal,
}

/// Kernel errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    // =========================================================================
    // MEMBERSHIP
    // =========================================================================
    #[error("Federate is not joined to a federation")]
    NotJoined,

    #[error("Federate is already joined as {federate}")]
    AlreadyJoined { federate: FederateHandle },

    #[error("Federate is resigning")]
    Resigning,

    // =========================================================================
    // OBJECT MODEL LOOKUP
    // =========================================================================
    #[error("Object class [{class}] not found in object model")]
    ObjectClassNotDefined { class: ObjectClassHandle },

    #[error("Attribute [{attribute}] not defined for object class [{class}]")]
    AttributeNotDefined {
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    },

    #[error("Interaction class [{class}] not found in object model")]
    InteractionClassNotDefined { class: InteractionClassHandle },

    #[error("Parameter [{parameter}] not defined for interaction class [{class}]")]
    ParameterNotDefined {
        class: InteractionClassHandle,
        parameter: ParameterHandle,
    },

    #[error("Space [{space}] not found in object model")]
    SpaceNotDefined { space: SpaceHandle },

    #[error("Dimension [{dimension}] is not part of space [{space}]")]
    DimensionNotDefined {
        space: SpaceHandle,
        dimension: DimensionHandle,
    },

    // =========================================================================
    // DECLARATION / OBJECT VALIDATION
    // =========================================================================
    #[error("Object class [{class}] is not published")]
    ObjectClassNotPublished { class: ObjectClassHandle },

    #[error("Attribute [{attribute}] of object class [{class}] is not published")]
    AttributeNotPublished {
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    },

    #[error("Interaction class [{class}] is not published")]
    InteractionClassNotPublished { class: InteractionClassHandle },

    #[error("Object instance [{instance}] not known")]
    ObjectInstanceNotKnown { instance: ObjectInstanceHandle },

    #[error("Object instance [{instance}] already exists")]
    ObjectInstanceAlreadyExists { instance: ObjectInstanceHandle },

    #[error("Object instance name [{name}] already in use")]
    ObjectInstanceNameInUse { name: String },

    #[error("Attributes of object instance [{instance}] are owned by another federate")]
    AttributeNotOwned { instance: ObjectInstanceHandle },

    #[error("Delete privilege for object instance [{instance}] not held")]
    DeletePrivilegeNotHeld { instance: ObjectInstanceHandle },

    // =========================================================================
    // DATA DISTRIBUTION MANAGEMENT
    // =========================================================================
    #[error("Region [{token}] not known")]
    RegionNotKnown { token: RegionToken },

    #[error("Region [{token}] is in use by a subscription")]
    RegionInUse { token: RegionToken },

    #[error("Invalid range [{lower}, {upper}) for dimension [{dimension}] with upper bound {bound}")]
    InvalidRangeBound {
        dimension: DimensionHandle,
        lower: u64,
        upper: u64,
        bound: u64,
    },

    // =========================================================================
    // TIME MANAGEMENT
    // =========================================================================
    #[error("Time must advance: requested {requested}, current {current}")]
    TimeMustAdvance {
        requested: LogicalTime,
        current: LogicalTime,
    },

    #[error("Invalid logical time {time}")]
    InvalidLogicalTime { time: LogicalTime },

    #[error("Time advance to {pending} already pending")]
    AdvanceAlreadyPending { pending: LogicalTime },

    #[error("Unexpected grant to {granted} (no matching advance outstanding)")]
    UnexpectedGrant { granted: LogicalTime },

    #[error("Time regulation already enabled")]
    TimeRegulationAlreadyEnabled,

    #[error("Time regulation not enabled")]
    TimeRegulationNotEnabled,

    #[error("Time constrained already enabled")]
    TimeConstrainedAlreadyEnabled,

    #[error("Time constrained not enabled")]
    TimeConstrainedNotEnabled,

    #[error("Invalid lookahead {lookahead}")]
    InvalidLookahead { lookahead: LogicalInterval },

    // =========================================================================
    // COLLABORATORS
    // =========================================================================
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Coordinator failure: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Message header: {0}")]
    Message(#[from] MessageError),

    // =========================================================================
    // FATAL
    // =========================================================================
    #[error("Handler {handler} used before it was configured")]
    HandlerNotConfigured { handler: &'static str },

    #[error("Message context for {kind} already resolved")]
    ContextAlreadyResolved { kind: MessageKind },
}

impl KernelError {
    /// How the dispatcher must treat this fault.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            KernelError::NotJoined | KernelError::Resigning => ErrorClass::Membership,
            KernelError::ObjectClassNotDefined { .. }
            | KernelError::AttributeNotDefined { .. }
            | KernelError::InteractionClassNotDefined { .. }
            | KernelError::ParameterNotDefined { .. }
            | KernelError::SpaceNotDefined { .. }
            | KernelError::DimensionNotDefined { .. } => ErrorClass::Lookup,
            KernelError::Delivery(_) => ErrorClass::Delivery,
            KernelError::Coordinator(_) => ErrorClass::Coordinator,
            KernelError::HandlerNotConfigured { .. }
            | KernelError::ContextAlreadyResolved { .. } => ErrorClass::Fatal,
            _ => ErrorClass::Validation,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Outbound transport failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Target federate {federate} unreachable")]
    Unreachable { federate: FederateHandle },
}

/// Federation coordinator failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Federation execution {name} does not exist")]
    FederationNotFound { name: String },

    #[error("Federate name {name} already in use")]
    FederateNameInUse { name: String },

    #[error("Federate {federate} not known to the federation")]
    FederateNotKnown { federate: FederateHandle },

    #[error("Coordinator unavailable")]
    Unavailable,
}

/// Inbound queue failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue owner shut down; the message was not accepted.
    #[error("Inbound queue closed")]
    Closed,
}
