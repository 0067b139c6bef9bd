//! Ports layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::FederateKernelApi;
pub use outbound::{
    Connection, FederationCoordinator, GrantWaker, JoinGrant, JoinRequest, ObjectModelProvider,
};
