//! # LRC Kernel: Federate Local Coordination
//!
//! The per-federate kernel of a distributed simulation runtime. It queues
//! inbound messages, dispatches them through handler chains, keeps the
//! federate's session state, runs its logical-time engine and decides which
//! updates and interactions reach the federate application.
//!
//! ## Architecture
//!
//! - **Domain**: Session lifecycle, time status and TSO queue, interest
//!   manager, region store, object repository
//! - **Ports**: Inbound (`FederateKernelApi`) and Outbound (`ObjectModelProvider`,
//!   `Connection`, `FederationCoordinator`)
//! - **IPC**: Inbound queue, message context, dispatcher and handler chains
//! - **Service**: `LocalKernel`, the single consumer of the inbound queue
//! - **Adapters**: In-memory object model and federation for tests and demos
//!
//! ## Message Flow
//!
//! ```text
//! request(msg) ──→ Dispatcher[Outgoing, kind] ──→ handlers ──→ Connection
//!                                                                  │
//! Connection (other kernel) ──→ InboundQueue ──→ Dispatcher[Incoming, kind]
//!                                                      │
//!                                                      └──→ callbacks
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ipc;
pub mod ports;
pub mod service;
pub mod telemetry;


pub use adapters::{FederationEndpoint, InMemoryFederation, InMemoryObjectModel};
pub use config::{ConfigError, KernelConfig, LoggingConfig, MonikerConfig, TimeConfig};
pub use domain::{
    AdvanceDecision, AdvanceState, Callback, FederateSession, InterestClass, Lifecycle,
    Membership, TimeReport, TimeStatus,
};
pub use error::{
    CoordinatorError, DeliveryError, ErrorClass, KernelError, KernelResult, QueueError,
};
pub use ipc::{InboundQueue, InboundSender, MessageContext, Outcome, Response};
pub use ports::{
    Connection, FederateKernelApi, FederationCoordinator, GrantWaker, JoinGrant, JoinRequest,
    ObjectModelProvider,
};
pub use service::LocalKernel;
pub use telemetry::{init_logging, Monikers, TelemetryError};
