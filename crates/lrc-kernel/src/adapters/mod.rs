//! In-memory implementations of the outbound ports, shared by every kernel
//! in one process.

pub mod federation;
pub mod object_model;

pub use federation::{FederationEndpoint, InMemoryFederation};
pub use object_model::{InMemoryObjectModel, ObjectModelBuilder};
