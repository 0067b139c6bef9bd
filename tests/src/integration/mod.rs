//! # Integration Scenarios
//!
//! Several kernels joined to one in-memory federation. Each test drives the
//! federates through `request`, then pumps their inbound queues and checks
//! the callbacks handed to the federate application.

pub mod interest_flows;
pub mod lifecycle_flows;
pub mod time_flows;
