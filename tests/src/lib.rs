//! # LRC Test Suite
//!
//! Multi-federate scenarios run against real `LocalKernel`s connected
//! through one `InMemoryFederation`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestFederate + shared object model
//! └── integration/      # End-to-end flows
//!     ├── time_flows.rs
//!     ├── interest_flows.rs
//!     └── lifecycle_flows.rs
//! tests/benches/
//! └── kernel_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lrc-tests
//! cargo test -p lrc-tests integration::time_flows
//! cargo bench -p lrc-tests
//! ```

pub mod harness;
pub mod integration;
