//! Inbound Ports (Driving Ports / API)
//!
//! What the kernel exposes to the receive path and to the federate application.

use crate::domain::{InterestClass, TimeStatus};
use crate::error::{KernelResult, QueueError};
use crate::ipc::context::Outcome;
use async_trait::async_trait;
use lrc_types::{AttributeHandle, Message, Region};
use std::collections::BTreeSet;

/// Primary kernel API
#[async_trait]
pub trait FederateKernelApi: Send {
    /// Append a delivered or re-injected message to the inbound queue.
    fn enqueue(&self, message: Message) -> Result<(), QueueError>;

    /// Wait for the next queued message and dispatch it.
    ///
    /// `Ok(None)` once the queue has been shut down. `Err` only for fatal faults.
    async fn drain_one(&mut self) -> KernelResult<Option<Outcome>>;

    /// Run a request issued by the local federate through its outgoing chain.
    async fn request(&mut self, message: Message) -> KernelResult<Outcome>;

    /// Read-only snapshot of the time status.
    fn current_time_status(&self) -> TimeStatus;

    /// Whether an update or interaction with these attributes and publisher
    /// regions would be delivered to the local federate.
    fn is_interested(
        &self,
        class: InterestClass,
        attributes: &BTreeSet<AttributeHandle>,
        regions: &[Region],
    ) -> bool;
}
