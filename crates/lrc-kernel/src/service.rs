//! # Local Kernel Service
//!
//! Owns one federate session, its dispatcher and its inbound queue, and is
//! the single consumer of that queue.
//!
//! ```text
//! federate app ──request()──→ [outgoing chain] ──→ Outcome
//!
//! transport / waker ──enqueue()──→ [InboundQueue] ──drain_one() / run()──→ [incoming chain]
//! ```
//!
//! A fatal dispatch fault ends the session: every later call returns the
//! same fault.

use crate::config::KernelConfig;
use crate::domain::{Callback, FederateSession, InterestClass, TimeStatus};
use crate::error::{KernelError, KernelResult, QueueError};
use crate::ipc::context::Outcome;
use crate::ipc::dispatcher::{Direction, Dispatcher};
use crate::ipc::handler::HandlerEnv;
use crate::ipc::handlers::standard_dispatcher;
use crate::ipc::queue::{InboundQueue, InboundSender};
use crate::ports::inbound::FederateKernelApi;
use crate::ports::outbound::{Connection, FederationCoordinator, ObjectModelProvider};
use crate::telemetry::Monikers;
use async_trait::async_trait;
use lrc_types::{AttributeHandle, Message, Region};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// One federate's local coordination kernel.
pub struct LocalKernel {
    config: KernelConfig,
    session: FederateSession,
    dispatcher: Dispatcher,
    queue: InboundQueue,
    monikers: Monikers,
    fault: Option<KernelError>,
}

impl LocalKernel {
    /// Build a kernel over `queue`. Collaborators that deliver into this
    /// kernel must have been given `queue.sender()`.
    pub fn new(
        config: KernelConfig,
        model: Arc<dyn ObjectModelProvider>,
        queue: InboundQueue,
        connection: Arc<dyn Connection>,
        coordinator: Arc<dyn FederationCoordinator>,
    ) -> Self {
        let env = HandlerEnv {
            model: model.clone(),
            connection,
            coordinator,
            inbox: queue.sender(),
            time: config.time.clone(),
        };
        let mut dispatcher = standard_dispatcher();
        dispatcher.configure(&env);
        let monikers = Monikers::new(&config.monikers, model);

        Self {
            config,
            session: FederateSession::new(),
            dispatcher,
            queue,
            monikers,
            fault: None,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// A new producer handle for the inbound queue.
    pub fn sender(&self) -> InboundSender {
        self.queue.sender()
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &FederateSession {
        &self.session
    }

    /// Deliveries queued for the federate application, oldest first.
    pub fn take_callbacks(&mut self) -> Vec<Callback> {
        self.session.take_callbacks()
    }

    async fn dispatch(&mut self, direction: Direction, message: Message) -> KernelResult<Outcome> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        let summary = self.monikers.summary(&message);
        match self
            .dispatcher
            .dispatch(direction, &mut self.session, message)
            .await
        {
            Ok(outcome) => {
                debug!(?direction, message = %summary, ?outcome, "[lrc] Dispatched");
                Ok(outcome)
            }
            Err(fault) => {
                error!(?direction, message = %summary, error = %fault, "[lrc] Session ended by fatal fault");
                self.fault = Some(fault.clone());
                Err(fault)
            }
        }
    }

    /// Run a local request through its outgoing chain.
    pub async fn request(&mut self, message: Message) -> KernelResult<Outcome> {
        self.dispatch(Direction::Outgoing, message).await
    }

    /// Wait for the next inbound message and dispatch it.
    ///
    /// `Ok(None)` once the queue has been shut down and drained.
    pub async fn drain_one(&mut self) -> KernelResult<Option<Outcome>> {
        match self.queue.next().await {
            Some(message) => self.dispatch(Direction::Incoming, message).await.map(Some),
            None => Ok(None),
        }
    }

    /// Dispatch the next inbound message if one is already queued.
    pub async fn try_drain_one(&mut self) -> KernelResult<Option<Outcome>> {
        match self.queue.try_next() {
            Some(message) => self.dispatch(Direction::Incoming, message).await.map(Some),
            None => Ok(None),
        }
    }

    /// Dispatch everything currently queued, including follow-ups enqueued
    /// while draining. Returns the number of messages dispatched.
    pub async fn drain_ready(&mut self) -> KernelResult<usize> {
        let mut dispatched = 0;
        while self.try_drain_one().await?.is_some() {
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Dispatch loop. Returns when `shutdown` fires, its sender is dropped,
    /// or a fatal fault ends the session.
    ///
    /// At most `drain_batch` messages are dispatched per wake-up before the
    /// loop yields.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> KernelResult<()> {
        info!(federate = ?self.session.federate(), "[lrc] Dispatch loop started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.changed() => None,
                message = self.queue.next() => message,
            };
            let Some(message) = next else {
                break;
            };

            self.dispatch(Direction::Incoming, message).await?;
            for _ in 1..self.config.drain_batch {
                let Some(message) = self.queue.try_next() else {
                    break;
                };
                self.dispatch(Direction::Incoming, message).await?;
            }
            tokio::task::yield_now().await;
        }

        info!(federate = ?self.session.federate(), "[lrc] Dispatch loop stopped");
        Ok(())
    }

    /// Close the inbound queue, discarding undelivered messages.
    pub fn shutdown(&mut self) -> usize {
        let discarded = self.queue.shutdown();
        info!(discarded, "[lrc] Kernel shut down");
        discarded
    }
}

#[async_trait]
impl FederateKernelApi for LocalKernel {
    fn enqueue(&self, message: Message) -> Result<(), QueueError> {
        self.queue.sender().enqueue(message)
    }

    async fn drain_one(&mut self) -> KernelResult<Option<Outcome>> {
        LocalKernel::drain_one(self).await
    }

    async fn request(&mut self, message: Message) -> KernelResult<Outcome> {
        LocalKernel::request(self, message).await
    }

    fn current_time_status(&self) -> TimeStatus {
        self.session.time
    }

    fn is_interested(
        &self,
        class: InterestClass,
        attributes: &BTreeSet<AttributeHandle>,
        regions: &[Region],
    ) -> bool {
        self.session.is_interested(class, attributes, regions)
    }
}
