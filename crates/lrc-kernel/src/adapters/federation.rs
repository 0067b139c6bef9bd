//! In-memory federation
//!
//! One `InMemoryFederation` per process stands in for the transport and the
//! federation-wide time manager. Each kernel connects with its own inbox and
//! gets a `FederationEndpoint` implementing both `Connection` and
//! `FederationCoordinator`.
//!
//! ## Grant rule
//!
//! A constrained advance to `T` is granted once every other joined,
//! regulating federate has a send floor `>= T`. The floor is its current time
//! or, while it has an advance of its own outstanding, that advance's target:
//! the lowest timestamp its kernel will still stamp or accept. Equality counts
//! as safe, since a message stamped `T` is not in the past at `T`.

use crate::domain::TimeReport;
use crate::error::{CoordinatorError, DeliveryError};
use crate::ipc::queue::InboundSender;
use crate::ports::outbound::{
    Connection, FederationCoordinator, GrantWaker, JoinGrant, JoinRequest,
};
use async_trait::async_trait;
use lrc_types::{FederateHandle, FederationHandle, LogicalTime, Message};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct FederateEntry {
    name: String,
    inbox: InboundSender,
    report: TimeReport,
}

struct PendingAdvance {
    federate: FederateHandle,
    target: LogicalTime,
    waker: GrantWaker,
}

struct FederationState {
    handle: FederationHandle,
    name: String,
    federates: BTreeMap<FederateHandle, FederateEntry>,
    pending: Vec<PendingAdvance>,
    next_federate: u32,
}

impl FederationState {
    /// Lowest timestamp `federate` can still send, if regulating.
    fn send_floor(&self, federate: FederateHandle, entry: &FederateEntry) -> Option<LogicalTime> {
        if entry.report.lookahead.is_none() {
            return None;
        }
        let requested = self
            .pending
            .iter()
            .find(|p| p.federate == federate)
            .map(|p| p.target);
        match requested {
            Some(target) if target > entry.report.current => Some(target),
            _ => Some(entry.report.current),
        }
    }

    fn is_safe(&self, requester: FederateHandle, target: LogicalTime) -> bool {
        self.federates
            .iter()
            .filter(|(handle, _)| **handle != requester)
            .filter_map(|(handle, entry)| self.send_floor(*handle, entry))
            .all(|floor| floor >= target)
    }

    /// Wake every pending advance that has become safe.
    fn grant_safe(&mut self) {
        let safe: Vec<usize> = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| self.is_safe(p.federate, p.target))
            .map(|(i, _)| i)
            .collect();

        for index in safe.into_iter().rev() {
            let advance = self.pending.remove(index);
            info!(
                federate = %advance.federate,
                time = %advance.target,
                "[lrc] Granting time advance"
            );
            if let Err(err) = advance.waker.wake(advance.target) {
                warn!(federate = %advance.federate, error = %err, "Grant not delivered");
            }
        }
    }
}

/// Shared federation execution for every kernel in the process.
#[derive(Clone)]
pub struct InMemoryFederation {
    state: Arc<Mutex<FederationState>>,
}

impl InMemoryFederation {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(FederationState {
                handle: FederationHandle(1),
                name: name.to_string(),
                federates: BTreeMap::new(),
                pending: Vec::new(),
                next_federate: 1,
            })),
        }
    }

    /// Attach a kernel whose inbound queue is fed through `inbox`.
    #[must_use]
    pub fn connect(&self, inbox: InboundSender) -> Arc<FederationEndpoint> {
        Arc::new(FederationEndpoint {
            state: self.state.clone(),
            inbox,
            federate: Mutex::new(None),
        })
    }

    /// Handles of the joined federates.
    pub fn federates(&self) -> Vec<FederateHandle> {
        self.state.lock().federates.keys().copied().collect()
    }

    /// Number of advances still waiting for a grant.
    pub fn pending_advances(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// One kernel's view of the in-memory federation.
pub struct FederationEndpoint {
    state: Arc<Mutex<FederationState>>,
    inbox: InboundSender,
    federate: Mutex<Option<FederateHandle>>,
}

impl FederationEndpoint {
    pub fn federate(&self) -> Option<FederateHandle> {
        *self.federate.lock()
    }
}

#[async_trait]
impl Connection for FederationEndpoint {
    async fn send(&self, message: Message) -> Result<(), DeliveryError> {
        let state = self.state.lock();
        let source = message.source();

        for target in message.targets() {
            if !state.federates.contains_key(target) {
                return Err(DeliveryError::Unreachable { federate: *target });
            }
        }

        let mut delivered = 0usize;
        for (handle, entry) in &state.federates {
            if Some(*handle) == source {
                continue;
            }
            if !message.is_broadcast() && !message.is_targeted_at(*handle) {
                continue;
            }
            match entry.inbox.enqueue(message.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(federate = %handle, error = %err, "Dropping delivery"),
            }
        }

        debug!(kind = %message.kind(), delivered, "Routed message");
        Ok(())
    }
}

#[async_trait]
impl FederationCoordinator for FederationEndpoint {
    async fn join(&self, request: JoinRequest) -> Result<JoinGrant, CoordinatorError> {
        let mut state = self.state.lock();
        if request.federation_name != state.name {
            return Err(CoordinatorError::FederationNotFound {
                name: request.federation_name,
            });
        }
        if state
            .federates
            .values()
            .any(|entry| entry.name == request.federate_name)
        {
            return Err(CoordinatorError::FederateNameInUse {
                name: request.federate_name,
            });
        }

        let federate = FederateHandle(state.next_federate);
        state.next_federate += 1;
        state.federates.insert(
            federate,
            FederateEntry {
                name: request.federate_name,
                inbox: self.inbox.clone(),
                report: TimeReport {
                    current: LogicalTime::INITIAL,
                    lookahead: None,
                    constrained: false,
                },
            },
        );
        *self.federate.lock() = Some(federate);

        Ok(JoinGrant {
            federate,
            federation: state.handle,
        })
    }

    async fn resign(&self, federate: FederateHandle) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock();
        if state.federates.remove(&federate).is_none() {
            return Err(CoordinatorError::FederateNotKnown { federate });
        }
        state.pending.retain(|p| p.federate != federate);
        *self.federate.lock() = None;

        // A departing regulator may unblock others.
        state.grant_safe();
        Ok(())
    }

    async fn report_time_status(
        &self,
        federate: FederateHandle,
        report: TimeReport,
    ) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock();
        let entry = state
            .federates
            .get_mut(&federate)
            .ok_or(CoordinatorError::FederateNotKnown { federate })?;
        entry.report = report;

        state.grant_safe();
        Ok(())
    }

    async fn request_time_advance(
        &self,
        federate: FederateHandle,
        target: LogicalTime,
        waker: GrantWaker,
    ) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock();
        if !state.federates.contains_key(&federate) {
            return Err(CoordinatorError::FederateNotKnown { federate });
        }
        state.pending.push(PendingAdvance {
            federate,
            target,
            waker,
        });

        state.grant_safe();
        Ok(())
    }
}
