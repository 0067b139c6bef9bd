//! # Federate Session State
//!
//! Everything the kernel knows about the local federate for one federation
//! membership. The session exclusively owns the time status, interest
//! manager, region store, object repository and held deliveries; all of them
//! are torn down together on resign.
//!
//! ```text
//! [Unjoined] ──join──→ [Joined] ──begin_resign──→ [Resigning] ──complete──→ [Unjoined]
//!                          ↑                            │
//!                          └───────── abort ────────────┘
//! ```
//!
//! Lifecycle transitions are crate-private: only join/resign handlers drive them.

use crate::domain::callback::Callback;
use crate::domain::interest::{InterestClass, InterestManager};
use crate::domain::region::{region_filter_passes, RegionStore};
use crate::domain::repository::ObjectRepository;
use crate::domain::time::{TimeStatus, TsoQueue};
use crate::error::{KernelError, KernelResult};
use lrc_types::{AttributeHandle, FederateHandle, FederationHandle, Region};
use std::collections::BTreeSet;

/// Identity granted by the coordinator on join.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Membership {
    pub federate: FederateHandle,
    pub federation: FederationHandle,
    pub federation_name: String,
    pub federate_name: String,
    pub federate_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Unjoined,
    Joined(Membership),
    Resigning(Membership),
}

#[derive(Debug, Default)]
pub struct FederateSession {
    lifecycle: Lifecycle,
    pub time: TimeStatus,
    pub interest: InterestManager,
    pub regions: RegionStore,
    pub repository: ObjectRepository,
    pub tso: TsoQueue,
    callbacks: Vec<Callback>,
}

impl FederateSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Joined(_))
    }

    /// Membership while joined or resigning.
    pub fn membership(&self) -> Option<&Membership> {
        match &self.lifecycle {
            Lifecycle::Joined(membership) | Lifecycle::Resigning(membership) => Some(membership),
            Lifecycle::Unjoined => None,
        }
    }

    pub fn federate(&self) -> Option<FederateHandle> {
        self.membership().map(|m| m.federate)
    }

    /// Membership of a joined federate, or the matching membership fault.
    pub fn joined(&self) -> KernelResult<&Membership> {
        match &self.lifecycle {
            Lifecycle::Joined(membership) => Ok(membership),
            Lifecycle::Resigning(_) => Err(KernelError::Resigning),
            Lifecycle::Unjoined => Err(KernelError::NotJoined),
        }
    }

    pub fn is_regulating(&self) -> bool {
        self.time.is_regulating()
    }

    pub fn is_constrained(&self) -> bool {
        self.time.is_constrained()
    }

    /// Delivery decision: class/attribute interest AND region overlap.
    ///
    /// Subscriber regions that no longer resolve count as no match.
    pub fn is_interested(
        &self,
        class: InterestClass,
        attributes: &BTreeSet<AttributeHandle>,
        publisher_regions: &[Region],
    ) -> bool {
        let tokens = match class {
            InterestClass::Object(class) => match self.interest.object_subscription(class) {
                Some(sub) if !sub.attributes.is_disjoint(attributes) => &sub.regions,
                _ => return false,
            },
            InterestClass::Interaction(class) => {
                match self.interest.interaction_subscription(class) {
                    Some(sub) => &sub.regions,
                    None => return false,
                }
            }
        };

        match self.regions.resolve(tokens) {
            Ok(ours) => region_filter_passes(&ours, publisher_regions),
            Err(_) => false,
        }
    }

    pub(crate) fn ensure_unjoined(&self) -> KernelResult<()> {
        match &self.lifecycle {
            Lifecycle::Unjoined => Ok(()),
            Lifecycle::Joined(m) | Lifecycle::Resigning(m) => Err(KernelError::AlreadyJoined {
                federate: m.federate,
            }),
        }
    }

    /// `Unjoined -> Joined`, starting from a fresh session.
    pub(crate) fn join(&mut self, membership: Membership) -> KernelResult<()> {
        self.ensure_unjoined()?;
        self.reset();
        self.lifecycle = Lifecycle::Joined(membership);
        Ok(())
    }

    /// `Joined -> Resigning`
    pub(crate) fn begin_resign(&mut self) -> KernelResult<FederateHandle> {
        let membership = self.joined()?.clone();
        let federate = membership.federate;
        self.lifecycle = Lifecycle::Resigning(membership);
        Ok(federate)
    }

    /// `Resigning -> Joined` when the coordinator refused the resign.
    pub(crate) fn abort_resign(&mut self) {
        if let Lifecycle::Resigning(membership) = std::mem::take(&mut self.lifecycle) {
            self.lifecycle = Lifecycle::Joined(membership);
        }
    }

    /// `Resigning -> Unjoined`, tearing down all owned state.
    pub(crate) fn complete_resign(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Resigning(_)) {
            self.lifecycle = Lifecycle::Unjoined;
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.time = TimeStatus::new();
        self.interest.clear();
        self.regions.clear();
        self.repository.clear();
        self.tso = TsoQueue::new();
    }

    pub(crate) fn push_callback(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    /// Take queued callbacks, oldest first.
    pub fn take_callbacks(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.callbacks)
    }
}
