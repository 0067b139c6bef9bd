//! # Message Handlers
//!
//! A handler is one step of a chain. It either continues, vetoes (the rest of
//! the chain does not apply to this message) or fails (the context carries an
//! error response).
//!
//! Handlers own no session state. Collaborators are bound once through
//! `configure`; the session is passed to every `process` call.

use crate::config::TimeConfig;
use crate::domain::FederateSession;
use crate::error::{CoordinatorError, DeliveryError, KernelError, KernelResult};
use crate::ipc::context::MessageContext;
use crate::ipc::queue::InboundSender;
use crate::ports::{Connection, FederationCoordinator, ObjectModelProvider};
use async_trait::async_trait;
use lrc_types::{FederateHandle, Message};
use std::sync::Arc;

/// Why a chain stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    /// Not applicable. Not an error and produces no response.
    Veto(&'static str),
    /// Hard failure, written into the context as an error response.
    Fail(KernelError),
}

impl From<KernelError> for Interrupt {
    fn from(err: KernelError) -> Self {
        Interrupt::Fail(err)
    }
}

impl From<DeliveryError> for Interrupt {
    fn from(err: DeliveryError) -> Self {
        Interrupt::Fail(err.into())
    }
}

impl From<CoordinatorError> for Interrupt {
    fn from(err: CoordinatorError) -> Self {
        Interrupt::Fail(err.into())
    }
}

/// `Ok(())` means continue with the next handler.
pub type HandlerResult = Result<(), Interrupt>;

/// Dispatcher's view of one handler step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue,
    Veto(&'static str),
    Fail(KernelError),
}

impl From<HandlerResult> for Step {
    fn from(result: HandlerResult) -> Self {
        match result {
            Ok(()) => Step::Continue,
            Err(Interrupt::Veto(reason)) => Step::Veto(reason),
            Err(Interrupt::Fail(err)) => Step::Fail(err),
        }
    }
}

/// Collaborators a handler may be bound to.
#[derive(Clone)]
pub struct HandlerEnv {
    pub model: Arc<dyn ObjectModelProvider>,
    pub connection: Arc<dyn Connection>,
    pub coordinator: Arc<dyn FederationCoordinator>,
    /// Local inbound queue, for re-injected follow-ups.
    pub inbox: InboundSender,
    pub time: TimeConfig,
}

/// Collaborator slot of a handler. Empty until configured.
#[derive(Clone, Default)]
pub struct Binding(Option<HandlerEnv>);

impl Binding {
    pub fn bind(&mut self, env: &HandlerEnv) {
        self.0 = Some(env.clone());
    }

    /// Bound collaborators, or the fatal unconfigured-handler fault.
    pub fn env(&self, handler: &'static str) -> KernelResult<&HandlerEnv> {
        self.0
            .as_ref()
            .ok_or(KernelError::HandlerNotConfigured { handler })
    }
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bind collaborators. Called once per session before first use.
    fn configure(&mut self, env: &HandlerEnv);

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult;
}

// =============================================================================
// VETO HELPERS
// =============================================================================

/// Pure check over (message, session) used as a chain step.
pub type GuardFn = fn(&Message, &FederateSession) -> HandlerResult;

fn is_us(session: &FederateSession, federate: Option<FederateHandle>) -> bool {
    matches!((session.federate(), federate), (Some(us), Some(them)) if us == them)
}

pub fn veto_unless_target_is_us_or_broadcast(
    message: &Message,
    session: &FederateSession,
) -> HandlerResult {
    if message.is_broadcast() {
        return Ok(());
    }
    veto_unless_target_is_us(message, session)
}

pub fn veto_unless_target_is_us(message: &Message, session: &FederateSession) -> HandlerResult {
    match session.federate() {
        Some(us) if message.is_targeted_at(us) => Ok(()),
        _ => Err(Interrupt::Veto("target is not us")),
    }
}

pub fn veto_if_source_is_us(message: &Message, session: &FederateSession) -> HandlerResult {
    if is_us(session, message.source()) {
        Err(Interrupt::Veto("source is us"))
    } else {
        Ok(())
    }
}

pub fn veto_unless_source_is_us(message: &Message, session: &FederateSession) -> HandlerResult {
    if is_us(session, message.source()) {
        Ok(())
    } else {
        Err(Interrupt::Veto("source is not us"))
    }
}

pub fn veto_unless_joined(_message: &Message, session: &FederateSession) -> HandlerResult {
    if session.is_joined() {
        Ok(())
    } else {
        Err(Interrupt::Veto("not joined"))
    }
}

/// Chain step wrapping one veto helper.
pub struct Guard {
    name: &'static str,
    check: GuardFn,
}

impl Guard {
    #[must_use]
    pub fn new(name: &'static str, check: GuardFn) -> Self {
        Self { name, check }
    }
}

#[async_trait]
impl MessageHandler for Guard {
    fn name(&self) -> &'static str {
        self.name
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        (self.check)(context.request(), session)
    }
}

// =============================================================================
// OUTBOUND PREPARATION
// =============================================================================

/// Fill in the routing header of an outgoing message.
///
/// Source federate and target federation are always stamped; `target`
/// replaces the target list when given. The timestamp is set to the send
/// floor (the current logical time unless an advance is outstanding) only
/// when it is unset, the federate is regulating and the kind is
/// timestamp-bearing. An existing timestamp is never touched.
pub fn prepare_outgoing(
    message: &mut Message,
    session: &FederateSession,
    target: Option<FederateHandle>,
) -> KernelResult<()> {
    let membership = session.membership().ok_or(KernelError::NotJoined)?;

    if let Some(target) = target {
        message.set_targets(vec![target]);
    }
    message.set_source(membership.federate);
    message.set_target_federation(membership.federation);

    if message.timestamp().is_none() && session.is_regulating() && message.kind().is_spec_defined()
    {
        message.stamp(session.time.send_floor())?;
    }
    Ok(())
}

/// Reject a caller-set timestamp the federation could not honor: only a
/// regulating federate may time its messages, and never below its send floor.
pub fn check_send_time(message: &Message, session: &FederateSession) -> KernelResult<()> {
    let Some(time) = message.timestamp() else {
        return Ok(());
    };
    if !session.is_regulating() {
        return Err(KernelError::TimeRegulationNotEnabled);
    }
    if !time.is_valid() || time < session.time.send_floor() {
        return Err(KernelError::InvalidLogicalTime { time });
    }
    Ok(())
}
