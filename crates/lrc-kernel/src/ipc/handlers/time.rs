//! # Time Management Handlers
//!
//! Outgoing: the four flag switches, lookahead modification and the
//! time-advance request. Incoming: the three-step grant chain run when the
//! coordinator resumes a pending advance.
//!
//! ```text
//! request(T) ──constrained──→ coordinator.request_time_advance(T, waker)
//!                                        │
//!                        waker.wake(T) ──┘──→ inbox: TimeAdvanceGrant{T}
//!                                                  │
//!            ApplyGrant ──→ ReleaseTimestamped ──→ CompleteGrant ──→ callback
//! ```

use crate::domain::{AdvanceDecision, Callback, FederateSession};
use crate::ipc::context::{MessageContext, Response};
use crate::ipc::handler::{Binding, HandlerEnv, HandlerResult, Interrupt, MessageHandler};
use crate::ipc::handlers::delivery::deliver;
use crate::ports::GrantWaker;
use async_trait::async_trait;
use lrc_types::{LogicalTime, Payload};
use tracing::{debug, info, warn};

/// Push the session's time status to the coordinator.
async fn report_time(env: &HandlerEnv, session: &FederateSession) -> HandlerResult {
    let membership = session.joined()?;
    env.coordinator
        .report_time_status(membership.federate, session.time.report())
        .await?;
    Ok(())
}

/// Deliver everything held in the TSO queue through `time`, earliest first.
fn release_held(session: &mut FederateSession, through: Option<LogicalTime>) -> usize {
    let held = match through {
        Some(time) => session.tso.release_through(time),
        None => session.tso.drain_all(),
    };
    let mut delivered = 0;
    for message in held {
        if deliver(session, message) {
            delivered += 1;
        }
    }
    delivered
}

// =============================================================================
// OUTGOING
// =============================================================================

/// Regulation/constrained switches and lookahead changes.
#[derive(Default)]
pub struct TimeSwitchHandler {
    binding: Binding,
}

impl TimeSwitchHandler {
    const NAME: &'static str = "TimeSwitch";
}

#[async_trait]
impl MessageHandler for TimeSwitchHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, env: &HandlerEnv) {
        self.binding.bind(env);
    }

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let env = self.binding.env(Self::NAME)?;
        let federate = session.joined()?.federate;
        let before = session.time;

        let (callback, applied) = match *context.request().payload() {
            Payload::EnableTimeRegulation { lookahead } => {
                session.time.enable_regulation(lookahead)?;
                let callback = Callback::TimeRegulationEnabled {
                    time: session.time.current(),
                    lookahead,
                };
                (Some(callback), "[lrc] Time regulation enabled")
            }
            Payload::DisableTimeRegulation => {
                session.time.disable_regulation()?;
                (None, "[lrc] Time regulation disabled")
            }
            Payload::EnableTimeConstrained => {
                session.time.enable_constrained()?;
                let callback = Callback::TimeConstrainedEnabled {
                    time: session.time.current(),
                };
                (Some(callback), "[lrc] Time constrained enabled")
            }
            Payload::DisableTimeConstrained => {
                session.time.disable_constrained()?;
                (None, "[lrc] Time constrained disabled")
            }
            Payload::ModifyLookahead { lookahead } => {
                session.time.modify_lookahead(lookahead)?;
                (None, "Lookahead modified")
            }
            _ => return Err(Interrupt::Veto("not a time switch")),
        };

        // The coordinator must agree before anything becomes visible locally.
        if let Err(err) = report_time(env, session).await {
            session.time = before;
            warn!(%federate, "Time switch not reported, status restored");
            return Err(err);
        }

        if let Some(callback) = callback {
            session.push_callback(callback);
        }
        let flushed = if matches!(context.request().payload(), Payload::DisableTimeConstrained) {
            release_held(session, None)
        } else {
            0
        };
        info!(%federate, flushed, "{applied}");
        Ok(())
    }
}

#[derive(Default)]
pub struct TimeAdvanceHandler {
    binding: Binding,
}

impl TimeAdvanceHandler {
    const NAME: &'static str = "TimeAdvanceRequest";
}

#[async_trait]
impl MessageHandler for TimeAdvanceHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, env: &HandlerEnv) {
        self.binding.bind(env);
    }

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let env = self.binding.env(Self::NAME)?;
        let Payload::TimeAdvanceRequest { time } = *context.request().payload() else {
            return Err(Interrupt::Veto("not a time advance request"));
        };
        let federate = session.joined()?.federate;

        let before = session.time;
        let decision = session.time.request_advance(time)?;
        match decision {
            AdvanceDecision::Granted(granted) => {
                if let Err(err) = report_time(env, session).await {
                    session.time = before;
                    warn!(%federate, time = %granted, "Advance not reported, clock restored");
                    return Err(err);
                }
                session.push_callback(Callback::TimeAdvanceGrant { time: granted });
                debug!(%federate, time = %granted, "Advance granted immediately");
            }
            AdvanceDecision::Pending(target) => {
                let waker = GrantWaker::new(federate, env.inbox.clone());
                if let Err(err) = env
                    .coordinator
                    .request_time_advance(federate, target, waker)
                    .await
                {
                    session.time.abandon_advance();
                    return Err(err.into());
                }
                debug!(%federate, %target, "Advance pending coordinator grant");
            }
        }

        context.success(Response::TimeAdvance(decision))?;
        Ok(())
    }
}

// =============================================================================
// INCOMING GRANT CHAIN
// =============================================================================

/// `Requested -> Granted`, moving the clock to the granted time.
#[derive(Default)]
pub struct ApplyGrantHandler;

impl ApplyGrantHandler {
    const NAME: &'static str = "ApplyGrant";
}

#[async_trait]
impl MessageHandler for ApplyGrantHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let Payload::TimeAdvanceGrant { time } = *context.request().payload() else {
            return Err(Interrupt::Veto("not a grant"));
        };
        session.time.apply_grant(time)?;
        Ok(())
    }
}

/// Release held deliveries up to the new clock, before the grant callback.
#[derive(Default)]
pub struct ReleaseTimestampedHandler;

impl ReleaseTimestampedHandler {
    const NAME: &'static str = "ReleaseTimestamped";
}

#[async_trait]
impl MessageHandler for ReleaseTimestampedHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        _context: &mut MessageContext,
    ) -> HandlerResult {
        let now = session.time.current();
        let released = release_held(session, Some(now));
        if released > 0 {
            debug!(released, time = %now, "Released held deliveries");
        }
        Ok(())
    }
}

/// `Granted -> Idle`: grant callback plus time report.
#[derive(Default)]
pub struct CompleteGrantHandler {
    binding: Binding,
}

impl CompleteGrantHandler {
    const NAME: &'static str = "CompleteGrant";
}

#[async_trait]
impl MessageHandler for CompleteGrantHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, env: &HandlerEnv) {
        self.binding.bind(env);
    }

    async fn process(
        &self,
        session: &mut FederateSession,
        _context: &mut MessageContext,
    ) -> HandlerResult {
        let env = self.binding.env(Self::NAME)?;
        let time = session.time.complete_grant()?;
        session.push_callback(Callback::TimeAdvanceGrant { time });
        debug!(%time, "Time advance grant completed");
        report_time(env, session).await
    }
}
