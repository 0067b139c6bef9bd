//! # Dispatcher
//!
//! Routes each message to the handler chain registered for its direction and
//! kind, runs the chain against a fresh `MessageContext` and turns the result
//! into exactly one `Outcome`.
//!
//! - Continue: next handler.
//! - Veto: stop; an empty response slot becomes `NoHandlerApplicable`.
//! - Fail: stop; the error goes into the response slot. Fatal faults are
//!   returned as `Err` instead and end the session.

use crate::domain::FederateSession;
use crate::error::{KernelError, KernelResult};
use crate::ipc::context::{MessageContext, Outcome};
use crate::ipc::handler::{HandlerEnv, MessageHandler, Step};
use lrc_types::{Message, MessageKind};
use std::collections::HashMap;
use tracing::{debug, error, trace, warn};

/// Where a message came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Request issued by the local federate.
    Outgoing,
    /// Delivered by the federation or re-injected by the kernel.
    Incoming,
}

struct Registered {
    handler: Box<dyn MessageHandler>,
    configured: bool,
}

#[derive(Default)]
pub struct Dispatcher {
    chains: HashMap<(Direction, MessageKind), Vec<Registered>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the chain for `(direction, kind)`.
    pub fn register(
        &mut self,
        direction: Direction,
        kind: MessageKind,
        handler: Box<dyn MessageHandler>,
    ) {
        self.chains
            .entry((direction, kind))
            .or_default()
            .push(Registered {
                handler,
                configured: false,
            });
    }

    /// Bind every registered handler to the session's collaborators.
    pub fn configure(&mut self, env: &HandlerEnv) {
        for registered in self.chains.values_mut().flatten() {
            registered.handler.configure(env);
            registered.configured = true;
        }
    }

    /// Handler names of one chain, in order.
    pub fn chain(&self, direction: Direction, kind: MessageKind) -> Vec<&'static str> {
        self.chains
            .get(&(direction, kind))
            .map(|chain| chain.iter().map(|r| r.handler.name()).collect())
            .unwrap_or_default()
    }

    pub async fn dispatch(
        &self,
        direction: Direction,
        session: &mut FederateSession,
        message: Message,
    ) -> KernelResult<Outcome> {
        let kind = message.kind();
        let federate = session.federate();
        debug!(?federate, ?direction, %kind, "Dispatching message");

        // Local requests needing membership are refused before any handler
        // can touch state.
        if direction == Direction::Outgoing && kind.requires_membership() {
            if let Err(err) = session.joined() {
                warn!(%kind, error = %err, "Request rejected");
                return Ok(Outcome::Error(err));
            }
        }

        let Some(chain) = self.chains.get(&(direction, kind)) else {
            debug!(?direction, %kind, "No chain registered");
            return Ok(Outcome::NoHandlerApplicable);
        };

        let mut context = MessageContext::new(message);
        let mut vetoed = false;

        for registered in chain {
            let name = registered.handler.name();
            if !registered.configured {
                error!(handler = name, %kind, "Handler used before configuration");
                return Err(KernelError::HandlerNotConfigured { handler: name });
            }

            match Step::from(registered.handler.process(session, &mut context).await) {
                Step::Continue => {}
                Step::Veto(reason) => {
                    trace!(handler = name, %kind, reason, "Vetoed");
                    vetoed = true;
                    break;
                }
                Step::Fail(err) if err.is_fatal() => {
                    error!(handler = name, %kind, error = %err, "Fatal handler fault");
                    return Err(err);
                }
                Step::Fail(err) => {
                    warn!(handler = name, %kind, error = %err, "Handler failed");
                    context.error(err)?;
                    break;
                }
            }
        }

        let outcome = context.into_outcome(vetoed);
        debug!(?federate, %kind, ?outcome, "Dispatch complete");
        Ok(outcome)
    }
}
