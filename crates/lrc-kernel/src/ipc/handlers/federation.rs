//! Federation management: join and resign.
//!
//! These two handlers are the only code that moves the session lifecycle.

use crate::domain::{FederateSession, Membership};
use crate::error::KernelError;
use crate::ipc::context::{MessageContext, Response};
use crate::ipc::handler::{Binding, HandlerEnv, HandlerResult, Interrupt, MessageHandler};
use crate::ports::JoinRequest;
use async_trait::async_trait;
use lrc_types::Payload;
use tracing::{info, warn};

#[derive(Default)]
pub struct JoinHandler {
    binding: Binding,
}

impl JoinHandler {
    const NAME: &'static str = "JoinFederation";
}

#[async_trait]
impl MessageHandler for JoinHandler {
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
        let Payload::JoinFederation {
            federation_name,
            federate_name,
            federate_type,
        } = context.request().payload().clone()
        else {
            return Err(Interrupt::Veto("not a join request"));
        };

        session.ensure_unjoined()?;

        let grant = env
            .coordinator
            .join(JoinRequest {
                federation_name: federation_name.clone(),
                federate_name: federate_name.clone(),
                federate_type: federate_type.clone(),
            })
            .await?;

        session.join(Membership {
            federate: grant.federate,
            federation: grant.federation,
            federation_name,
            federate_name,
            federate_type,
        })?;

        info!(
            federate = %grant.federate,
            federation = %grant.federation,
            "[lrc] Joined federation"
        );
        context.success(Response::Joined {
            federate: grant.federate,
            federation: grant.federation,
        })?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ResignHandler {
    binding: Binding,
}

impl ResignHandler {
    const NAME: &'static str = "ResignFederation";
}

#[async_trait]
impl MessageHandler for ResignHandler {
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
        let federate = session.begin_resign()?;

        if let Err(err) = env.coordinator.resign(federate).await {
            session.abort_resign();
            warn!(%federate, error = %err, "Resign refused, still joined");
            return Err(Interrupt::Fail(KernelError::from(err)));
        }

        let discarded = session.tso.len();
        session.complete_resign();
        info!(%federate, discarded, "[lrc] Resigned from federation");
        Ok(())
    }
}
