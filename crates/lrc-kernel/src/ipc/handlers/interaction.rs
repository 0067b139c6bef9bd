//! Outgoing interactions.

use crate::domain::FederateSession;
use crate::error::KernelError;
use crate::ipc::context::MessageContext;
use crate::ipc::handler::{
    check_send_time, Binding, HandlerEnv, HandlerResult, Interrupt, MessageHandler,
};
use async_trait::async_trait;
use lrc_types::Payload;
use tracing::trace;

/// Validates class, parameters and publication of an interaction and
/// resolves its region tokens.
#[derive(Default)]
pub struct SendInteractionHandler {
    binding: Binding,
}

impl SendInteractionHandler {
    const NAME: &'static str = "SendInteraction";
}

#[async_trait]
impl MessageHandler for SendInteractionHandler {
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
        let (class, resolved) = match context.request().payload() {
            Payload::SendInteraction {
                class,
                parameters,
                region_tokens,
                ..
            } => {
                env.model
                    .require_interaction_class(*class)?
                    .check_parameters(&parameters.handles())?;
                if !session.interest.is_interaction_published(*class) {
                    return Err(KernelError::InteractionClassNotPublished { class: *class }.into());
                }
                check_send_time(context.request(), session)?;
                (*class, session.regions.resolve(region_tokens)?)
            }
            _ => return Err(Interrupt::Veto("not an interaction")),
        };

        if let Payload::SendInteraction { regions, .. } = context.request_mut().payload_mut() {
            *regions = resolved;
        }
        trace!(%class, "Interaction validated");
        Ok(())
    }
}
