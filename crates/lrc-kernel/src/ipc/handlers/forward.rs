//! Last step of the outgoing chains that reach other federates.

use crate::domain::FederateSession;
use crate::ipc::context::MessageContext;
use crate::ipc::handler::{prepare_outgoing, Binding, HandlerEnv, HandlerResult, MessageHandler};
use async_trait::async_trait;
use tracing::trace;

/// Fills in the routing header and hands the message to the connection.
#[derive(Default)]
pub struct ForwardHandler {
    binding: Binding,
}

impl ForwardHandler {
    const NAME: &'static str = "Forward";
}

#[async_trait]
impl MessageHandler for ForwardHandler {
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
        prepare_outgoing(context.request_mut(), session, None)?;

        let message = context.request().clone();
        let (kind, timestamp) = (message.kind(), message.timestamp());
        env.connection.send(message).await?;
        trace!(%kind, ?timestamp, "Forwarded");
        Ok(())
    }
}
