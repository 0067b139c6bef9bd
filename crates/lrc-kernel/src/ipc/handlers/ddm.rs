//! Data distribution management: region create/modify/delete.

use crate::domain::FederateSession;
use crate::error::KernelError;
use crate::ipc::context::{MessageContext, Response};
use crate::ipc::handler::{Binding, HandlerEnv, HandlerResult, Interrupt, MessageHandler};
use async_trait::async_trait;
use lrc_types::Payload;
use tracing::debug;

#[derive(Default)]
pub struct RegionHandler {
    binding: Binding,
}

impl RegionHandler {
    const NAME: &'static str = "Region";
}

#[async_trait]
impl MessageHandler for RegionHandler {
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

        match context.request().payload().clone() {
            Payload::CreateRegion { space, extents } => {
                let info = env.model.require_space(space)?;
                let token = session.regions.create(&info, extents)?;
                debug!(%token, %space, "Region created");
                context.success(Response::RegionCreated { token })?;
            }
            Payload::ModifyRegion { token, extents } => {
                let space = session.regions.get(token)?.space;
                let info = env.model.require_space(space)?;
                session.regions.modify(token, &info, extents)?;
                debug!(%token, "Region modified");
            }
            Payload::DeleteRegion { token } => {
                session.regions.get(token)?;
                if session.interest.region_in_use(token) {
                    return Err(KernelError::RegionInUse { token }.into());
                }
                session.regions.delete(token)?;
                debug!(%token, "Region deleted");
            }
            _ => return Err(Interrupt::Veto("not a region request")),
        }
        Ok(())
    }
}
