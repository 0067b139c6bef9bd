//! Declaration management: publish/unpublish and subscribe/unsubscribe for
//! object and interaction classes.
//!
//! Declarations are local. Every class, attribute and region referenced is
//! checked before the interest manager is touched.

use crate::domain::FederateSession;
use crate::error::KernelError;
use crate::ipc::context::MessageContext;
use crate::ipc::handler::{Binding, HandlerEnv, HandlerResult, Interrupt, MessageHandler};
use async_trait::async_trait;
use lrc_types::Payload;
use tracing::debug;

#[derive(Default)]
pub struct DeclarationHandler {
    binding: Binding,
}

impl DeclarationHandler {
    const NAME: &'static str = "Declaration";
}

#[async_trait]
impl MessageHandler for DeclarationHandler {
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
        let model = env.model.as_ref();

        match context.request().payload() {
            Payload::PublishObjectClass { class, attributes } => {
                model.require_object_class(*class)?.check_attributes(attributes)?;
                session
                    .interest
                    .publish_object_class(*class, attributes.clone());
                debug!(%class, count = attributes.len(), "Object class published");
            }
            Payload::UnpublishObjectClass { class } => {
                model.require_object_class(*class)?;
                if !session.interest.unpublish_object_class(*class) {
                    return Err(KernelError::ObjectClassNotPublished { class: *class }.into());
                }
                debug!(%class, "Object class unpublished");
            }
            Payload::SubscribeObjectClass {
                class,
                attributes,
                regions,
            } => {
                model.require_object_class(*class)?.check_attributes(attributes)?;
                session.regions.resolve(regions)?;
                session
                    .interest
                    .subscribe_object_class(*class, attributes.clone(), regions.clone());
                debug!(%class, count = attributes.len(), regions = regions.len(), "Object class subscribed");
            }
            Payload::UnsubscribeObjectClass { class } => {
                model.require_object_class(*class)?;
                session.interest.unsubscribe_object_class(*class);
                debug!(%class, "Object class unsubscribed");
            }
            Payload::PublishInteractionClass { class } => {
                model.require_interaction_class(*class)?;
                session.interest.publish_interaction_class(*class);
                debug!(%class, "Interaction class published");
            }
            Payload::UnpublishInteractionClass { class } => {
                model.require_interaction_class(*class)?;
                if !session.interest.unpublish_interaction_class(*class) {
                    return Err(
                        KernelError::InteractionClassNotPublished { class: *class }.into()
                    );
                }
                debug!(%class, "Interaction class unpublished");
            }
            Payload::SubscribeInteractionClass { class, regions } => {
                model.require_interaction_class(*class)?;
                session.regions.resolve(regions)?;
                session
                    .interest
                    .subscribe_interaction_class(*class, regions.clone());
                debug!(%class, regions = regions.len(), "Interaction class subscribed");
            }
            Payload::UnsubscribeInteractionClass { class } => {
                model.require_interaction_class(*class)?;
                session.interest.unsubscribe_interaction_class(*class);
                debug!(%class, "Interaction class unsubscribed");
            }
            _ => return Err(Interrupt::Veto("not a declaration")),
        }
        Ok(())
    }
}
