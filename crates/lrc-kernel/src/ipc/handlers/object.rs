//! # Object Management Handlers
//!
//! Outgoing: register, update and delete of instances owned by the local
//! federate. Local state changes only after the message has been forwarded.
//! Incoming: discovery, the interest filter, time-stamp-ordered
//! holding and final delivery of remote updates and removals.
//!
//! ```text
//! incoming update:  guards ──→ InterestFilter ──→ HoldForTso ──→ Deliver
//!                                   │                 │
//!                                 veto          Held{until} + veto
//! ```

use crate::domain::{Callback, FederateSession, InterestClass};
use crate::error::KernelError;
use crate::ipc::context::{MessageContext, Response};
use crate::ipc::handler::{
    check_send_time, prepare_outgoing, Binding, HandlerEnv, HandlerResult, Interrupt,
    MessageHandler,
};
use crate::ipc::handlers::delivery::deliver;
use async_trait::async_trait;
use lrc_types::Payload;
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

// =============================================================================
// OUTGOING
// =============================================================================

/// Registers a local instance and announces it to the federation.
#[derive(Default)]
pub struct RegisterObjectHandler {
    binding: Binding,
}

impl RegisterObjectHandler {
    const NAME: &'static str = "RegisterObject";
}

#[async_trait]
impl MessageHandler for RegisterObjectHandler {
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
        let Payload::RegisterObject { class, name, .. } = context.request().payload().clone()
        else {
            return Err(Interrupt::Veto("not a registration"));
        };
        let federate = session.joined()?.federate;

        env.model.require_object_class(class)?;
        if session.interest.published_attributes(class).is_none() {
            return Err(KernelError::ObjectClassNotPublished { class }.into());
        }

        let registered = session.repository.register(federate, class, name)?;
        let (handle, name) = (registered.handle, registered.name.clone());

        if let Payload::RegisterObject { instance, name: slot, .. } =
            context.request_mut().payload_mut()
        {
            *instance = Some(handle);
            *slot = Some(name.clone());
        }
        let mut announcement = context.request().clone();
        if let Err(err) = prepare_outgoing(&mut announcement, session, None) {
            session.repository.remove(handle);
            return Err(err.into());
        }

        if let Err(err) = env.connection.send(announcement).await {
            session.repository.remove(handle);
            warn!(instance = %handle, error = %err, "Registration not announced");
            return Err(err.into());
        }

        debug!(instance = %handle, %class, %name, "Object instance registered");
        context.success(Response::ObjectRegistered { instance: handle })?;
        Ok(())
    }
}

/// Checks ownership, declaration and publication of an attribute update and
/// resolves its region tokens.
#[derive(Default)]
pub struct UpdateAttributesHandler {
    binding: Binding,
}

impl UpdateAttributesHandler {
    const NAME: &'static str = "UpdateAttributes";
}

#[async_trait]
impl MessageHandler for UpdateAttributesHandler {
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
        let Payload::UpdateAttributes {
            instance,
            values,
            region_tokens,
            ..
        } = context.request().payload().clone()
        else {
            return Err(Interrupt::Veto("not an attribute update"));
        };
        let federate = session.joined()?.federate;

        let known = session
            .repository
            .get(instance)
            .ok_or(KernelError::ObjectInstanceNotKnown { instance })?;
        if known.registrar() != federate {
            return Err(KernelError::AttributeNotOwned { instance }.into());
        }
        let class = known.class;

        let updated = values.handles();
        env.model
            .require_object_class(class)?
            .check_attributes(&updated)?;
        let published = session
            .interest
            .published_attributes(class)
            .ok_or(KernelError::ObjectClassNotPublished { class })?;
        if let Some(attribute) = updated.difference(published).next() {
            return Err(KernelError::AttributeNotPublished {
                class,
                attribute: *attribute,
            }
            .into());
        }

        check_send_time(context.request(), session)?;
        let resolved = session.regions.resolve(&region_tokens)?;

        if let Payload::UpdateAttributes {
            class: slot,
            regions,
            ..
        } = context.request_mut().payload_mut()
        {
            *slot = class;
            *regions = resolved;
        }
        trace!(%instance, count = updated.len(), "Update validated");
        Ok(())
    }
}

/// Only the registering federate may delete an instance.
#[derive(Default)]
pub struct AuthorizeDeleteHandler;

impl AuthorizeDeleteHandler {
    const NAME: &'static str = "AuthorizeDelete";
}

#[async_trait]
impl MessageHandler for AuthorizeDeleteHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let Payload::DeleteObject { instance } = *context.request().payload() else {
            return Err(Interrupt::Veto("not a deletion"));
        };
        let federate = session.joined()?.federate;
        let known = session
            .repository
            .get(instance)
            .ok_or(KernelError::ObjectInstanceNotKnown { instance })?;
        if known.registrar() != federate {
            return Err(KernelError::DeletePrivilegeNotHeld { instance }.into());
        }
        check_send_time(context.request(), session)?;
        Ok(())
    }
}

/// Stores the new attribute values once the update has been sent.
#[derive(Default)]
pub struct CommitUpdateHandler;

impl CommitUpdateHandler {
    const NAME: &'static str = "CommitUpdate";
}

#[async_trait]
impl MessageHandler for CommitUpdateHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let Payload::UpdateAttributes {
            instance, values, ..
        } = context.request().payload()
        else {
            return Err(Interrupt::Veto("not an attribute update"));
        };
        session.repository.reflect(*instance, values)?;
        trace!(%instance, "Update committed");
        Ok(())
    }
}

/// Drops the local instance once the deletion has been sent.
#[derive(Default)]
pub struct CommitDeleteHandler;

impl CommitDeleteHandler {
    const NAME: &'static str = "CommitDelete";
}

#[async_trait]
impl MessageHandler for CommitDeleteHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let Payload::DeleteObject { instance } = *context.request().payload() else {
            return Err(Interrupt::Veto("not a deletion"));
        };
        let federate = session.joined()?.federate;
        session.repository.delete_owned(federate, instance)?;
        debug!(%instance, "Object instance deleted");
        Ok(())
    }
}

// =============================================================================
// INCOMING
// =============================================================================

/// Discovers remote instances of subscribed classes.
#[derive(Default)]
pub struct DiscoverHandler;

impl DiscoverHandler {
    const NAME: &'static str = "Discover";
}

#[async_trait]
impl MessageHandler for DiscoverHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let Payload::RegisterObject {
            class,
            instance: Some(instance),
            name,
        } = context.request().payload().clone()
        else {
            return Err(Interrupt::Veto("registration without instance"));
        };
        if session.interest.object_subscription(class).is_none() {
            return Err(Interrupt::Veto("class not subscribed"));
        }
        if session.repository.get(instance).is_some() {
            return Err(Interrupt::Veto("instance already known"));
        }

        let name = name.unwrap_or_else(|| format!("HLAobject_{instance}"));
        session.repository.discover(instance, class, name.clone())?;
        session.push_callback(Callback::DiscoverObject {
            instance,
            class,
            name,
        });
        debug!(%instance, %class, "Object instance discovered");
        context.success(Response::Delivered)?;
        Ok(())
    }
}

/// Vetoes updates and interactions the session is not interested in.
#[derive(Default)]
pub struct InterestFilterHandler;

impl InterestFilterHandler {
    const NAME: &'static str = "InterestFilter";
}

#[async_trait]
impl MessageHandler for InterestFilterHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        let interested = match context.request().payload() {
            Payload::UpdateAttributes {
                class,
                values,
                regions,
                ..
            } => session.is_interested(InterestClass::Object(*class), &values.handles(), regions),
            Payload::SendInteraction { class, regions, .. } => session.is_interested(
                InterestClass::Interaction(*class),
                &BTreeSet::new(),
                regions,
            ),
            _ => true,
        };
        if interested {
            Ok(())
        } else {
            Err(Interrupt::Veto("not interested"))
        }
    }
}

/// Holds timestamped deliveries beyond the current time while constrained.
#[derive(Default)]
pub struct HoldForTsoHandler {
    binding: Binding,
}

impl HoldForTsoHandler {
    const NAME: &'static str = "HoldForTso";
}

#[async_trait]
impl MessageHandler for HoldForTsoHandler {
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
        if !env.time.tso_delivery || !session.is_constrained() {
            return Ok(());
        }
        let Some(until) = context.request().timestamp() else {
            return Ok(());
        };
        if until <= session.time.current() {
            return Ok(());
        }

        session.tso.hold(until, context.request().clone());
        trace!(%until, held = session.tso.len(), "Held for time-stamp order");
        context.success(Response::Held { until })?;
        Err(Interrupt::Veto("held for time-stamp order"))
    }
}

/// Hands the message to the federate application.
#[derive(Default)]
pub struct DeliverHandler;

impl DeliverHandler {
    const NAME: &'static str = "Deliver";
}

#[async_trait]
impl MessageHandler for DeliverHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _env: &HandlerEnv) {}

    async fn process(
        &self,
        session: &mut FederateSession,
        context: &mut MessageContext,
    ) -> HandlerResult {
        if deliver(session, context.request().clone()) {
            context.success(Response::Delivered)?;
            Ok(())
        } else {
            Err(Interrupt::Veto("nothing to deliver"))
        }
    }
}
