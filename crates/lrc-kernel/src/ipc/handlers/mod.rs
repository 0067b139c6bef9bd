//! # Standard Handler Chains
//!
//! ```text
//! Outgoing
//!   JoinFederation          [Join]
//!   ResignFederation        [Resign]
//!   time switches           [TimeSwitch]
//!   TimeAdvanceRequest      [TimeAdvanceRequest]
//!   declarations            [Declaration]
//!   regions                 [Region]
//!   RegisterObject          [RegisterObject]
//!   UpdateAttributes        [UpdateAttributes, Forward, CommitUpdate]
//!   DeleteObject            [AuthorizeDelete, Forward, CommitDelete]
//!   SendInteraction         [SendInteraction, Forward]
//!
//! Incoming (after the joined / not-from-us / addressed-to-us guards)
//!   RegisterObject          [Discover]
//!   UpdateAttributes        [InterestFilter, HoldForTso, Deliver]
//!   SendInteraction         [InterestFilter, HoldForTso, Deliver]
//!   DeleteObject            [HoldForTso, Deliver]
//!   TimeAdvanceGrant        [target is us, source is us,
//!                            ApplyGrant, ReleaseTimestamped, CompleteGrant]
//! ```

mod declaration;
mod ddm;
mod delivery;
mod federation;
mod forward;
mod interaction;
mod object;
mod time;

pub use declaration::DeclarationHandler;
pub use ddm::RegionHandler;
pub use federation::{JoinHandler, ResignHandler};
pub use forward::ForwardHandler;
pub use interaction::SendInteractionHandler;
pub use object::{
    AuthorizeDeleteHandler, CommitDeleteHandler, CommitUpdateHandler, DeliverHandler,
    DiscoverHandler, HoldForTsoHandler, InterestFilterHandler, RegisterObjectHandler,
    UpdateAttributesHandler,
};
pub use time::{
    ApplyGrantHandler, CompleteGrantHandler, ReleaseTimestampedHandler, TimeAdvanceHandler,
    TimeSwitchHandler,
};

use crate::ipc::dispatcher::{Direction, Dispatcher};
use crate::ipc::handler::{
    veto_if_source_is_us, veto_unless_joined, veto_unless_source_is_us,
    veto_unless_target_is_us, veto_unless_target_is_us_or_broadcast, Guard, MessageHandler,
};
use lrc_types::MessageKind;

/// Guards every incoming federation delivery passes first.
fn delivery_guards() -> Vec<Box<dyn MessageHandler>> {
    vec![
        Box::new(Guard::new("UnlessJoined", veto_unless_joined)),
        Box::new(Guard::new("IfSourceIsUs", veto_if_source_is_us)),
        Box::new(Guard::new(
            "UnlessTargetIsUsOrBroadcast",
            veto_unless_target_is_us_or_broadcast,
        )),
    ]
}

fn register_chain(
    dispatcher: &mut Dispatcher,
    direction: Direction,
    kind: MessageKind,
    chain: Vec<Box<dyn MessageHandler>>,
) {
    for handler in chain {
        dispatcher.register(direction, kind, handler);
    }
}

/// Dispatcher with every chain the kernel serves. Unconfigured.
#[must_use]
pub fn standard_dispatcher() -> Dispatcher {
    use Direction::{Incoming, Outgoing};
    use MessageKind as K;

    let mut d = Dispatcher::new();

    // Federation management
    d.register(Outgoing, K::JoinFederation, Box::new(JoinHandler::default()));
    d.register(Outgoing, K::ResignFederation, Box::new(ResignHandler::default()));

    // Time management
    for kind in [
        K::EnableTimeRegulation,
        K::DisableTimeRegulation,
        K::EnableTimeConstrained,
        K::DisableTimeConstrained,
        K::ModifyLookahead,
    ] {
        d.register(Outgoing, kind, Box::new(TimeSwitchHandler::default()));
    }
    d.register(
        Outgoing,
        K::TimeAdvanceRequest,
        Box::new(TimeAdvanceHandler::default()),
    );
    register_chain(
        &mut d,
        Incoming,
        K::TimeAdvanceGrant,
        vec![
            Box::new(Guard::new("UnlessTargetIsUs", veto_unless_target_is_us)),
            Box::new(Guard::new("UnlessSourceIsUs", veto_unless_source_is_us)),
            Box::new(ApplyGrantHandler),
            Box::new(ReleaseTimestampedHandler),
            Box::new(CompleteGrantHandler::default()),
        ],
    );

    // Declaration management
    for kind in [
        K::PublishObjectClass,
        K::UnpublishObjectClass,
        K::SubscribeObjectClass,
        K::UnsubscribeObjectClass,
        K::PublishInteractionClass,
        K::UnpublishInteractionClass,
        K::SubscribeInteractionClass,
        K::UnsubscribeInteractionClass,
    ] {
        d.register(Outgoing, kind, Box::new(DeclarationHandler::default()));
    }

    // Data distribution management
    for kind in [K::CreateRegion, K::ModifyRegion, K::DeleteRegion] {
        d.register(Outgoing, kind, Box::new(RegionHandler::default()));
    }

    // Object management
    d.register(
        Outgoing,
        K::RegisterObject,
        Box::new(RegisterObjectHandler::default()),
    );
    register_chain(
        &mut d,
        Outgoing,
        K::UpdateAttributes,
        vec![
            Box::new(UpdateAttributesHandler::default()),
            Box::new(ForwardHandler::default()),
            Box::new(CommitUpdateHandler),
        ],
    );
    register_chain(
        &mut d,
        Outgoing,
        K::DeleteObject,
        vec![
            Box::new(AuthorizeDeleteHandler),
            Box::new(ForwardHandler::default()),
            Box::new(CommitDeleteHandler),
        ],
    );

    let mut discover = delivery_guards();
    discover.push(Box::new(DiscoverHandler));
    register_chain(&mut d, Incoming, K::RegisterObject, discover);

    for kind in [K::UpdateAttributes, K::SendInteraction] {
        let mut chain = delivery_guards();
        chain.push(Box::new(InterestFilterHandler));
        chain.push(Box::new(HoldForTsoHandler::default()));
        chain.push(Box::new(DeliverHandler));
        register_chain(&mut d, Incoming, kind, chain);
    }

    let mut removal = delivery_guards();
    removal.push(Box::new(HoldForTsoHandler::default()));
    removal.push(Box::new(DeliverHandler));
    register_chain(&mut d, Incoming, K::DeleteObject, removal);

    // Interactions
    register_chain(
        &mut d,
        Outgoing,
        K::SendInteraction,
        vec![
            Box::new(SendInteractionHandler::default()),
            Box::new(ForwardHandler::default()),
        ],
    );

    d
}
