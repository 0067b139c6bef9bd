//! Final delivery of an incoming update, interaction or removal to the
//! federate application. Shared by the delivery handler and by the release
//! of held time-stamp-ordered messages.

use crate::domain::{Callback, FederateSession, InterestClass};
use lrc_types::{Message, Payload};
use std::collections::BTreeSet;
use tracing::trace;

/// Apply `message` to the repository and queue its callback.
///
/// Returns false when nothing was delivered: the instance is unknown, or the
/// subscription no longer covers the message. Interest and region overlap are
/// checked again here since a held message may be released long after it
/// passed the filter.
pub(crate) fn deliver(session: &mut FederateSession, message: Message) -> bool {
    let timestamp = message.timestamp();
    let producer = message.source();

    match message.into_payload() {
        Payload::UpdateAttributes {
            instance,
            class,
            mut values,
            regions,
            ..
        } => {
            if !session.is_interested(InterestClass::Object(class), &values.handles(), &regions) {
                trace!(%instance, "Update no longer within subscribed interest");
                return false;
            }
            let wanted = session
                .interest
                .interested_attributes(class, &values.handles());
            if wanted.is_empty() {
                trace!(%instance, "No subscribed attribute left in update");
                return false;
            }
            values.retain_handles(&wanted);
            if session.repository.reflect(instance, &values).is_err() {
                trace!(%instance, "Reflection for undiscovered instance");
                return false;
            }
            session.push_callback(Callback::ReflectAttributes {
                instance,
                values,
                timestamp,
                producer,
            });
            true
        }
        Payload::SendInteraction {
            class,
            parameters,
            regions,
            ..
        } => {
            if !session.is_interested(InterestClass::Interaction(class), &BTreeSet::new(), &regions)
            {
                trace!(%class, "Interaction no longer within subscribed interest");
                return false;
            }
            session.push_callback(Callback::ReceiveInteraction {
                class,
                parameters,
                timestamp,
                producer,
            });
            true
        }
        Payload::DeleteObject { instance } => {
            if session.repository.remove(instance).is_none() {
                trace!(%instance, "Removal of unknown instance");
                return false;
            }
            session.push_callback(Callback::RemoveObject {
                instance,
                timestamp,
            });
            true
        }
        other => {
            trace!(kind = %other.kind(), "Not a deliverable kind");
            false
        }
    }
}
