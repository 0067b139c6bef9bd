//! Deliveries to the federate application, queued on the session until taken.

use lrc_types::{
    AttributeValueMap, FederateHandle, InteractionClassHandle, LogicalInterval, LogicalTime,
    ObjectClassHandle, ObjectInstanceHandle, ParameterValueMap,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Callback {
    DiscoverObject {
        instance: ObjectInstanceHandle,
        class: ObjectClassHandle,
        name: String,
    },
    ReflectAttributes {
        instance: ObjectInstanceHandle,
        values: AttributeValueMap,
        timestamp: Option<LogicalTime>,
        producer: Option<FederateHandle>,
    },
    ReceiveInteraction {
        class: InteractionClassHandle,
        parameters: ParameterValueMap,
        timestamp: Option<LogicalTime>,
        producer: Option<FederateHandle>,
    },
    RemoveObject {
        instance: ObjectInstanceHandle,
        timestamp: Option<LogicalTime>,
    },
    TimeRegulationEnabled {
        time: LogicalTime,
        lookahead: LogicalInterval,
    },
    TimeConstrainedEnabled {
        time: LogicalTime,
    },
    TimeAdvanceGrant {
        time: LogicalTime,
    },
}
