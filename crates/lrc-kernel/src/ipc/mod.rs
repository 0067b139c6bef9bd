//! IPC layer: the inbound queue, message contexts and the handler chains
//! that process every request and delivery.

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod queue;

pub use context::{MessageContext, Outcome, Response};
pub use dispatcher::{Direction, Dispatcher};
pub use handler::{
    check_send_time, prepare_outgoing, Binding, Guard, HandlerEnv, HandlerResult, Interrupt,
    MessageHandler, Step,
};
pub use handlers::standard_dispatcher;
pub use queue::{InboundQueue, InboundSender};
