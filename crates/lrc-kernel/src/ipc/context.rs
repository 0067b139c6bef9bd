//! Message context: one request paired with its single-assignment response slot.

use crate::domain::AdvanceDecision;
use crate::error::{KernelError, KernelResult};
use lrc_types::{
    FederateHandle, FederationHandle, LogicalTime, Message, ObjectInstanceHandle, RegionToken,
};

/// Success payload written by a handler.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Processed, nothing to report.
    Ack,
    Joined {
        federate: FederateHandle,
        federation: FederationHandle,
    },
    TimeAdvance(AdvanceDecision),
    RegionCreated {
        token: RegionToken,
    },
    ObjectRegistered {
        instance: ObjectInstanceHandle,
    },
    /// Held for time-stamp-ordered delivery until the clock reaches `until`.
    Held {
        until: LogicalTime,
    },
    /// Delivered to the federate application.
    Delivered,
}

/// The single result of dispatching one message.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(Response),
    Error(KernelError),
    /// Every applicable handler declined; distinct from success and error.
    NoHandlerApplicable,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Error outcomes become `Err`; everything else is `Ok`.
    pub fn into_result(self) -> KernelResult<Option<Response>> {
        match self {
            Outcome::Success(response) => Ok(Some(response)),
            Outcome::Error(err) => Err(err),
            Outcome::NoHandlerApplicable => Ok(None),
        }
    }
}

#[derive(Debug)]
pub struct MessageContext {
    request: Message,
    response: Option<Result<Response, KernelError>>,
}

impl MessageContext {
    #[must_use]
    pub fn new(request: Message) -> Self {
        Self {
            request,
            response: None,
        }
    }

    pub fn request(&self) -> &Message {
        &self.request
    }

    /// Handlers on the outgoing path prepare the request in place.
    pub fn request_mut(&mut self) -> &mut Message {
        &mut self.request
    }

    pub fn into_request(self) -> Message {
        self.request
    }

    fn resolve(&mut self, value: Result<Response, KernelError>) -> KernelResult<()> {
        if self.response.is_some() {
            return Err(KernelError::ContextAlreadyResolved {
                kind: self.request.kind(),
            });
        }
        self.response = Some(value);
        Ok(())
    }

    /// Write the success payload. A second write is a fatal fault.
    pub fn success(&mut self, response: Response) -> KernelResult<()> {
        self.resolve(Ok(response))
    }

    /// Write the error payload. A second write is a fatal fault.
    pub fn error(&mut self, error: KernelError) -> KernelResult<()> {
        self.resolve(Err(error))
    }

    pub fn is_resolved(&self) -> bool {
        self.response.is_some()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.response, Some(Err(_)))
    }

    pub fn response(&self) -> Option<&Result<Response, KernelError>> {
        self.response.as_ref()
    }

    /// Re-raise an error response so a caller chaining requests can use `?`.
    pub fn check_for_error(&self) -> KernelResult<()> {
        match &self.response {
            Some(Err(err)) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Final outcome once the chain has run.
    ///
    /// An empty slot means acknowledgement if every handler ran, and
    /// no-handler-applicable if the chain was vetoed.
    pub(crate) fn into_outcome(self, vetoed: bool) -> Outcome {
        match self.response {
            Some(Ok(response)) => Outcome::Success(response),
            Some(Err(err)) => Outcome::Error(err),
            None if vetoed => Outcome::NoHandlerApplicable,
            None => Outcome::Success(Response::Ack),
        }
    }
}
