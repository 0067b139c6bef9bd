//! Test federates wired to a shared in-memory federation.

use lrc_kernel::{
    Callback, FederationEndpoint, InMemoryFederation, InMemoryObjectModel, InboundQueue,
    KernelConfig, LocalKernel, Outcome, Response,
};
use lrc_types::{FederateHandle, Message, Payload};
use std::sync::Arc;

pub const FEDERATION: &str = "Exercise";

/// Vehicle{position, velocity, fuel}, Fire{target, power}, Geo{x, y}.
pub fn sample_model() -> Arc<InMemoryObjectModel> {
    Arc::new(
        InMemoryObjectModel::builder()
            .object_class("Vehicle", &["position", "velocity", "fuel"])
            .interaction_class("Fire", &["target", "power"])
            .space("Geo", &[("x", 1000), ("y", 1000)])
            .build(),
    )
}

/// One joined federate: a kernel plus its endpoint into the federation.
pub struct TestFederate {
    pub kernel: LocalKernel,
    pub endpoint: Arc<FederationEndpoint>,
}

impl TestFederate {
    /// Build a kernel, connect it and join `name`.
    pub async fn join(
        federation: &InMemoryFederation,
        model: Arc<InMemoryObjectModel>,
        name: &str,
    ) -> Self {
        let mut federate = Self::connect(federation, model);
        let outcome = federate.kernel.request(join(name)).await.expect("join");
        assert!(
            matches!(outcome, Outcome::Success(Response::Joined { .. })),
            "join of {name} failed: {outcome:?}"
        );
        federate
    }

    /// Build and connect a kernel without joining.
    pub fn connect(federation: &InMemoryFederation, model: Arc<InMemoryObjectModel>) -> Self {
        let queue = InboundQueue::new();
        let endpoint = federation.connect(queue.sender());
        let kernel = LocalKernel::new(
            KernelConfig::default(),
            model,
            queue,
            endpoint.clone(),
            endpoint.clone(),
        );
        Self { kernel, endpoint }
    }

    pub fn handle(&self) -> FederateHandle {
        self.kernel
            .session()
            .federate()
            .expect("federate is joined")
    }

    /// Run a local request and return its outcome.
    pub async fn request(&mut self, payload: Payload) -> Outcome {
        self.kernel
            .request(Message::new(payload))
            .await
            .expect("no fatal fault")
    }

    /// Run a prebuilt local request, e.g. one carrying its own timestamp.
    pub async fn send(&mut self, message: Message) -> Outcome {
        self.kernel.request(message).await.expect("no fatal fault")
    }

    /// Dispatch the next queued delivery, if any.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        self.kernel.try_drain_one().await.expect("no fatal fault")
    }

    /// Dispatch everything queued.
    pub async fn pump(&mut self) -> usize {
        self.kernel.drain_ready().await.expect("no fatal fault")
    }

    pub fn callbacks(&mut self) -> Vec<Callback> {
        self.kernel.take_callbacks()
    }
}

pub fn join(name: &str) -> Message {
    Message::new(Payload::JoinFederation {
        federation_name: FEDERATION.to_string(),
        federate_name: name.to_string(),
        federate_type: "scenario".to_string(),
    })
}
