//! # LRC Kernel Benchmarks
//!
//! | Path | Shape |
//! |------|-------|
//! | Region filter | O(P x S x D) pairwise overlap |
//! | Incoming dispatch | guards + interest + TSO + deliver per message |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lrc_kernel::domain::region_filter_passes;
use lrc_kernel::{InMemoryFederation, InMemoryObjectModel, InboundQueue, KernelConfig, LocalKernel};
use lrc_types::{
    DimensionHandle, Extent, FederateHandle, InteractionClassHandle, Message, ParameterHandle,
    ParameterValueMap, Payload, Region, RegionToken, SpaceHandle,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// REGION FILTER
// ============================================================================

fn random_regions(count: u32, dimensions: u32) -> Vec<Region> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|token| {
            (1..=dimensions).fold(
                Region::new(RegionToken(token), SpaceHandle(1)),
                |region, d| {
                    let lower = rng.gen_range(0..900);
                    let upper = lower + rng.gen_range(1..100);
                    region.with_extent(DimensionHandle(d), Extent::new(lower, upper))
                },
            )
        })
        .collect()
}

fn bench_region_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("region-filter");
    group.measurement_time(Duration::from_secs(5));

    for size in [1u32, 8, 32, 128] {
        let subscriber = random_regions(size, 3);
        let publisher = random_regions(size, 3);

        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::new("pairwise", size), &size, |b, _| {
            b.iter(|| black_box(region_filter_passes(&subscriber, &publisher)))
        });
    }

    group.finish();
}

// ============================================================================
// INCOMING DISPATCH
// ============================================================================

const FIRE: InteractionClassHandle = InteractionClassHandle(1);

fn model() -> Arc<InMemoryObjectModel> {
    Arc::new(
        InMemoryObjectModel::builder()
            .interaction_class("Fire", &["target", "power"])
            .build(),
    )
}

fn subscribed_kernel(runtime: &tokio::runtime::Runtime) -> (LocalKernel, FederateHandle) {
    let federation = InMemoryFederation::new("Bench");
    let queue = InboundQueue::new();
    let endpoint = federation.connect(queue.sender());
    let mut kernel = LocalKernel::new(
        KernelConfig::default(),
        model(),
        queue,
        endpoint.clone(),
        endpoint,
    );

    runtime.block_on(async {
        for payload in [
            Payload::JoinFederation {
                federation_name: "Bench".to_string(),
                federate_name: "receiver".to_string(),
                federate_type: "bench".to_string(),
            },
            Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: Vec::new(),
            },
        ] {
            let _ = kernel.request(Message::new(payload)).await;
        }
    });

    let federate = kernel
        .session()
        .federate()
        .unwrap_or(FederateHandle(1));
    (kernel, FederateHandle(federate.value() + 1))
}

fn bench_incoming_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("incoming-dispatch");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| panic!("runtime: {e}"));
    let (mut kernel, producer) = subscribed_kernel(&runtime);
    let sender = kernel.sender();

    for batch in [1usize, 64, 1024] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("interactions", batch), &batch, |b, &batch| {
            b.iter(|| {
                for i in 0..batch {
                    let message = Message::new(Payload::SendInteraction {
                        class: FIRE,
                        parameters: ParameterValueMap::new()
                            .with(ParameterHandle(2), i.to_le_bytes().to_vec()),
                        region_tokens: Vec::new(),
                        regions: Vec::new(),
                    })
                    .from_federate(producer);
                    let _ = sender.enqueue(message);
                }
                let dispatched = runtime.block_on(kernel.drain_ready());
                kernel.take_callbacks();
                black_box(dispatched)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_region_filter, bench_incoming_dispatch);
criterion_main!(benches);
