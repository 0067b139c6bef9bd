//! # Interest Flows
//!
//! Subscription-driven delivery across federates: attribute subsets,
//! region overlap and region modification.

#[cfg(test)]
mod tests {
    use crate::harness::{sample_model, TestFederate};
    use lrc_kernel::{Callback, InMemoryFederation, Outcome, Response};
    use lrc_types::{
        AttributeHandle, AttributeValueMap, DimensionHandle, Extent, InteractionClassHandle,
        ObjectClassHandle, ObjectInstanceHandle, ParameterValueMap, Payload, RegionToken,
        SpaceHandle,
    };
    use std::collections::{BTreeMap, BTreeSet};

    const VEHICLE: ObjectClassHandle = ObjectClassHandle(1);
    const POSITION: AttributeHandle = AttributeHandle(1);
    const VELOCITY: AttributeHandle = AttributeHandle(2);
    const FUEL: AttributeHandle = AttributeHandle(3);
    const FIRE: InteractionClassHandle = InteractionClassHandle(1);
    const GEO: SpaceHandle = SpaceHandle(1);
    const X: DimensionHandle = DimensionHandle(1);

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn attrs(handles: &[AttributeHandle]) -> BTreeSet<AttributeHandle> {
        handles.iter().copied().collect()
    }

    fn along_x(lower: u64, upper: u64) -> BTreeMap<DimensionHandle, Extent> {
        BTreeMap::from([(X, Extent::new(lower, upper))])
    }

    fn update(instance: ObjectInstanceHandle, values: &[AttributeHandle]) -> Payload {
        let values = values
            .iter()
            .fold(AttributeValueMap::new(), |map, handle| {
                map.with(*handle, format!("v{handle}").into_bytes())
            });
        Payload::UpdateAttributes {
            instance,
            class: VEHICLE,
            values,
            region_tokens: Vec::new(),
            regions: Vec::new(),
        }
    }

    fn fire_in(region_tokens: Vec<RegionToken>) -> Payload {
        Payload::SendInteraction {
            class: FIRE,
            parameters: ParameterValueMap::new(),
            region_tokens,
            regions: Vec::new(),
        }
    }

    async fn create_region(federate: &mut TestFederate, lower: u64, upper: u64) -> RegionToken {
        let outcome = federate
            .request(Payload::CreateRegion {
                space: GEO,
                extents: along_x(lower, upper),
            })
            .await;
        match outcome {
            Outcome::Success(Response::RegionCreated { token }) => token,
            other => panic!("region not created: {other:?}"),
        }
    }

    async fn register_vehicle(owner: &mut TestFederate, name: &str) -> ObjectInstanceHandle {
        let outcome = owner
            .request(Payload::RegisterObject {
                class: VEHICLE,
                instance: None,
                name: Some(name.to_string()),
            })
            .await;
        match outcome {
            Outcome::Success(Response::ObjectRegistered { instance }) => instance,
            other => panic!("registration failed: {other:?}"),
        }
    }

    // =========================================================================
    // ATTRIBUTE INTEREST
    // =========================================================================

    #[tokio::test]
    async fn test_reflections_carry_only_subscribed_attributes() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut owner = TestFederate::join(&federation, model.clone(), "owner").await;
        let mut narrow = TestFederate::join(&federation, model.clone(), "narrow").await;
        let mut wide = TestFederate::join(&federation, model, "wide").await;

        narrow
            .request(Payload::SubscribeObjectClass {
                class: VEHICLE,
                attributes: attrs(&[POSITION]),
                regions: Vec::new(),
            })
            .await;
        wide.request(Payload::SubscribeObjectClass {
            class: VEHICLE,
            attributes: attrs(&[POSITION, VELOCITY]),
            regions: Vec::new(),
        })
        .await;
        owner
            .request(Payload::PublishObjectClass {
                class: VEHICLE,
                attributes: attrs(&[POSITION, VELOCITY, FUEL]),
            })
            .await;

        let tank = register_vehicle(&mut owner, "tank").await;
        for subscriber in [&mut narrow, &mut wide] {
            assert_eq!(
                subscriber.next_outcome().await,
                Some(Outcome::Success(Response::Delivered))
            );
            assert_eq!(
                subscriber.callbacks(),
                vec![Callback::DiscoverObject {
                    instance: tank,
                    class: VEHICLE,
                    name: "tank".to_string(),
                }]
            );
        }

        assert!(owner
            .request(update(tank, &[POSITION, VELOCITY]))
            .await
            .is_success());
        narrow.pump().await;
        wide.pump().await;

        let reflected = |callbacks: Vec<Callback>| match callbacks.as_slice() {
            [Callback::ReflectAttributes { values, .. }] => values.handles(),
            other => panic!("expected one reflection, got {other:?}"),
        };
        assert_eq!(reflected(narrow.callbacks()), attrs(&[POSITION]));
        assert_eq!(reflected(wide.callbacks()), attrs(&[POSITION, VELOCITY]));

        // Nobody subscribed to fuel.
        owner.request(update(tank, &[FUEL])).await;
        assert_eq!(
            narrow.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );
        assert_eq!(wide.next_outcome().await, Some(Outcome::NoHandlerApplicable));
        assert!(narrow.callbacks().is_empty());
        assert!(wide.callbacks().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribed_federate_never_discovers() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut owner = TestFederate::join(&federation, model.clone(), "owner").await;
        let mut bystander = TestFederate::join(&federation, model, "bystander").await;

        owner
            .request(Payload::PublishObjectClass {
                class: VEHICLE,
                attributes: attrs(&[POSITION]),
            })
            .await;
        let tank = register_vehicle(&mut owner, "tank").await;
        owner.request(update(tank, &[POSITION])).await;

        assert_eq!(
            bystander.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );
        assert_eq!(
            bystander.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );
        assert!(bystander.callbacks().is_empty());
        assert!(bystander.kernel.session().repository.is_empty());
    }

    // =========================================================================
    // REGION FILTERING
    // =========================================================================

    #[tokio::test]
    async fn test_interaction_delivery_follows_region_overlap() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut sender = TestFederate::join(&federation, model.clone(), "sender").await;
        let mut receiver = TestFederate::join(&federation, model, "receiver").await;

        let watched = create_region(&mut receiver, 0, 100).await;
        receiver
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: vec![watched],
            })
            .await;

        sender
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        let near = create_region(&mut sender, 50, 150).await;
        let far = create_region(&mut sender, 200, 300).await;

        sender.request(fire_in(vec![near])).await;
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );

        sender.request(fire_in(vec![far])).await;
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );

        // No publisher regions: the region filter passes.
        sender.request(fire_in(Vec::new())).await;
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );
        assert_eq!(receiver.callbacks().len(), 2);
    }

    #[tokio::test]
    async fn test_modified_subscription_region_is_reevaluated() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut sender = TestFederate::join(&federation, model.clone(), "sender").await;
        let mut receiver = TestFederate::join(&federation, model, "receiver").await;

        let watched = create_region(&mut receiver, 0, 100).await;
        receiver
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: vec![watched],
            })
            .await;
        sender
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        let near = create_region(&mut sender, 50, 150).await;
        let far = create_region(&mut sender, 200, 300).await;

        assert!(receiver
            .request(Payload::ModifyRegion {
                token: watched,
                extents: along_x(250, 400),
            })
            .await
            .is_success());

        sender.request(fire_in(vec![near])).await;
        sender.request(fire_in(vec![far])).await;
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );

        // Subscribed regions cannot be deleted.
        assert!(receiver
            .request(Payload::DeleteRegion { token: watched })
            .await
            .is_error());
    }

    #[tokio::test]
    async fn test_update_regions_filter_reflections() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut owner = TestFederate::join(&federation, model.clone(), "owner").await;
        let mut subscriber = TestFederate::join(&federation, model, "subscriber").await;

        let watched = create_region(&mut subscriber, 0, 10).await;
        subscriber
            .request(Payload::SubscribeObjectClass {
                class: VEHICLE,
                attributes: attrs(&[POSITION]),
                regions: vec![watched],
            })
            .await;
        owner
            .request(Payload::PublishObjectClass {
                class: VEHICLE,
                attributes: attrs(&[POSITION]),
            })
            .await;
        let inside = create_region(&mut owner, 5, 5).await;
        let outside = create_region(&mut owner, 10, 20).await;

        let tank = register_vehicle(&mut owner, "tank").await;
        subscriber.pump().await;
        subscriber.callbacks();

        let mut in_region = update(tank, &[POSITION]);
        if let Payload::UpdateAttributes { region_tokens, .. } = &mut in_region {
            region_tokens.push(inside);
        }
        let mut out_of_region = update(tank, &[POSITION]);
        if let Payload::UpdateAttributes { region_tokens, .. } = &mut out_of_region {
            region_tokens.push(outside);
        }

        owner.request(in_region).await;
        owner.request(out_of_region).await;
        assert_eq!(
            subscriber.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );
        // [10, 20) only touches [0, 10)
        assert_eq!(
            subscriber.next_outcome().await,
            Some(Outcome::NoHandlerApplicable)
        );
    }
}
