//! # Lifecycle Flows
//!
//! Join and resign against a shared federation, and object instances from
//! registration to removal.

#[cfg(test)]
mod tests {
    use crate::harness::{join, sample_model, TestFederate};
    use lrc_kernel::{
        Callback, CoordinatorError, InMemoryFederation, KernelError, Lifecycle, Outcome, Response,
    };
    use lrc_types::{
        AttributeHandle, AttributeValueMap, ObjectClassHandle, ObjectInstanceHandle, Payload,
    };
    use std::collections::BTreeSet;

    const VEHICLE: ObjectClassHandle = ObjectClassHandle(1);
    const POSITION: AttributeHandle = AttributeHandle(1);

    // =========================================================================
    // FIXTURES
    // =========================================================================

    async fn publishing_owner(federation: &InMemoryFederation) -> TestFederate {
        let mut owner = TestFederate::join(federation, sample_model(), "owner").await;
        owner
            .request(Payload::PublishObjectClass {
                class: VEHICLE,
                attributes: BTreeSet::from([POSITION]),
            })
            .await;
        owner
    }

    async fn subscriber(federation: &InMemoryFederation, name: &str) -> TestFederate {
        let mut federate = TestFederate::join(federation, sample_model(), name).await;
        federate
            .request(Payload::SubscribeObjectClass {
                class: VEHICLE,
                attributes: BTreeSet::from([POSITION]),
                regions: Vec::new(),
            })
            .await;
        federate
    }

    async fn register(owner: &mut TestFederate) -> ObjectInstanceHandle {
        match owner
            .request(Payload::RegisterObject {
                class: VEHICLE,
                instance: None,
                name: None,
            })
            .await
        {
            Outcome::Success(Response::ObjectRegistered { instance }) => instance,
            other => panic!("registration failed: {other:?}"),
        }
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_federate_name_refused() {
        let federation = InMemoryFederation::new("Exercise");
        let _first = TestFederate::join(&federation, sample_model(), "alpha").await;
        let mut second = TestFederate::connect(&federation, sample_model());

        assert_eq!(
            second.kernel.request(join("alpha")).await.unwrap(),
            Outcome::Error(KernelError::Coordinator(
                CoordinatorError::FederateNameInUse {
                    name: "alpha".to_string()
                }
            ))
        );
        assert!(!second.kernel.session().is_joined());
        assert_eq!(federation.federates().len(), 1);
    }

    #[tokio::test]
    async fn test_resign_tears_down_session_and_frees_name() {
        let federation = InMemoryFederation::new("Exercise");
        let mut alpha = TestFederate::join(&federation, sample_model(), "alpha").await;
        alpha
            .request(Payload::EnableTimeConstrained)
            .await;

        assert!(alpha.request(Payload::ResignFederation).await.is_success());
        assert_eq!(alpha.kernel.session().lifecycle(), &Lifecycle::Unjoined);
        assert!(!alpha.kernel.session().time.is_constrained());
        assert!(federation.federates().is_empty());

        assert_eq!(
            alpha.request(Payload::EnableTimeConstrained).await,
            Outcome::Error(KernelError::NotJoined)
        );
        assert_eq!(
            alpha.request(Payload::ResignFederation).await,
            Outcome::Error(KernelError::NotJoined)
        );

        // The name is free again and the same kernel may rejoin.
        assert!(matches!(
            alpha.kernel.request(join("alpha")).await.unwrap(),
            Outcome::Success(Response::Joined { .. })
        ));
        assert_eq!(federation.federates().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_federation_refused() {
        let federation = InMemoryFederation::new("Exercise");
        let mut stray = TestFederate::connect(&federation, sample_model());
        let outcome = stray
            .request(Payload::JoinFederation {
                federation_name: "Elsewhere".to_string(),
                federate_name: "stray".to_string(),
                federate_type: "scenario".to_string(),
            })
            .await;
        assert!(matches!(
            outcome,
            Outcome::Error(KernelError::Coordinator(
                CoordinatorError::FederationNotFound { .. }
            ))
        ));
    }

    // =========================================================================
    // OBJECT INSTANCES
    // =========================================================================

    #[tokio::test]
    async fn test_delete_removes_instance_everywhere() {
        let federation = InMemoryFederation::new("Exercise");
        let mut owner = publishing_owner(&federation).await;
        let mut watcher = subscriber(&federation, "watcher").await;

        let instance = register(&mut owner).await;
        watcher.pump().await;
        assert!(watcher.kernel.session().repository.get(instance).is_some());
        watcher.callbacks();

        assert!(owner
            .request(Payload::DeleteObject { instance })
            .await
            .is_success());
        assert!(owner.kernel.session().repository.get(instance).is_none());

        assert_eq!(
            watcher.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );
        assert_eq!(
            watcher.callbacks(),
            vec![Callback::RemoveObject {
                instance,
                timestamp: None
            }]
        );
        assert!(watcher.kernel.session().repository.is_empty());

        // The owner no longer knows the instance either.
        let update = Payload::UpdateAttributes {
            instance,
            class: VEHICLE,
            values: AttributeValueMap::new().with(POSITION, b"1,1".to_vec()),
            region_tokens: Vec::new(),
            regions: Vec::new(),
        };
        assert_eq!(
            owner.request(update).await,
            Outcome::Error(KernelError::ObjectInstanceNotKnown { instance })
        );
    }

    #[tokio::test]
    async fn test_only_registrar_may_update_or_delete() {
        let federation = InMemoryFederation::new("Exercise");
        let mut owner = publishing_owner(&federation).await;
        let mut watcher = subscriber(&federation, "watcher").await;

        let instance = register(&mut owner).await;
        watcher.pump().await;

        assert_eq!(
            watcher.request(Payload::DeleteObject { instance }).await,
            Outcome::Error(KernelError::DeletePrivilegeNotHeld { instance })
        );
        let update = Payload::UpdateAttributes {
            instance,
            class: VEHICLE,
            values: AttributeValueMap::new().with(POSITION, b"0,0".to_vec()),
            region_tokens: Vec::new(),
            regions: Vec::new(),
        };
        assert_eq!(
            watcher.request(update).await,
            Outcome::Error(KernelError::AttributeNotOwned { instance })
        );
        assert_eq!(owner.pump().await, 0);
    }

    #[tokio::test]
    async fn test_late_joiner_does_not_discover_earlier_registrations() {
        let federation = InMemoryFederation::new("Exercise");
        let mut owner = publishing_owner(&federation).await;
        let instance = register(&mut owner).await;

        let mut late = subscriber(&federation, "late").await;
        owner
            .request(Payload::UpdateAttributes {
                instance,
                class: VEHICLE,
                values: AttributeValueMap::new().with(POSITION, b"2,2".to_vec()),
                region_tokens: Vec::new(),
                regions: Vec::new(),
            })
            .await;

        // Interested in the class, but the instance was never discovered.
        assert_eq!(late.pump().await, 1);
        assert!(late.callbacks().is_empty());
    }
}
