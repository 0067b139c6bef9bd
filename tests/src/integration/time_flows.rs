//! # Time Management Flows
//!
//! Regulating/constrained interplay between federates: timestamping,
//! conservative grants and time-stamp-ordered release.

#[cfg(test)]
mod tests {
    use crate::harness::{sample_model, TestFederate};
    use lrc_kernel::{
        AdvanceDecision, AdvanceState, Callback, InMemoryFederation, KernelError, Outcome,
        Response,
    };
    use lrc_types::{
        InteractionClassHandle, LogicalInterval, LogicalTime, Message, ParameterHandle,
        ParameterValueMap, Payload,
    };

    const FIRE: InteractionClassHandle = InteractionClassHandle(1);

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn regulate(lookahead: f64) -> Payload {
        Payload::EnableTimeRegulation {
            lookahead: LogicalInterval(lookahead),
        }
    }

    fn advance(time: f64) -> Payload {
        Payload::TimeAdvanceRequest {
            time: LogicalTime(time),
        }
    }

    fn fire(power: &str) -> Payload {
        Payload::SendInteraction {
            class: FIRE,
            parameters: ParameterValueMap::new().with(ParameterHandle(2), power.as_bytes()),
            region_tokens: Vec::new(),
            regions: Vec::new(),
        }
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_regulating_send_is_stamped_and_unconstrained_advance_is_immediate() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut sender = TestFederate::join(&federation, model.clone(), "sender").await;
        let mut receiver = TestFederate::join(&federation, model, "receiver").await;

        receiver
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: Vec::new(),
            })
            .await;
        assert!(sender.request(regulate(1.0)).await.is_success());
        sender
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        assert!(sender.request(fire("10")).await.is_success());

        // Receiver is not constrained, so the stamped interaction arrives at once.
        assert_eq!(
            receiver.next_outcome().await,
            Some(Outcome::Success(Response::Delivered))
        );
        let callbacks = receiver.callbacks();
        assert!(matches!(
            callbacks.as_slice(),
            [Callback::ReceiveInteraction {
                timestamp: Some(LogicalTime(t)),
                ..
            }] if *t == 0.0
        ));

        assert_eq!(
            sender.request(advance(5.0)).await,
            Outcome::Success(Response::TimeAdvance(AdvanceDecision::Granted(LogicalTime(
                5.0
            ))))
        );
        assert_eq!(
            sender.callbacks(),
            vec![
                Callback::TimeRegulationEnabled {
                    time: LogicalTime(0.0),
                    lookahead: LogicalInterval(1.0),
                },
                Callback::TimeAdvanceGrant {
                    time: LogicalTime(5.0)
                },
            ]
        );
        assert_eq!(
            sender.kernel.session().time.current(),
            LogicalTime(5.0)
        );
    }

    #[tokio::test]
    async fn test_constrained_advance_waits_for_regulator_clock() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut constrained = TestFederate::join(&federation, model.clone(), "constrained").await;
        let mut regulator = TestFederate::join(&federation, model, "regulator").await;

        regulator.request(regulate(2.0)).await;
        regulator.request(advance(3.0)).await;
        constrained.request(Payload::EnableTimeConstrained).await;
        constrained.callbacks();

        assert_eq!(
            constrained.request(advance(10.0)).await,
            Outcome::Success(Response::TimeAdvance(AdvanceDecision::Pending(LogicalTime(
                10.0
            ))))
        );
        assert_eq!(constrained.pump().await, 0);
        assert_eq!(
            constrained.kernel.session().time.advance(),
            AdvanceState::Requested {
                target: LogicalTime(10.0)
            }
        );

        // the regulator can still stamp 8, lookahead notwithstanding
        regulator.request(advance(8.0)).await;
        assert_eq!(constrained.pump().await, 0);
        assert_eq!(federation.pending_advances(), 1);

        regulator.request(advance(10.0)).await;
        assert_eq!(federation.pending_advances(), 0);
        assert_eq!(constrained.pump().await, 1);
        assert_eq!(
            constrained.callbacks(),
            vec![Callback::TimeAdvanceGrant {
                time: LogicalTime(10.0)
            }]
        );
        assert_eq!(constrained.kernel.session().time.advance(), AdvanceState::Idle);
        assert_eq!(
            constrained.kernel.session().time.current(),
            LogicalTime(10.0)
        );
    }

    #[tokio::test]
    async fn test_held_interaction_released_before_grant_callback() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut constrained = TestFederate::join(&federation, model.clone(), "constrained").await;
        let mut regulator = TestFederate::join(&federation, model, "regulator").await;

        constrained
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: Vec::new(),
            })
            .await;
        constrained.request(Payload::EnableTimeConstrained).await;
        constrained.callbacks();

        regulator.request(regulate(1.0)).await;
        regulator
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        regulator.request(advance(4.0)).await;
        regulator.request(fire("4")).await;

        assert_eq!(
            constrained.next_outcome().await,
            Some(Outcome::Success(Response::Held {
                until: LogicalTime(4.0)
            }))
        );
        assert!(constrained.callbacks().is_empty());
        assert_eq!(constrained.kernel.session().tso.len(), 1);

        // the regulator still sits at 4, so the grant waits for it
        constrained.request(advance(5.0)).await;
        assert_eq!(constrained.pump().await, 0);
        regulator.request(advance(5.0)).await;
        assert_eq!(constrained.pump().await, 1);

        let callbacks = constrained.callbacks();
        assert_eq!(callbacks.len(), 2);
        assert!(matches!(
            &callbacks[0],
            Callback::ReceiveInteraction {
                class: FIRE,
                timestamp: Some(LogicalTime(t)),
                ..
            } if *t == 4.0
        ));
        assert_eq!(
            callbacks[1],
            Callback::TimeAdvanceGrant {
                time: LogicalTime(5.0)
            }
        );
        assert!(constrained.kernel.session().tso.is_empty());
    }

    #[tokio::test]
    async fn test_regulator_send_lands_before_constrained_grant() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut constrained = TestFederate::join(&federation, model.clone(), "constrained").await;
        let mut regulator = TestFederate::join(&federation, model, "regulator").await;

        constrained
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: Vec::new(),
            })
            .await;
        constrained.request(Payload::EnableTimeConstrained).await;
        constrained.callbacks();

        regulator.request(regulate(1.0)).await;
        regulator
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        regulator.request(advance(8.0)).await;

        constrained.request(advance(10.0)).await;
        assert_eq!(constrained.pump().await, 0);

        // stamped with the regulator's clock while the peer waits at 10
        assert!(regulator.request(fire("8")).await.is_success());
        assert_eq!(
            constrained.next_outcome().await,
            Some(Outcome::Success(Response::Held {
                until: LogicalTime(8.0)
            }))
        );
        assert_eq!(federation.pending_advances(), 1);

        let stale = Message::new(fire("7")).at(LogicalTime(7.0)).unwrap();
        assert_eq!(
            regulator.send(stale).await,
            Outcome::Error(KernelError::InvalidLogicalTime {
                time: LogicalTime(7.0)
            })
        );

        regulator.request(advance(10.0)).await;
        assert_eq!(constrained.pump().await, 1);
        let callbacks = constrained.callbacks();
        assert_eq!(callbacks.len(), 2);
        assert!(matches!(
            &callbacks[0],
            Callback::ReceiveInteraction {
                timestamp: Some(LogicalTime(t)),
                ..
            } if *t == 8.0
        ));
        assert_eq!(
            callbacks[1],
            Callback::TimeAdvanceGrant {
                time: LogicalTime(10.0)
            }
        );
    }

    #[tokio::test]
    async fn test_mutually_regulating_federates_advance_together() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut a = TestFederate::join(&federation, model.clone(), "a").await;
        let mut b = TestFederate::join(&federation, model, "b").await;

        for federate in [&mut a, &mut b] {
            federate.request(regulate(1.0)).await;
            federate.request(Payload::EnableTimeConstrained).await;
            federate.callbacks();
        }

        assert_eq!(
            a.request(advance(5.0)).await,
            Outcome::Success(Response::TimeAdvance(AdvanceDecision::Pending(LogicalTime(
                5.0
            ))))
        );
        assert_eq!(a.pump().await, 0);

        // b's outstanding request lifts its floor to 5, releasing both
        b.request(advance(5.0)).await;
        assert_eq!(federation.pending_advances(), 0);
        for federate in [&mut a, &mut b] {
            assert_eq!(federate.pump().await, 1);
            assert_eq!(federate.kernel.session().time.current(), LogicalTime(5.0));
        }
    }

    #[tokio::test]
    async fn test_disabling_constrained_flushes_held_messages() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut constrained = TestFederate::join(&federation, model.clone(), "constrained").await;
        let mut regulator = TestFederate::join(&federation, model, "regulator").await;

        constrained
            .request(Payload::SubscribeInteractionClass {
                class: FIRE,
                regions: Vec::new(),
            })
            .await;
        constrained.request(Payload::EnableTimeConstrained).await;
        constrained.callbacks();

        regulator.request(regulate(1.0)).await;
        regulator
            .request(Payload::PublishInteractionClass { class: FIRE })
            .await;
        regulator.request(advance(6.0)).await;
        regulator.request(fire("6")).await;
        regulator.request(advance(9.0)).await;
        regulator.request(fire("9")).await;

        assert_eq!(constrained.pump().await, 2);
        assert_eq!(constrained.kernel.session().tso.len(), 2);

        assert!(constrained
            .request(Payload::DisableTimeConstrained)
            .await
            .is_success());
        let stamps: Vec<_> = constrained
            .callbacks()
            .into_iter()
            .filter_map(|cb| match cb {
                Callback::ReceiveInteraction { timestamp, .. } => timestamp,
                _ => None,
            })
            .collect();
        assert_eq!(stamps, vec![LogicalTime(6.0), LogicalTime(9.0)]);
    }

    #[tokio::test]
    async fn test_resigning_regulator_unblocks_pending_advance() {
        let federation = InMemoryFederation::new("Exercise");
        let model = sample_model();
        let mut constrained = TestFederate::join(&federation, model.clone(), "constrained").await;
        let mut regulator = TestFederate::join(&federation, model, "regulator").await;

        regulator.request(regulate(1.0)).await;
        constrained.request(Payload::EnableTimeConstrained).await;
        constrained.callbacks();

        constrained.request(advance(20.0)).await;
        assert_eq!(constrained.pump().await, 0);

        assert!(regulator
            .request(Payload::ResignFederation)
            .await
            .is_success());
        assert_eq!(constrained.pump().await, 1);
        assert_eq!(
            constrained.callbacks(),
            vec![Callback::TimeAdvanceGrant {
                time: LogicalTime(20.0)
            }]
        );
    }
}
