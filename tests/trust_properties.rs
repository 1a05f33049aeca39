use proptest::prelude::*;
use trustweave::{
    BayesianConfig, BayesianModel, BoundaryEnforcer, EventContext, Outcome, TrustConfig,
    TrustEngine, TrustTier, TrustUpdate, UpdateMode,
};

fn outcome() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("positive"), Just("negative"), Just("neutral"), Just("Positive"), Just("bogus")]
}

fn event_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("task_completion"),
        Just("security_breach"),
        Just("misinformation"),
        Just("help_behavior"),
        Just("something_new"),
    ]
}

fn significance() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(f64::MAX),
        Just(-f64::MAX),
        Just(f64::MIN_POSITIVE),
        Just(0.0),
        -1e300f64..1e300,
    ]
}

fn mode() -> impl Strategy<Value = UpdateMode> {
    prop_oneof![Just(UpdateMode::Simple), Just(UpdateMode::Full)]
}

proptest! {
    #[test]
    fn scores_stay_in_unit_range(
        steps in prop::collection::vec((outcome(), event_type(), -2.0f64..2.0, mode()), 1..40)
    ) {
        let engine = TrustEngine::new(TrustConfig::default());
        for (outcome, event_type, magnitude, mode) in steps {
            let event = engine.update_trust_score(
                TrustUpdate::new("Agent", event_type, outcome)
                    .with_magnitude(magnitude)
                    .with_mode(mode),
            );
            prop_assert!((0.0..=1.0).contains(&event.new_score));
            let score = engine.get_trust_score("Agent");
            prop_assert!((0.0..=1.0).contains(&score));
            for (_, s) in engine.get_dimensional_trust_scores("Agent").iter() {
                prop_assert!((0.0..=1.0).contains(&s));
            }
            let record = engine.agent_record("Agent");
            if let Some(record) = record {
                prop_assert!(record.bayesian.alpha > 0.0);
                prop_assert!(record.bayesian.beta > 0.0);
            }
        }
    }

    #[test]
    fn audit_log_grows_by_one_per_update(
        steps in prop::collection::vec((outcome(), prop_oneof![Just("A"), Just(""), Just("B")]), 0..30)
    ) {
        let engine = TrustEngine::new(TrustConfig::default());
        let n = steps.len();
        for (outcome, agent) in steps {
            engine.update_trust_score(TrustUpdate::new(agent, "task_completion", outcome));
        }
        prop_assert_eq!(engine.get_trust_log(None, None).len(), n);
    }

    #[test]
    fn repeated_positive_simple_updates_converge(magnitude in 0.01f64..0.3) {
        let engine = TrustEngine::new(TrustConfig::default());
        let mut last = engine.get_trust_score("Climber");
        for _ in 0..200 {
            engine.update_trust_score(
                TrustUpdate::new("Climber", "task_completion", "positive").with_magnitude(magnitude),
            );
            let next = engine.get_trust_score("Climber");
            prop_assert!(next >= last);
            last = next;
        }
        prop_assert_eq!(last, 1.0);
    }

    #[test]
    fn bayesian_mean_trends_up_with_positive_evidence(
        magnitude in 0.01f64..1.0,
        count in 1usize..50,
    ) {
        let model = BayesianModel::new(BayesianConfig::default());
        let mut params = model.prior();
        let mut last = BayesianModel::score(&params);
        for _ in 0..count {
            model.update(&mut params, Outcome::Positive, magnitude);
            let next = BayesianModel::score(&params);
            prop_assert!(next >= last);
            last = next;
        }
        prop_assert!(last > 0.5);
    }

    #[test]
    fn soft_clamp_lands_between_score_and_bound(score in 0.0f64..1.0) {
        let boundary = TrustTier::High.boundary();
        let clamped = BoundaryEnforcer::soft_clamp(score, boundary.min, boundary.max);
        if score < boundary.min {
            prop_assert!(clamped >= score && clamped <= boundary.min);
        } else if score > boundary.max {
            prop_assert!(clamped <= score && clamped >= boundary.max);
        } else {
            prop_assert_eq!(clamped, score);
        }
    }

    #[test]
    fn extreme_significance_stays_in_unit_range(
        steps in prop::collection::vec((outcome(), event_type(), 0.0f64..1.0, significance()), 1..20)
    ) {
        let engine = TrustEngine::new(TrustConfig::default());
        for (outcome, event_type, magnitude, significance) in steps {
            let event = engine.update_trust_score(
                TrustUpdate::new("Agent", event_type, outcome)
                    .with_magnitude(magnitude)
                    .with_context(EventContext::new().with_significance(significance))
                    .with_mode(UpdateMode::Full),
            );
            prop_assert!((0.0..=1.0).contains(&event.new_score));
            let score = engine.get_trust_score("Agent");
            prop_assert!((0.0..=1.0).contains(&score), "score escaped [0,1]: {}", score);
        }
        engine.apply_time_decay(30);
        let score = engine.get_trust_score("Agent");
        prop_assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn huge_positive_magnitude_pushes_bayesian_trust_up() {
    let engine = TrustEngine::new(TrustConfig::default());
    let event = engine.update_trust_score(
        TrustUpdate::new("Agent", "task_completion", "positive")
            .with_magnitude(f64::MAX)
            .with_mode(UpdateMode::Full),
    );
    assert!(event.success);
    assert!(engine.bayesian_trust("Agent") > 0.99);
    assert!((0.0..=1.0).contains(&engine.get_trust_score("Agent")));
}
