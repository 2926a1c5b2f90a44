//! Property tests: every strategy keeps its output inside its rate bounds,
//! whatever the feedback and parameter values.

use proptest::prelude::*;
use ratesim_components::StrategyKind;
use ratesim_core::RateController;

/// Output bounds as advertised by the descriptors. The fixed-rate strategy
/// has no min/max pair, so its single `rate` range is used.
fn advertised_bounds(controller: &dyn RateController) -> (f64, f64) {
    let params = controller.describe_parameters();
    let value = |name: &str| params.iter().find(|d| d.name == name).map(|d| d.value);
    match (value("min_rate"), value("max_rate")) {
        (Some(min), Some(max)) => (min, max),
        _ => (params[0].min, params[0].max),
    }
}

proptest! {
    #[test]
    fn prop_output_within_configured_bounds(
        kind_index in 0usize..6,
        min in 1.0f64..500.0,
        span in 0.0f64..500.0,
        outcomes in proptest::collection::vec(any::<bool>(), 1..200),
    ) {
        let kind = StrategyKind::ALL[kind_index];
        let mut controller = kind.build();
        if kind != StrategyKind::FixedRate {
            controller.set_parameter("max_rate", min + span).unwrap();
            controller.set_parameter("min_rate", min).unwrap();
        }

        let (lo, hi) = advertised_bounds(controller.as_ref());
        prop_assert!(lo <= hi);
        for was_successful in outcomes {
            let rate = controller.process_result(was_successful);
            prop_assert!(rate.is_finite());
            prop_assert!(rate >= lo && rate <= hi, "{kind}: {rate} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn prop_any_parameter_setting_keeps_bounds(
        kind_index in 0usize..6,
        positions in proptest::collection::vec(0.0f64..=1.0, 8),
        outcomes in proptest::collection::vec(any::<bool>(), 1..100),
    ) {
        let kind = StrategyKind::ALL[kind_index];
        let mut controller = kind.build();

        let descriptors = controller.describe_parameters();
        for (descriptor, position) in descriptors.iter().zip(positions) {
            let value = descriptor.min + position * (descriptor.max - descriptor.min);
            controller.set_parameter(descriptor.name, value).unwrap();
        }

        let (lo, hi) = advertised_bounds(controller.as_ref());
        for was_successful in outcomes {
            let rate = controller.process_result(was_successful);
            prop_assert!(rate >= lo && rate <= hi, "{kind}: {rate} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn prop_reset_restores_default_rate(
        kind_index in 0usize..6,
        outcomes in proptest::collection::vec(any::<bool>(), 0..50),
    ) {
        let kind = StrategyKind::ALL[kind_index];
        let mut controller = kind.build();
        for was_successful in outcomes {
            controller.process_result(was_successful);
        }
        controller.reset();
        prop_assert_eq!(controller.current_rate(), 60.0);
    }
}
