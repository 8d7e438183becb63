//! Property-based packing invariants: every algorithm's output is
//! overlap-free, in-bounds, and conserves the input rectangle multiset;
//! backtracking never exceeds greedy's bin count.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rectpack::config::PackConfig;
use rectpack::problem::rect::Rect;
use rectpack::problem::solution::validate;
use rectpack::problem::instance::Instance;
use rectpack::{pack, AlgorithmSpec, NeighbourhoodSpec};

fn arb_instance(bin_side: u32) -> impl Strategy<Value = Instance> {
    prop::collection::vec((1..=bin_side, 1..=bin_side), 1..20).prop_map(move |dims| {
        let rects = dims.into_iter().enumerate().map(|(i, (w, h))| Rect::new(i, w, h)).collect();
        Instance::new(bin_side, 1, bin_side, rects).expect("dims are bounded by bin_side")
    })
}

proptest! {
    #[test]
    fn greedy_area_always_yields_a_valid_solution(instance in arb_instance(20)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let solution = pack(&instance, AlgorithmSpec::GreedyArea, &config, &mut rng).unwrap();
        prop_assert!(validate(&instance, &solution).is_empty());
    }

    #[test]
    fn greedy_perimeter_always_yields_a_valid_solution(instance in arb_instance(20)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(8);
        let solution = pack(&instance, AlgorithmSpec::GreedyPerimeter, &config, &mut rng).unwrap();
        prop_assert!(validate(&instance, &solution).is_empty());
    }

    #[test]
    fn local_search_geometry_always_yields_a_valid_solution(instance in arb_instance(16)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let solution = pack(
            &instance,
            AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Geometry),
            &config,
            &mut rng,
        )
        .unwrap();
        prop_assert!(validate(&instance, &solution).is_empty());
    }

    #[test]
    fn local_search_rule_always_yields_a_valid_solution(instance in arb_instance(16)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(10);
        let solution = pack(
            &instance,
            AlgorithmSpec::LocalSearch(NeighbourhoodSpec::Rule),
            &config,
            &mut rng,
        )
        .unwrap();
        prop_assert!(validate(&instance, &solution).is_empty());
    }

    #[test]
    fn backtracking_never_exceeds_greedy_bin_count(instance in arb_instance(12)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let greedy_solution = pack(&instance, AlgorithmSpec::GreedyArea, &config, &mut rng).unwrap();
        let bt_solution = pack(
            &instance,
            AlgorithmSpec::Backtracking { max_time_s: 2.0 },
            &config,
            &mut rng,
        )
        .unwrap();
        prop_assert!(bt_solution.num_bins() <= greedy_solution.num_bins());
        prop_assert!(validate(&instance, &bt_solution).is_empty());
    }

    #[test]
    fn sim_anneal_always_yields_a_valid_solution(instance in arb_instance(16)) {
        let config = PackConfig::default();
        let mut rng = StdRng::seed_from_u64(12);
        let solution = pack(
            &instance,
            AlgorithmSpec::SimAnneal { initial_temp: 500.0, cooling_rate: 0.95 },
            &config,
            &mut rng,
        )
        .unwrap();
        prop_assert!(validate(&instance, &solution).is_empty());
    }
}
