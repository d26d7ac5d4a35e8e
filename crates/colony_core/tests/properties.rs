//! Property tests for production resolution over generated colonies.

use std::collections::BTreeMap;
use std::sync::Arc;

use colony_core::prelude::*;
use colony_test_utils::determinism::run_turns;
use colony_test_utils::determinism::strategies::{arb_colony, arb_increments};
use colony_test_utils::fixtures::{classic_spec, goods, jamestown};
use proptest::prelude::*;

fn build(data: &colony_core::data::ColonyData) -> Colony {
    Colony::from_data(classic_spec(), data).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Increments that sum to zero leave no key behind, in any order.
    #[test]
    fn prop_type_count_map_order_independent(increments in arb_increments(24)) {
        let mut forward = TypeCountMap::new();
        for &(key, delta) in &increments {
            forward.increment_count(key, delta);
        }
        let mut backward = TypeCountMap::new();
        for &(key, delta) in increments.iter().rev() {
            backward.increment_count(key, delta);
        }
        prop_assert_eq!(&forward, &backward);

        let mut cancelled = forward.clone();
        for &(key, delta) in &increments {
            cancelled.increment_count(key, -delta);
        }
        prop_assert!(cancelled.is_empty());
        prop_assert!(forward.values().all(|v| v != 0));
    }

    /// Net production is the sum of every recorded production and
    /// consumption line, rolled up to stored-as roots.
    #[test]
    fn prop_net_production_is_additive(data in arb_colony(6)) {
        let colony = build(&data);
        let spec = Arc::clone(colony.specification());
        let snapshot = colony.production();

        let mut expected: BTreeMap<GoodsTypeId, i32> = BTreeMap::new();
        for info in snapshot.production_and_consumption.values() {
            for g in &info.production {
                *expected.entry(spec.stored_as(g.goods_type)).or_default() += g.amount;
            }
            for g in &info.consumption {
                *expected.entry(spec.stored_as(g.goods_type)).or_default() -= g.amount;
            }
        }
        expected.retain(|_, amount| *amount != 0);

        let actual: BTreeMap<GoodsTypeId, i32> = snapshot.net_production.iter().collect();
        prop_assert_eq!(actual, expected);
    }

    /// Asking twice without a mutation recomputes once and serves the
    /// same snapshot.
    #[test]
    fn prop_cache_is_idempotent(data in arb_colony(6)) {
        let colony = build(&data);
        let first = colony.production();
        let second = colony.production();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert_eq!(colony.cache().recompute_count(), 1);
    }

    /// A build queue either pays for its whole requirement or consumes
    /// nothing at all.
    #[test]
    fn prop_build_queue_all_or_nothing(data in arb_colony(6), hammers in 0i32..400, tools in 0i32..80) {
        let spec = classic_spec();
        let mut colony = Colony::from_data(Arc::clone(&spec), &data).unwrap();
        let artillery = Arc::clone(spec.require_unit_type("artillery").unwrap());
        colony.build_queue_mut().set_currently_building(Buildable::Unit(Arc::clone(&artillery)));
        colony.set_goods_count(goods(&spec, "hammers"), hammers);
        colony.set_goods_count(goods(&spec, "tools"), tools);

        let info = colony
            .production_info(ProducerId::BuildQueue(QueueKind::Buildings))
            .unwrap();
        prop_assert_eq!(&info.maximum_consumption, &artillery.required_goods);

        if !info.consumption.is_empty() {
            for required in &artillery.required_goods {
                prop_assert!(info.consumption_of(required.goods_type) >= required.amount);
            }
        }
    }

    /// Ending turns never leaves negative stock or storable goods above
    /// warehouse capacity.
    #[test]
    fn prop_end_turn_respects_storage_bounds(data in arb_colony(6), seed in any::<u64>()) {
        let mut colony = build(&data);
        run_turns(&mut colony, 6, seed);

        let spec = Arc::clone(colony.specification());
        let capacity = colony.warehouse_capacity();
        for (goods_type, amount) in colony.storage().iter() {
            prop_assert!(amount > 0);
            if spec.is_storable(goods_type) && !spec.is_food(goods_type) {
                prop_assert!(amount <= capacity);
            }
        }
    }
}

#[test]
fn test_jamestown_grows_over_time() {
    let spec = classic_spec();
    let mut colony = jamestown(&spec);
    let events = run_turns(&mut colony, 40, 5);

    assert!(events
        .iter()
        .any(|e| matches!(e, ColonyEvent::BuildingCompleted { building } if building == "stockade")));
    assert!(colony.has_building(spec.require_building_type("stockade").unwrap().id));
}
