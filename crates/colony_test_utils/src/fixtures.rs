//! Rule sets and colonies for tests and benchmarks.
//!
//! The fixtures are built from the data files shipped under
//! `assets/data`, so tests exercise the same rules the tools load.

use std::sync::Arc;

use colony_core::colony::{Colony, WorkLocation};
use colony_core::data::{parse_colony, parse_rules};
use colony_core::goods::{AbstractGoods, GoodsTypeId};
use colony_core::specification::{BuildingType, Specification, UnitType};
use colony_core::tile::{ColonyTile, TileId};

/// The classic rule set, as shipped.
pub const CLASSIC_RULES: &str = include_str!("../../../assets/data/rules/classic.ron");

/// Jamestown: four colonists, a carpenter and a statesman.
pub const JAMESTOWN: &str = include_str!("../../../assets/data/colonies/jamestown.ron");

/// Plymouth: farming colony with stables and a warehouse.
pub const PLYMOUTH: &str = include_str!("../../../assets/data/colonies/plymouth.ron");

/// Resolve the classic rule set.
///
/// # Panics
///
/// Panics if the shipped rules fail to parse or resolve.
#[must_use]
pub fn classic_spec() -> Arc<Specification> {
    let rules = parse_rules(CLASSIC_RULES, "classic.ron").expect("classic rules parse");
    Arc::new(Specification::from_rules(&rules).expect("classic rules resolve"))
}

/// Goods id by name.
///
/// # Panics
///
/// Panics if the goods type does not exist.
#[must_use]
pub fn goods(spec: &Specification, name: &str) -> GoodsTypeId {
    spec.require_goods_type(name)
        .unwrap_or_else(|e| panic!("fixture goods: {e}"))
}

/// Unit type by name.
///
/// # Panics
///
/// Panics if the unit type does not exist.
#[must_use]
pub fn unit_type(spec: &Specification, name: &str) -> Arc<UnitType> {
    spec.require_unit_type(name)
        .map(Arc::clone)
        .unwrap_or_else(|e| panic!("fixture unit type: {e}"))
}

/// Building type by name.
///
/// # Panics
///
/// Panics if the building type does not exist.
#[must_use]
pub fn building_type(spec: &Specification, name: &str) -> Arc<BuildingType> {
    spec.require_building_type(name)
        .map(Arc::clone)
        .unwrap_or_else(|e| panic!("fixture building type: {e}"))
}

/// Build a colony from RON text against `spec`.
///
/// # Panics
///
/// Panics if the colony text is invalid.
#[must_use]
pub fn colony_from_ron(spec: &Arc<Specification>, source: &str, label: &str) -> Colony {
    let data = parse_colony(source, label).unwrap_or_else(|e| panic!("fixture colony: {e}"));
    Colony::from_data(Arc::clone(spec), &data).unwrap_or_else(|e| panic!("fixture colony: {e}"))
}

/// The shipped Jamestown colony.
#[must_use]
pub fn jamestown(spec: &Arc<Specification>) -> Colony {
    colony_from_ron(spec, JAMESTOWN, "jamestown.ron")
}

/// The shipped Plymouth colony.
#[must_use]
pub fn plymouth(spec: &Arc<Specification>) -> Colony {
    colony_from_ron(spec, PLYMOUTH, "plymouth.ron")
}

/// A fresh colony with a grain centre tile, one lumber tile worked by a
/// free colonist and a town hall.
///
/// # Panics
///
/// Panics if the classic rules lack the referenced types.
#[must_use]
pub fn outpost(spec: &Arc<Specification>) -> Colony {
    let grain = goods(spec, "grain");
    let lumber = goods(spec, "lumber");

    let mut colony = Colony::new(
        "Outpost",
        Arc::clone(spec),
        vec![
            ColonyTile::new(TileId(0), true, vec![AbstractGoods::new(grain, 5)]),
            ColonyTile::new(TileId(1), false, vec![AbstractGoods::new(lumber, 6)]),
        ],
    );
    colony.add_building(building_type(spec, "town_hall"));
    colony
        .add_unit(
            unit_type(spec, "free_colonist"),
            WorkLocation::Tile(TileId(1), lumber),
        )
        .unwrap_or_else(|e| panic!("fixture unit: {e}"));
    colony
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_spec_resolves() {
        let spec = classic_spec();
        assert_eq!(spec.id(), "classic");
        assert_eq!(spec.stored_as(goods(&spec, "fish")), spec.food());
        assert!(!spec.is_storable(spec.bells()));
    }

    #[test]
    fn test_shipped_colonies_load() {
        let spec = classic_spec();

        let jamestown = jamestown(&spec);
        assert_eq!(jamestown.name(), "Jamestown");
        assert_eq!(jamestown.unit_count(), 4);
        assert_eq!(jamestown.build_queue().len(), 2);

        let plymouth = plymouth(&spec);
        assert_eq!(plymouth.unit_count(), 2);
        assert_eq!(plymouth.warehouse_capacity(), 200);
    }

    #[test]
    fn test_outpost() {
        let spec = classic_spec();
        let colony = outpost(&spec);
        assert_eq!(colony.unit_count(), 1);
        assert_eq!(colony.net_production_of(goods(&spec, "lumber")), 6);
    }
}
