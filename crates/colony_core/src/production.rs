//! Production records and the raw production map.
//!
//! A [`ProductionInfo`] is what one producer or consumer actually did in a
//! single resolution pass. The [`ProductionMap`] is the running tally of
//! goods available during that pass: tiles add to it, consumers draw from
//! it and add their own output back.

use serde::{Deserialize, Serialize};

use crate::goods::{amount_of, AbstractGoods, GoodsTypeId};
use crate::specification::{BuildingTypeId, Specification};
use crate::tile::TileId;
use crate::type_count_map::TypeCountMap;
use crate::unit::UnitId;

/// Which of a colony's build queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    /// Buildings and units built with hammers and tools.
    Buildings,
    /// Colonists bred from surplus food.
    Population,
}

/// Identity of a producer or consumer within one colony.
///
/// Production records are keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProducerId {
    /// The colony itself (bells produced by the population baseline).
    Colony,
    /// A colony tile.
    Tile(TileId),
    /// A colony building.
    Building(BuildingTypeId),
    /// A colony unit.
    Unit(UnitId),
    /// A build queue.
    BuildQueue(QueueKind),
}

/// What a producer/consumer did in one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionInfo {
    /// Goods actually produced.
    pub production: Vec<AbstractGoods>,
    /// Goods actually consumed.
    pub consumption: Vec<AbstractGoods>,
    /// Goods that could have been produced without input limits.
    pub maximum_production: Vec<AbstractGoods>,
    /// Goods that would have been consumed at maximum production.
    pub maximum_consumption: Vec<AbstractGoods>,
}

impl ProductionInfo {
    /// An empty record (nothing produced, nothing consumed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A record with only production.
    #[must_use]
    pub fn producing(production: Vec<AbstractGoods>) -> Self {
        Self {
            production,
            ..Self::default()
        }
    }

    /// A record with only consumption.
    #[must_use]
    pub fn consuming(consumption: Vec<AbstractGoods>) -> Self {
        Self {
            consumption,
            ..Self::default()
        }
    }

    /// Record produced goods.
    pub fn add_production(&mut self, goods: AbstractGoods) {
        self.production.push(goods);
    }

    /// Record consumed goods.
    pub fn add_consumption(&mut self, goods: AbstractGoods) {
        self.consumption.push(goods);
    }

    /// Whether the record has no effect on colony goods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.production.iter().all(|g| g.amount == 0)
            && self.consumption.iter().all(|g| g.amount == 0)
    }

    /// Amount of a goods type produced.
    #[must_use]
    pub fn production_of(&self, goods_type: GoodsTypeId) -> i32 {
        amount_of(&self.production, goods_type)
    }

    /// Amount of a goods type consumed.
    #[must_use]
    pub fn consumption_of(&self, goods_type: GoodsTypeId) -> i32 {
        amount_of(&self.consumption, goods_type)
    }
}

/// Additive map of goods available during a resolution pass.
///
/// Amounts are tracked under their stored-as root, so fish and grain both
/// count as food. Querying a root returns the combined total; querying an
/// aliased type returns only that type's own amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionMap {
    roots: TypeCountMap<GoodsTypeId>,
    leaves: TypeCountMap<GoodsTypeId>,
}

impl ProductionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add goods.
    pub fn add(&mut self, spec: &Specification, goods: AbstractGoods) {
        self.apply(spec, goods.goods_type, goods.amount);
    }

    /// Remove goods (amounts may go negative).
    pub fn remove(&mut self, spec: &Specification, goods: AbstractGoods) {
        self.apply(spec, goods.goods_type, -goods.amount);
    }

    /// Add every line of a goods list.
    pub fn add_all(&mut self, spec: &Specification, goods: &[AbstractGoods]) {
        for g in goods {
            self.add(spec, *g);
        }
    }

    /// Remove every line of a goods list.
    pub fn remove_all(&mut self, spec: &Specification, goods: &[AbstractGoods]) {
        for g in goods {
            self.remove(spec, *g);
        }
    }

    /// Amount currently available for a goods type.
    #[must_use]
    pub fn get(&self, spec: &Specification, goods_type: GoodsTypeId) -> i32 {
        let root = spec.stored_as(goods_type);
        if root == goods_type {
            self.roots.count(root)
        } else {
            self.leaves.count(goods_type)
        }
    }

    fn apply(&mut self, spec: &Specification, goods_type: GoodsTypeId, delta: i32) {
        let root = spec.stored_as(goods_type);
        self.roots.increment_count(root, delta);
        if root != goods_type {
            self.leaves.increment_count(goods_type, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::test_support::{goods, spec};

    #[test]
    fn test_production_info_queries() {
        let spec = spec();
        let lumber = goods(&spec, "lumber");
        let hammers = goods(&spec, "hammers");

        let mut info = ProductionInfo::new();
        assert!(info.is_empty());

        info.add_consumption(AbstractGoods::new(lumber, 6));
        info.add_production(AbstractGoods::new(hammers, 6));

        assert!(!info.is_empty());
        assert_eq!(info.consumption_of(lumber), 6);
        assert_eq!(info.production_of(hammers), 6);
        assert_eq!(info.production_of(lumber), 0);
    }

    #[test]
    fn test_zero_amount_info_is_empty() {
        let spec = spec();
        let info = ProductionInfo::producing(vec![AbstractGoods::new(goods(&spec, "bells"), 0)]);
        assert!(info.is_empty());
    }

    #[test]
    fn test_production_map_rolls_up_aliases() {
        let spec = spec();
        let food = goods(&spec, "food");
        let fish = goods(&spec, "fish");
        let grain = goods(&spec, "grain");

        let mut map = ProductionMap::new();
        map.add(&spec, AbstractGoods::new(fish, 4));
        map.add(&spec, AbstractGoods::new(grain, 5));

        assert_eq!(map.get(&spec, food), 9);
        assert_eq!(map.get(&spec, fish), 4);
        assert_eq!(map.get(&spec, grain), 5);

        // Colonists eat "food", drawing on the combined total.
        map.remove(&spec, AbstractGoods::new(food, 4));
        assert_eq!(map.get(&spec, food), 5);
        assert_eq!(map.get(&spec, fish), 4);

        // Drawing on a leaf reduces both the leaf and the root.
        map.remove(&spec, AbstractGoods::new(grain, 2));
        assert_eq!(map.get(&spec, grain), 3);
        assert_eq!(map.get(&spec, food), 3);
    }

    #[test]
    fn test_production_map_lists() {
        let spec = spec();
        let lumber = goods(&spec, "lumber");
        let tools = goods(&spec, "tools");

        let mut map = ProductionMap::new();
        map.add_all(
            &spec,
            &[AbstractGoods::new(lumber, 10), AbstractGoods::new(tools, 2)],
        );
        map.remove_all(&spec, &[AbstractGoods::new(lumber, 12)]);

        assert_eq!(map.get(&spec, lumber), -2);
        assert_eq!(map.get(&spec, tools), 2);
    }

    #[test]
    fn test_producer_ids_order() {
        let mut ids = vec![
            ProducerId::BuildQueue(QueueKind::Population),
            ProducerId::Colony,
            ProducerId::Unit(UnitId(2)),
            ProducerId::Tile(TileId(0)),
        ];
        ids.sort();
        assert_eq!(ids[0], ProducerId::Colony);
        assert_eq!(ids[1], ProducerId::Tile(TileId(0)));
    }
}
