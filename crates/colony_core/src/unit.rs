//! Colony units.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consumer::{Consumer, ResolveContext, UNIT_PRIORITY};
use crate::goods::{AbstractGoods, GoodsTypeId};
use crate::modifiers::{Modifier, ModifierId};
use crate::production::{ProducerId, ProductionInfo};
use crate::specification::UnitType;

/// Unique identifier for units within a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Create a new unit ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Priority of the expert bonus, applied after tile and building bonuses.
pub const EXPERT_PRIORITY: i32 = 50;

/// Production factor of an expert.
pub const EXPERT_FACTOR: i32 = 2;

/// A unit living in a colony.
///
/// Units eat every turn regardless of what else the colony has; a shortfall
/// shows up as negative net production, not as a smaller ration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    unit_type: Arc<UnitType>,
    work_type: Option<GoodsTypeId>,
}

impl Unit {
    /// Create a unit with no work assignment.
    #[must_use]
    pub fn new(id: UnitId, unit_type: Arc<UnitType>) -> Self {
        Self {
            id,
            unit_type,
            work_type: None,
        }
    }

    /// Unit id.
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Unit type.
    #[must_use]
    pub fn unit_type(&self) -> &Arc<UnitType> {
        &self.unit_type
    }

    /// Goods the unit produces on a tile, if any.
    #[must_use]
    pub fn work_type(&self) -> Option<GoodsTypeId> {
        self.work_type
    }

    /// Choose the goods the unit produces on a tile.
    pub fn set_work_type(&mut self, work_type: Option<GoodsTypeId>) {
        self.work_type = work_type;
    }

    /// Whether the unit is an expert producer of `goods_type`.
    #[must_use]
    pub fn is_expert_for(&self, goods_type: GoodsTypeId) -> bool {
        self.unit_type.is_expert_for(goods_type)
    }

    /// Modifiers the unit adds to its own production of `goods_type`.
    #[must_use]
    pub fn production_modifiers(&self, goods_type: GoodsTypeId) -> Vec<Modifier> {
        if self.is_expert_for(goods_type) {
            vec![
                Modifier::multiplicative(ModifierId::Production(goods_type), EXPERT_FACTOR)
                    .with_priority(EXPERT_PRIORITY),
            ]
        } else {
            Vec::new()
        }
    }
}

impl Consumer for Unit {
    fn producer_id(&self) -> ProducerId {
        ProducerId::Unit(self.id)
    }

    fn consumed_goods(&self) -> Vec<AbstractGoods> {
        self.unit_type.consumption.clone()
    }

    fn priority(&self) -> i32 {
        UNIT_PRIORITY
    }

    fn resolve_production(
        &self,
        _ctx: &ResolveContext<'_>,
        _input: &[AbstractGoods],
        _output: Option<AbstractGoods>,
    ) -> Option<ProductionInfo> {
        let consumption = self.consumed_goods();
        Some(ProductionInfo {
            maximum_consumption: consumption.clone(),
            consumption,
            ..ProductionInfo::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::test_support::{goods, spec};

    #[test]
    fn test_unit_always_eats() {
        let spec = spec();
        let food = goods(&spec, "food");
        let colonist = Unit::new(
            UnitId(1),
            Arc::clone(spec.require_unit_type("free_colonist").unwrap()),
        );
        let ctx = ResolveContext {
            spec: &spec,
            warehouse_capacity: 100,
        };

        assert!(colonist.consumes(food));
        assert_eq!(colonist.priority(), UNIT_PRIORITY);

        // Nothing available, still eats.
        let info = colonist
            .resolve_production(&ctx, &[AbstractGoods::new(food, 0)], None)
            .unwrap();
        assert_eq!(info.consumption, vec![AbstractGoods::new(food, 2)]);
        assert_eq!(info.consumption_of(food), 2);
    }

    #[test]
    fn test_work_type_and_expertise() {
        let spec = spec();
        let fish = goods(&spec, "fish");
        let mut fisherman = Unit::new(
            UnitId(2),
            Arc::clone(spec.require_unit_type("expert_fisherman").unwrap()),
        );

        assert_eq!(fisherman.work_type(), None);
        fisherman.set_work_type(Some(fish));
        assert_eq!(fisherman.work_type(), Some(fish));
        assert!(fisherman.is_expert_for(fish));
        assert!(!fisherman.is_expert_for(goods(&spec, "grain")));
        assert_eq!(fisherman.production_modifiers(fish).len(), 1);
        assert!(fisherman.production_modifiers(goods(&spec, "grain")).is_empty());
        assert_eq!(fisherman.producer_id(), ProducerId::Unit(UnitId(2)));
    }
}
