//! The consumer contract shared by buildings, units and build queues.
//!
//! The production cache resolves consumers one at a time, highest priority
//! first. Each consumer is handed the surplus of the goods it declares and
//! answers with a [`ProductionInfo`] describing what it actually did.

use crate::goods::{AbstractGoods, GoodsTypeId};
use crate::modifiers::{Ability, Modifier, ModifierId};
use crate::production::{ProducerId, ProductionInfo};
use crate::specification::Specification;

/// Priority of colony units (they eat before anything else is made).
pub const UNIT_PRIORITY: i32 = 300;

/// Default priority of buildings.
pub const BUILDING_PRIORITY: i32 = 200;

/// Priority of the population queue.
pub const POPULATION_PRIORITY: i32 = 100;

/// Priority of the colony build queue.
pub const COLONY_PRIORITY: i32 = 10;

/// Read-only context handed to every consumer during resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The rule catalog.
    pub spec: &'a Specification,
    /// Current warehouse capacity of the colony.
    pub warehouse_capacity: i32,
}

/// Something that consumes colony goods.
pub trait Consumer {
    /// Key under which this consumer's production record is stored.
    fn producer_id(&self) -> ProducerId;

    /// Goods this consumer wants this turn.
    fn consumed_goods(&self) -> Vec<AbstractGoods>;

    /// Whether this consumer wants a positive amount of `goods_type`.
    fn consumes(&self, goods_type: GoodsTypeId) -> bool {
        self.consumed_goods()
            .iter()
            .any(|g| g.matches(goods_type) && g.amount > 0)
    }

    /// Modifiers this consumer carries for `id`.
    fn modifiers(&self, _id: ModifierId) -> Vec<Modifier> {
        Vec::new()
    }

    /// Resolution priority, higher first.
    fn priority(&self) -> i32;

    /// Whether this consumer has an ability.
    fn has_ability(&self, _ability: Ability) -> bool {
        false
    }

    /// Goods this consumer produces, if its output surplus matters to it.
    fn output_type(&self) -> Option<GoodsTypeId> {
        None
    }

    /// Decide what to consume and produce.
    ///
    /// `input` holds the surplus of each consumed goods type. `output` is
    /// the current surplus of [`output_type`](Self::output_type), when the
    /// consumer has one. Returns `None` when the consumer has nothing to
    /// record.
    fn resolve_production(
        &self,
        ctx: &ResolveContext<'_>,
        input: &[AbstractGoods],
        output: Option<AbstractGoods>,
    ) -> Option<ProductionInfo>;
}

/// Sort consumers by descending priority.
///
/// The sort is stable, so consumers of equal priority keep the order the
/// colony lists them in.
pub fn sort_by_priority(consumers: &mut [&dyn Consumer]) {
    consumers.sort_by_key(|c| std::cmp::Reverse(c.priority()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::QueueKind;

    struct StubConsumer {
        id: ProducerId,
        priority: i32,
        wants: Vec<AbstractGoods>,
    }

    impl Consumer for StubConsumer {
        fn producer_id(&self) -> ProducerId {
            self.id
        }

        fn consumed_goods(&self) -> Vec<AbstractGoods> {
            self.wants.clone()
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn resolve_production(
            &self,
            _ctx: &ResolveContext<'_>,
            _input: &[AbstractGoods],
            _output: Option<AbstractGoods>,
        ) -> Option<ProductionInfo> {
            None
        }
    }

    #[test]
    fn test_default_consumes() {
        let lumber = GoodsTypeId(3);
        let consumer = StubConsumer {
            id: ProducerId::Colony,
            priority: 0,
            wants: vec![AbstractGoods::new(lumber, 4), AbstractGoods::new(GoodsTypeId(5), 0)],
        };

        assert!(consumer.consumes(lumber));
        assert!(!consumer.consumes(GoodsTypeId(5)));
        assert!(!consumer.has_ability(Ability::ConsumeAllOrNothing));
        assert!(consumer.modifiers(ModifierId::WarehouseStorage).is_empty());
    }

    #[test]
    fn test_sort_by_priority_is_descending_and_stable() {
        let queue = StubConsumer {
            id: ProducerId::BuildQueue(QueueKind::Buildings),
            priority: COLONY_PRIORITY,
            wants: vec![],
        };
        let first_building = StubConsumer {
            id: ProducerId::Colony,
            priority: BUILDING_PRIORITY,
            wants: vec![],
        };
        let second_building = StubConsumer {
            id: ProducerId::BuildQueue(QueueKind::Population),
            priority: BUILDING_PRIORITY,
            wants: vec![],
        };
        let unit = StubConsumer {
            id: ProducerId::Colony,
            priority: UNIT_PRIORITY,
            wants: vec![],
        };

        let mut consumers: Vec<&dyn Consumer> =
            vec![&queue, &first_building, &second_building, &unit];
        sort_by_priority(&mut consumers);

        let priorities: Vec<i32> = consumers.iter().map(|c| c.priority()).collect();
        assert_eq!(
            priorities,
            vec![UNIT_PRIORITY, BUILDING_PRIORITY, BUILDING_PRIORITY, COLONY_PRIORITY]
        );
        assert_eq!(consumers[1].producer_id(), ProducerId::Colony);
        assert_eq!(
            consumers[2].producer_id(),
            ProducerId::BuildQueue(QueueKind::Population)
        );
    }
}
