//! Colony buildings.
//!
//! A building turns its input goods into output goods, one unit of input
//! per unit of output. Its potential comes from the workers inside it plus
//! any unattended production; what it actually makes is limited by the
//! input surplus and, for buildings that avoid excess production, by the
//! room left in the warehouse.

use std::sync::Arc;

use crate::consumer::{Consumer, ResolveContext};
use crate::error::{GameError, Result};
use crate::goods::{amount_of, AbstractGoods, GoodsTypeId};
use crate::modifiers::{apply_modifiers, Ability, Modifier, ModifierId};
use crate::production::{ProducerId, ProductionInfo};
use crate::specification::{BuildingType, BuildingTypeId};
use crate::unit::{Unit, UnitId};

/// A building in a colony, with the units working in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    building_type: Arc<BuildingType>,
    units: Vec<Unit>,
}

impl Building {
    /// Create an empty building.
    #[must_use]
    pub fn new(building_type: Arc<BuildingType>) -> Self {
        Self {
            building_type,
            units: Vec::new(),
        }
    }

    /// Building type id.
    #[must_use]
    pub fn id(&self) -> BuildingTypeId {
        self.building_type.id
    }

    /// Building type.
    #[must_use]
    pub fn building_type(&self) -> &Arc<BuildingType> {
        &self.building_type
    }

    /// Units working here.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Whether another worker fits.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.units.len() < self.building_type.workplaces as usize
    }

    /// Add a worker.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if every workplace is taken.
    pub fn add_unit(&mut self, unit: Unit) -> Result<()> {
        if !self.has_room() {
            return Err(GameError::InvalidState(format!(
                "Building '{}' has no free workplace",
                self.building_type.name
            )));
        }
        self.units.push(unit);
        Ok(())
    }

    /// Remove a worker by id.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|u| u.id() == id)?;
        Some(self.units.remove(index))
    }

    /// Output produced when input and storage are unlimited.
    #[must_use]
    pub fn potential_production(&self) -> i32 {
        let Some(output) = self.building_type.output else {
            return 0;
        };

        let per_worker = self.building_type.production_per_worker;
        let workers: i32 = self
            .units
            .iter()
            .map(|unit| apply_modifiers(per_worker, &unit.production_modifiers(output)))
            .sum();
        let base = workers + self.building_type.unattended_production;
        if base <= 0 {
            return 0;
        }

        apply_modifiers(base, self.building_type.modifiers_for(ModifierId::Production(output)))
            .max(0)
    }
}

impl Consumer for Building {
    fn producer_id(&self) -> ProducerId {
        ProducerId::Building(self.id())
    }

    fn consumed_goods(&self) -> Vec<AbstractGoods> {
        match self.building_type.input {
            Some(input) => {
                let potential = self.potential_production();
                if potential > 0 {
                    vec![AbstractGoods::new(input, potential)]
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        }
    }

    fn modifiers(&self, id: ModifierId) -> Vec<Modifier> {
        self.building_type.modifiers_for(id).copied().collect()
    }

    fn priority(&self) -> i32 {
        self.building_type.priority
    }

    fn has_ability(&self, ability: Ability) -> bool {
        self.building_type.has_ability(ability)
    }

    fn output_type(&self) -> Option<GoodsTypeId> {
        self.building_type.output
    }

    fn resolve_production(
        &self,
        ctx: &ResolveContext<'_>,
        input: &[AbstractGoods],
        output: Option<AbstractGoods>,
    ) -> Option<ProductionInfo> {
        let output_type = self.building_type.output?;
        let potential = self.potential_production();
        if potential <= 0 {
            return None;
        }

        let mut actual = potential;
        if let Some(input_type) = self.building_type.input {
            actual = actual.min(amount_of(input, input_type).max(0));
        }
        if self.has_ability(Ability::AvoidExcessProduction) && ctx.spec.is_storable(output_type) {
            let stored = output.map_or(0, |g| g.amount);
            actual = actual.min((ctx.warehouse_capacity - stored).max(0));
        }

        let mut info = ProductionInfo {
            maximum_production: vec![AbstractGoods::new(output_type, potential)],
            ..ProductionInfo::default()
        };
        if let Some(input_type) = self.building_type.input {
            info.maximum_consumption = vec![AbstractGoods::new(input_type, potential)];
            if actual > 0 {
                info.add_consumption(AbstractGoods::new(input_type, actual));
            }
        }
        if actual > 0 {
            info.add_production(AbstractGoods::new(output_type, actual));
        }
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::test_support::{goods, spec};
    use crate::specification::Specification;

    fn building(spec: &Specification, name: &str) -> Building {
        Building::new(Arc::clone(spec.require_building_type(name).unwrap()))
    }

    fn worker(spec: &Specification, id: u32, unit_type: &str) -> Unit {
        Unit::new(UnitId(id), Arc::clone(spec.require_unit_type(unit_type).unwrap()))
    }

    #[test]
    fn test_workplaces() {
        let spec = spec();
        let mut carpenter = building(&spec, "carpenter_house");

        for id in 0..3 {
            carpenter.add_unit(worker(&spec, id, "free_colonist")).unwrap();
        }
        assert!(!carpenter.has_room());
        assert!(matches!(
            carpenter.add_unit(worker(&spec, 3, "free_colonist")),
            Err(GameError::InvalidState(_))
        ));

        assert!(carpenter.remove_unit(UnitId(1)).is_some());
        assert!(carpenter.remove_unit(UnitId(1)).is_none());
        assert!(carpenter.has_room());
    }

    #[test]
    fn test_production_limited_by_input() {
        let spec = spec();
        let lumber = goods(&spec, "lumber");
        let hammers = goods(&spec, "hammers");
        let mut carpenter = building(&spec, "carpenter_house");
        carpenter.add_unit(worker(&spec, 1, "free_colonist")).unwrap();
        carpenter.add_unit(worker(&spec, 2, "free_colonist")).unwrap();

        assert_eq!(carpenter.potential_production(), 6);
        assert_eq!(carpenter.consumed_goods(), vec![AbstractGoods::new(lumber, 6)]);

        let ctx = ResolveContext {
            spec: &spec,
            warehouse_capacity: 100,
        };
        let info = carpenter
            .resolve_production(&ctx, &[AbstractGoods::new(lumber, 4)], None)
            .unwrap();

        assert_eq!(info.production, vec![AbstractGoods::new(hammers, 4)]);
        assert_eq!(info.consumption, vec![AbstractGoods::new(lumber, 4)]);
        assert_eq!(info.maximum_production, vec![AbstractGoods::new(hammers, 6)]);
        assert_eq!(info.maximum_consumption, vec![AbstractGoods::new(lumber, 6)]);
    }

    #[test]
    fn test_empty_building_without_unattended_is_idle() {
        let spec = spec();
        let carpenter = building(&spec, "carpenter_house");
        let ctx = ResolveContext {
            spec: &spec,
            warehouse_capacity: 100,
        };

        assert!(carpenter.consumed_goods().is_empty());
        assert!(carpenter.resolve_production(&ctx, &[], None).is_none());
    }

    #[test]
    fn test_unattended_without_input() {
        let spec = spec();
        let bells = goods(&spec, "bells");
        let town_hall = building(&spec, "town_hall");
        let ctx = ResolveContext {
            spec: &spec,
            warehouse_capacity: 100,
        };

        let info = town_hall.resolve_production(&ctx, &[], None).unwrap();
        assert_eq!(info.production, vec![AbstractGoods::new(bells, 1)]);
        assert!(info.consumption.is_empty());
    }

    #[test]
    fn test_avoid_excess_production() {
        let spec = spec();
        let food = goods(&spec, "food");
        let horses = goods(&spec, "horses");
        let stables = building(&spec, "stables");
        let ctx = ResolveContext {
            spec: &spec,
            warehouse_capacity: 100,
        };
        let input = [AbstractGoods::new(food, 10)];

        let room = stables
            .resolve_production(&ctx, &input, Some(AbstractGoods::new(horses, 98)))
            .unwrap();
        assert_eq!(room.production, vec![AbstractGoods::new(horses, 2)]);
        assert_eq!(room.consumption, vec![AbstractGoods::new(food, 2)]);

        let full = stables
            .resolve_production(&ctx, &input, Some(AbstractGoods::new(horses, 120)))
            .unwrap();
        assert!(full.is_empty());
        assert_eq!(full.maximum_production, vec![AbstractGoods::new(horses, 4)]);
    }

    #[test]
    fn test_building_modifiers_exposed() {
        let spec = spec();
        let stables = building(&spec, "stables");
        let warehouse = building(&spec, "warehouse");

        assert_eq!(stables.modifiers(ModifierId::ConsumeOnlySurplusProduction).len(), 1);
        assert_eq!(warehouse.modifiers(ModifierId::WarehouseStorage).len(), 1);
        assert!(stables.has_ability(Ability::AvoidExcessProduction));
        assert_eq!(stables.priority(), 150);
        assert_eq!(stables.output_type(), Some(goods(&spec, "horses")));
    }
}
