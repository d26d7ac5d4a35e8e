//! The resolved rule catalog: goods, building and unit types plus options.
//!
//! A [`Specification`] is built once from [`RulesData`] and shared
//! read-only (behind an `Arc`) by every colony. All string ids are resolved
//! here; the production engine only ever sees typed ids and type objects.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{GoodsAmount, ModifierData, ModifierEffect, ModifierTargetData, RulesData};
use crate::error::{GameError, Result};
use crate::goods::{AbstractGoods, GoodsType, GoodsTypeId};
use crate::math::from_amount;
use crate::modifiers::{modifiers_for, Ability, Modifier, ModifierId, ModifierKind};

/// Unique identifier for building types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingTypeId(pub u16);

impl BuildingTypeId {
    /// Create a new building type ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// Unique identifier for unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(pub u16);

impl UnitTypeId {
    /// Create a new unit type ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// Resolved building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingType {
    /// Unique identifier for this building type.
    pub id: BuildingTypeId,
    /// Data identifier.
    pub name: String,
    /// Goods consumed to produce the output.
    pub input: Option<GoodsTypeId>,
    /// Goods produced.
    pub output: Option<GoodsTypeId>,
    /// Maximum number of workers.
    pub workplaces: u32,
    /// Base output per non-expert worker.
    pub production_per_worker: i32,
    /// Output produced with no workers.
    pub unattended_production: i32,
    /// Consumer resolution priority.
    pub priority: i32,
    /// Goods needed to construct the building.
    pub required_goods: Vec<AbstractGoods>,
    /// Modifiers the building applies.
    pub modifiers: Vec<Modifier>,
    /// Abilities of the building.
    pub abilities: Vec<Ability>,
}

impl BuildingType {
    /// Check if this building type has an ability.
    #[must_use]
    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    /// Modifiers of this type that apply to `id`.
    pub fn modifiers_for(&self, id: ModifierId) -> impl Iterator<Item = &Modifier> {
        modifiers_for(&self.modifiers, id)
    }
}

/// Resolved unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    /// Unique identifier for this unit type.
    pub id: UnitTypeId,
    /// Data identifier.
    pub name: String,
    /// Goods this unit is an expert at producing.
    pub expert_production: Option<GoodsTypeId>,
    /// Goods consumed every turn.
    pub consumption: Vec<AbstractGoods>,
    /// Goods needed to build or breed this unit.
    pub required_goods: Vec<AbstractGoods>,
}

impl UnitType {
    /// Check if this unit is an expert for the goods type.
    #[must_use]
    pub fn is_expert_for(&self, goods_type: GoodsTypeId) -> bool {
        self.expert_production == Some(goods_type)
    }
}

/// Game options read by the production engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    /// Number of colonists whose bells are produced for free.
    pub units_that_use_no_bells: i32,
    /// Whether build queues keep production beyond what a build needs.
    pub save_production_overflow: bool,
    /// Warehouse capacity before building modifiers.
    pub base_warehouse_capacity: i32,
}

/// Something a build queue can hold.
///
/// Implementors carry their own requirements so a queue can be resolved
/// without catalog lookups.
pub trait BuildableType: Clone + PartialEq + fmt::Debug {
    /// Data identifier of the item.
    fn name(&self) -> &str;

    /// Goods needed to complete the item.
    fn required_goods(&self) -> &[AbstractGoods];

    /// Whether the item is a building (buildings are never queued twice).
    fn is_building(&self) -> bool;
}

impl BuildableType for Arc<BuildingType> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_goods(&self) -> &[AbstractGoods] {
        &self.required_goods
    }

    fn is_building(&self) -> bool {
        true
    }
}

impl BuildableType for Arc<UnitType> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_goods(&self) -> &[AbstractGoods] {
        &self.required_goods
    }

    fn is_building(&self) -> bool {
        false
    }
}

/// A building or unit in a mixed build queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Buildable {
    /// Construct a building.
    Building(Arc<BuildingType>),
    /// Train a unit.
    Unit(Arc<UnitType>),
}

impl BuildableType for Buildable {
    fn name(&self) -> &str {
        match self {
            Self::Building(b) => &b.name,
            Self::Unit(u) => &u.name,
        }
    }

    fn required_goods(&self) -> &[AbstractGoods] {
        match self {
            Self::Building(b) => &b.required_goods,
            Self::Unit(u) => &u.required_goods,
        }
    }

    fn is_building(&self) -> bool {
        matches!(self, Self::Building(_))
    }
}

/// The resolved rule catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    id: String,
    goods_types: Vec<GoodsType>,
    building_types: Vec<Arc<BuildingType>>,
    unit_types: Vec<Arc<UnitType>>,
    options: GameOptions,
    bells: GoodsTypeId,
    food: GoodsTypeId,
}

impl Specification {
    /// Resolve a rule set into a specification.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRules`] if the rules fail validation, or
    /// an unknown-type error if a reference cannot be resolved.
    pub fn from_rules(rules: &RulesData) -> Result<Self> {
        let errors = rules.validate();
        if !errors.is_empty() {
            return Err(GameError::InvalidRules {
                rules: rules.id.clone(),
                errors,
            });
        }

        let mut goods_index = HashMap::new();
        for (i, goods) in rules.goods.iter().enumerate() {
            let id = u16::try_from(i).map_err(|_| GameError::InvalidRules {
                rules: rules.id.clone(),
                errors: vec!["Too many goods types".to_string()],
            })?;
            if goods_index.insert(goods.id.as_str(), GoodsTypeId(id)).is_some() {
                return Err(GameError::DuplicateId {
                    kind: "goods",
                    id: goods.id.clone(),
                });
            }
        }
        let resolver = Resolver { goods_index };

        let goods_types = rules
            .goods
            .iter()
            .map(|g| {
                let id = resolver.goods(&g.id)?;
                let stored_as = match &g.stored_as {
                    Some(alias) => resolver.goods(alias)?,
                    None => id,
                };
                Ok(GoodsType {
                    id,
                    name: g.id.clone(),
                    storable: g.storable,
                    food: g.food,
                    raw_building_material: g.raw_building_material,
                    stored_as,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let building_types = rules
            .buildings
            .iter()
            .enumerate()
            .map(|(i, b)| {
                Ok(Arc::new(BuildingType {
                    id: BuildingTypeId(index_u16(i, "building")?),
                    name: b.id.clone(),
                    input: resolver.optional_goods(b.input.as_deref())?,
                    output: resolver.optional_goods(b.output.as_deref())?,
                    workplaces: b.workplaces,
                    production_per_worker: b.production_per_worker,
                    unattended_production: b.unattended_production,
                    priority: b.priority,
                    required_goods: resolver.goods_list(&b.required_goods)?,
                    modifiers: resolver.modifiers(&b.modifiers)?,
                    abilities: b.abilities.clone(),
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        let unit_types = rules
            .units
            .iter()
            .enumerate()
            .map(|(i, u)| {
                Ok(Arc::new(UnitType {
                    id: UnitTypeId(index_u16(i, "unit")?),
                    name: u.id.clone(),
                    expert_production: resolver.optional_goods(u.expert_production.as_deref())?,
                    consumption: resolver.goods_list(&u.consumes)?,
                    required_goods: resolver.goods_list(&u.required_goods)?,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        let spec = Self {
            id: rules.id.clone(),
            goods_types,
            building_types,
            unit_types,
            options: GameOptions {
                units_that_use_no_bells: rules.options.units_that_use_no_bells,
                save_production_overflow: rules.options.save_production_overflow,
                base_warehouse_capacity: rules.options.base_warehouse_capacity,
            },
            bells: resolver.goods(&rules.options.bells)?,
            food: resolver.goods(&rules.options.food)?,
        };

        tracing::debug!(
            rules = %spec.id,
            goods = spec.goods_types.len(),
            buildings = spec.building_types.len(),
            units = spec.unit_types.len(),
            "Resolved specification"
        );

        Ok(spec)
    }

    /// Rule set identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Game options.
    #[must_use]
    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    /// Goods type produced by the population bells baseline.
    #[must_use]
    pub fn bells(&self) -> GoodsTypeId {
        self.bells
    }

    /// Primary food goods type.
    #[must_use]
    pub fn food(&self) -> GoodsTypeId {
        self.food
    }

    /// Look up a goods type.
    #[must_use]
    pub fn goods_type(&self, id: GoodsTypeId) -> Option<&GoodsType> {
        self.goods_types.get(id.index())
    }

    /// All goods types, in id order.
    pub fn goods_types(&self) -> impl Iterator<Item = &GoodsType> {
        self.goods_types.iter()
    }

    /// Find a goods type by data id.
    #[must_use]
    pub fn goods_type_by_name(&self, name: &str) -> Option<GoodsTypeId> {
        self.goods_types.iter().find(|g| g.name == name).map(|g| g.id)
    }

    /// Data id of a goods type (`"?"` for ids from another specification).
    #[must_use]
    pub fn goods_name(&self, id: GoodsTypeId) -> &str {
        self.goods_type(id).map_or("?", |g| g.name.as_str())
    }

    /// Type under which `id` is accounted.
    #[must_use]
    pub fn stored_as(&self, id: GoodsTypeId) -> GoodsTypeId {
        self.goods_type(id).map_or(id, |g| g.stored_as)
    }

    /// Whether the goods type can be kept in the warehouse.
    #[must_use]
    pub fn is_storable(&self, id: GoodsTypeId) -> bool {
        self.goods_type(id).is_some_and(|g| g.storable)
    }

    /// Whether the goods type is a kind of food.
    #[must_use]
    pub fn is_food(&self, id: GoodsTypeId) -> bool {
        self.goods_type(id).is_some_and(|g| g.food)
    }

    /// Look up a building type.
    #[must_use]
    pub fn building_type(&self, id: BuildingTypeId) -> Option<&Arc<BuildingType>> {
        self.building_types.get(id.0 as usize)
    }

    /// All building types, in id order.
    pub fn building_types(&self) -> impl Iterator<Item = &Arc<BuildingType>> {
        self.building_types.iter()
    }

    /// Find a building type by data id.
    #[must_use]
    pub fn building_type_by_name(&self, name: &str) -> Option<&Arc<BuildingType>> {
        self.building_types.iter().find(|b| b.name == name)
    }

    /// Look up a unit type.
    #[must_use]
    pub fn unit_type(&self, id: UnitTypeId) -> Option<&Arc<UnitType>> {
        self.unit_types.get(id.0 as usize)
    }

    /// All unit types, in id order.
    pub fn unit_types(&self) -> impl Iterator<Item = &Arc<UnitType>> {
        self.unit_types.iter()
    }

    /// Find a unit type by data id.
    #[must_use]
    pub fn unit_type_by_name(&self, name: &str) -> Option<&Arc<UnitType>> {
        self.unit_types.iter().find(|u| u.name == name)
    }

    /// Resolve a building type by data id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownBuildingType`] if no such type exists.
    pub fn require_building_type(&self, name: &str) -> Result<&Arc<BuildingType>> {
        self.building_type_by_name(name)
            .ok_or_else(|| GameError::UnknownBuildingType(name.to_string()))
    }

    /// Resolve a unit type by data id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] if no such type exists.
    pub fn require_unit_type(&self, name: &str) -> Result<&Arc<UnitType>> {
        self.unit_type_by_name(name)
            .ok_or_else(|| GameError::UnknownUnitType(name.to_string()))
    }

    /// Resolve a goods type by data id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownGoodsType`] if no such type exists.
    pub fn require_goods_type(&self, name: &str) -> Result<GoodsTypeId> {
        self.goods_type_by_name(name)
            .ok_or_else(|| GameError::UnknownGoodsType(name.to_string()))
    }

    /// Resolve a string-keyed goods list.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownGoodsType`] on the first unknown id.
    pub fn resolve_goods_list(&self, goods: &[GoodsAmount]) -> Result<Vec<AbstractGoods>> {
        resolve_goods_list(goods, |name| self.require_goods_type(name))
    }

    /// Resolve string-keyed modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownGoodsType`] on the first unknown id.
    pub fn resolve_modifiers(&self, modifiers: &[ModifierData]) -> Result<Vec<Modifier>> {
        resolve_modifiers(modifiers, |name| self.require_goods_type(name))
    }
}

fn resolve_goods_list<F>(goods: &[GoodsAmount], lookup: F) -> Result<Vec<AbstractGoods>>
where
    F: Fn(&str) -> Result<GoodsTypeId>,
{
    goods
        .iter()
        .map(|g| Ok(AbstractGoods::new(lookup(&g.goods)?, g.amount)))
        .collect()
}

fn resolve_modifiers<F>(modifiers: &[ModifierData], lookup: F) -> Result<Vec<Modifier>>
where
    F: Fn(&str) -> Result<GoodsTypeId>,
{
    modifiers
        .iter()
        .map(|m| {
            let id = match &m.target {
                ModifierTargetData::Production(goods) => ModifierId::Production(lookup(goods)?),
                ModifierTargetData::ConsumeOnlySurplusProduction => {
                    ModifierId::ConsumeOnlySurplusProduction
                }
                ModifierTargetData::WarehouseStorage => ModifierId::WarehouseStorage,
            };
            Ok(resolve_effect(id, m))
        })
        .collect()
}

fn resolve_effect(id: ModifierId, data: &ModifierData) -> Modifier {
    let (kind, value) = match data.effect {
        ModifierEffect::Additive(v) => (ModifierKind::Additive, v),
        ModifierEffect::Multiplicative(v) => (ModifierKind::Multiplicative, v),
        ModifierEffect::Percentage(v) => (ModifierKind::Percentage, v),
    };
    Modifier::new(id, kind, from_amount(value)).with_priority(data.priority)
}

fn index_u16(index: usize, kind: &'static str) -> Result<u16> {
    u16::try_from(index).map_err(|_| GameError::InvalidState(format!("Too many {kind} types")))
}

/// Goods name resolution used while the specification is being built.
struct Resolver<'a> {
    goods_index: HashMap<&'a str, GoodsTypeId>,
}

impl Resolver<'_> {
    fn goods(&self, name: &str) -> Result<GoodsTypeId> {
        self.goods_index
            .get(name)
            .copied()
            .ok_or_else(|| GameError::UnknownGoodsType(name.to_string()))
    }

    fn optional_goods(&self, name: Option<&str>) -> Result<Option<GoodsTypeId>> {
        name.map(|n| self.goods(n)).transpose()
    }

    fn goods_list(&self, goods: &[GoodsAmount]) -> Result<Vec<AbstractGoods>> {
        resolve_goods_list(goods, |name| self.goods(name))
    }

    fn modifiers(&self, modifiers: &[ModifierData]) -> Result<Vec<Modifier>> {
        resolve_modifiers(modifiers, |name| self.goods(name))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{goods, spec};
    use super::*;
    use crate::data::parse_rules;

    #[test]
    fn test_resolves_goods_and_aliases() {
        let spec = spec();
        let food = goods(&spec, "food");
        let fish = goods(&spec, "fish");

        assert_eq!(spec.stored_as(fish), food);
        assert_eq!(spec.stored_as(food), food);
        assert!(spec.is_food(fish));
        assert!(!spec.is_storable(goods(&spec, "hammers")));
        assert!(spec.is_storable(goods(&spec, "lumber")));
        assert_eq!(spec.food(), food);
        assert_eq!(spec.goods_name(spec.bells()), "bells");
    }

    #[test]
    fn test_resolves_buildings() {
        let spec = spec();
        let stables = spec.require_building_type("stables").unwrap();

        assert_eq!(stables.input, Some(goods(&spec, "food")));
        assert_eq!(stables.output, Some(goods(&spec, "horses")));
        assert_eq!(stables.priority, 150);
        assert!(stables.has_ability(Ability::AvoidExcessProduction));
        assert_eq!(
            stables
                .modifiers_for(ModifierId::ConsumeOnlySurplusProduction)
                .count(),
            1
        );
        assert_eq!(spec.building_type(stables.id), Some(stables));
    }

    #[test]
    fn test_resolves_units() {
        let spec = spec();
        let fisherman = spec.require_unit_type("expert_fisherman").unwrap();
        assert!(fisherman.is_expert_for(goods(&spec, "fish")));

        let artillery = spec.require_unit_type("artillery").unwrap();
        assert_eq!(artillery.required_goods.len(), 2);
        assert!(!Arc::clone(artillery).is_building());
    }

    #[test]
    fn test_unknown_lookups() {
        let spec = spec();
        assert!(matches!(
            spec.require_unit_type("dragoon"),
            Err(GameError::UnknownUnitType(_))
        ));
        assert!(matches!(
            spec.require_goods_type("rum"),
            Err(GameError::UnknownGoodsType(_))
        ));
        assert_eq!(spec.goods_name(GoodsTypeId(999)), "?");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut rules = parse_rules(test_support::RULES, "unit-test").unwrap();
        rules.options.food = "pemmican".to_string();

        match Specification::from_rules(&rules) {
            Err(GameError::InvalidRules { errors, .. }) => assert_eq!(errors.len(), 1),
            other => panic!("expected invalid rules, got {other:?}"),
        }
    }

    #[test]
    fn test_buildable_enum() {
        let spec = spec();
        let church = Buildable::Building(Arc::clone(spec.require_building_type("church").unwrap()));
        let colonist = Buildable::Unit(Arc::clone(spec.require_unit_type("free_colonist").unwrap()));

        assert!(church.is_building());
        assert!(!colonist.is_building());
        assert_eq!(church.name(), "church");
        assert_eq!(colonist.required_goods()[0].amount, 200);
    }

    #[test]
    fn test_resolve_modifiers() {
        let spec = spec();
        let data = vec![ModifierData {
            target: ModifierTargetData::Production("grain".to_string()),
            effect: ModifierEffect::Multiplicative(2),
            priority: 5,
        }];

        let modifiers = spec.resolve_modifiers(&data).unwrap();
        assert_eq!(modifiers[0].id, ModifierId::Production(goods(&spec, "grain")));
        assert_eq!(modifiers[0].kind, ModifierKind::Multiplicative);
        assert_eq!(modifiers[0].priority, 5);
    }
}
