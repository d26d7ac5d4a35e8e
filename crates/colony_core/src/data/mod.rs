//! Data structures for rules and colony configuration.
//!
//! This module contains pure data structures that define goods, buildings,
//! units, game options and colony layouts. All structs are designed to be
//! deserialized from RON files and refer to each other by string id.
//! String ids are resolved into typed ids exactly once, when a
//! [`Specification`](crate::specification::Specification) or
//! [`Colony`](crate::colony::Colony) is built from them.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses text. File loading is handled by `colony_tools`.

mod building_data;
mod colony_data;
mod goods_data;
mod rules_data;
mod unit_data;

pub use building_data::BuildingData;
pub use colony_data::{
    parse_colony, BuildableData, ColonyData, ColonyUnitData, TileData, WorkData,
};
pub use goods_data::{
    AbilityData, GoodsAmount, GoodsData, ModifierData, ModifierEffect, ModifierTargetData,
};
pub use rules_data::{parse_rules, OptionsData, RulesData};
pub use unit_data::UnitData;
