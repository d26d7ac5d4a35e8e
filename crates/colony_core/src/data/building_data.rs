//! Building data structures for data-driven building definitions.

use serde::{Deserialize, Serialize};

use super::goods_data::{AbilityData, GoodsAmount, ModifierData};
use crate::consumer::BUILDING_PRIORITY;

/// Data-driven building definition.
///
/// Defines all properties of a building type that can be loaded from
/// configuration files. Resolved into a
/// [`BuildingType`](crate::specification::BuildingType) when the rules are
/// loaded.
///
/// # Example RON
///
/// ```ron
/// BuildingData(
///     id: "carpenter_house",
///     input: Some("lumber"),
///     output: Some("hammers"),
///     workplaces: 3,
///     production_per_worker: 3,
///     required_goods: [(goods: "hammers", amount: 52)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique string identifier for this building type.
    pub id: String,

    /// Goods consumed to produce the output.
    #[serde(default)]
    pub input: Option<String>,

    /// Goods produced.
    #[serde(default)]
    pub output: Option<String>,

    /// Maximum number of units working inside.
    #[serde(default = "default_workplaces")]
    pub workplaces: u32,

    /// Base output per non-expert worker per turn.
    #[serde(default = "default_production_per_worker")]
    pub production_per_worker: i32,

    /// Output produced with no workers at all.
    #[serde(default)]
    pub unattended_production: i32,

    /// Consumer resolution priority (higher resolves earlier).
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Goods needed to construct this building.
    #[serde(default)]
    pub required_goods: Vec<GoodsAmount>,

    /// Modifiers the building applies.
    #[serde(default)]
    pub modifiers: Vec<ModifierData>,

    /// Abilities of the building.
    #[serde(default)]
    pub abilities: Vec<AbilityData>,
}

/// Default number of workplaces.
const fn default_workplaces() -> u32 {
    3
}

/// Default per-worker production.
const fn default_production_per_worker() -> i32 {
    3
}

/// Default building priority.
const fn default_priority() -> i32 {
    BUILDING_PRIORITY
}

impl BuildingData {
    /// Every goods id this building references.
    pub fn goods_references(&self) -> impl Iterator<Item = &str> {
        self.input
            .iter()
            .chain(self.output.iter())
            .map(String::as_str)
            .chain(self.required_goods.iter().map(|g| g.goods.as_str()))
            .chain(self.modifiers.iter().filter_map(ModifierData::goods_reference))
    }

    /// Whether the building can be constructed at all.
    #[must_use]
    pub fn is_buildable(&self) -> bool {
        !self.required_goods.is_empty()
    }
}
