//! Rule set data structure combining all catalog definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::building_data::BuildingData;
use super::goods_data::GoodsData;
use super::unit_data::UnitData;
use crate::error::{GameError, Result};

/// Game options that influence production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsData {
    /// Number of colonists whose bells are produced for free.
    #[serde(default)]
    pub units_that_use_no_bells: i32,

    /// Whether build queues keep production beyond what a build needs.
    #[serde(default)]
    pub save_production_overflow: bool,

    /// Warehouse capacity before building modifiers.
    #[serde(default = "default_warehouse_capacity")]
    pub base_warehouse_capacity: i32,

    /// Goods type produced by the population bells baseline.
    pub bells: String,

    /// Primary food goods type.
    pub food: String,
}

/// Default warehouse capacity.
const fn default_warehouse_capacity() -> i32 {
    100
}

/// Complete rule set definition.
///
/// Loaded from a RON file and resolved into a
/// [`Specification`](crate::specification::Specification).
///
/// # Example RON
///
/// ```ron
/// RulesData(
///     id: "classic",
///     goods: [...],
///     buildings: [...],
///     units: [...],
///     options: OptionsData(bells: "bells", food: "food"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesData {
    /// Rule set identifier.
    pub id: String,

    /// All goods types.
    pub goods: Vec<GoodsData>,

    /// All building types.
    #[serde(default)]
    pub buildings: Vec<BuildingData>,

    /// All unit types.
    #[serde(default)]
    pub units: Vec<UnitData>,

    /// Game options.
    pub options: OptionsData,
}

impl RulesData {
    /// Find goods by id.
    #[must_use]
    pub fn get_goods(&self, id: &str) -> Option<&GoodsData> {
        self.goods.iter().find(|g| g.id == id)
    }

    /// Find a building by id.
    #[must_use]
    pub fn get_building(&self, id: &str) -> Option<&BuildingData> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Find a unit by id.
    #[must_use]
    pub fn get_unit(&self, id: &str) -> Option<&UnitData> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Validate internal consistency of the rule set.
    ///
    /// Checks for:
    /// - Duplicate goods, building and unit ids
    /// - Goods references that do not exist
    /// - Stored-as aliases that point at aliased types
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        collect_duplicates("goods", self.goods.iter().map(|g| g.id.as_str()), &mut errors);
        collect_duplicates(
            "building",
            self.buildings.iter().map(|b| b.id.as_str()),
            &mut errors,
        );
        collect_duplicates("unit", self.units.iter().map(|u| u.id.as_str()), &mut errors);

        for goods in &self.goods {
            if let Some(alias) = &goods.stored_as {
                match self.get_goods(alias) {
                    None => errors.push(format!(
                        "Goods '{}' is stored as unknown goods '{}'",
                        goods.id, alias
                    )),
                    Some(target) if target.stored_as.as_deref().is_some_and(|t| t != target.id) => {
                        errors.push(format!(
                            "Goods '{}' is stored as '{}', which is itself stored as another type",
                            goods.id, alias
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        for building in &self.buildings {
            for goods_id in building.goods_references() {
                if self.get_goods(goods_id).is_none() {
                    errors.push(format!(
                        "Building '{}' references unknown goods '{}'",
                        building.id, goods_id
                    ));
                }
            }
        }

        for unit in &self.units {
            for goods_id in unit.goods_references() {
                if self.get_goods(goods_id).is_none() {
                    errors.push(format!(
                        "Unit '{}' references unknown goods '{}'",
                        unit.id, goods_id
                    ));
                }
            }
        }

        for (option, goods_id) in [("bells", &self.options.bells), ("food", &self.options.food)] {
            if self.get_goods(goods_id).is_none() {
                errors.push(format!("Option '{option}' names unknown goods '{goods_id}'"));
            }
        }

        if self.options.units_that_use_no_bells < 0 {
            errors.push("Option 'units_that_use_no_bells' is negative".to_string());
        }

        errors
    }
}

fn collect_duplicates<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(format!("Duplicate {kind} id '{id}'"));
        }
    }
}

/// Parse a rule set from RON text.
///
/// `label` names the source in error messages (usually the file path).
///
/// # Errors
///
/// Returns [`GameError::DataParseError`] if the text is not a valid rule set.
pub fn parse_rules(source: &str, label: &str) -> Result<RulesData> {
    ron::from_str(source).map_err(|e| GameError::DataParseError {
        path: label.to_string(),
        message: e.to_string(),
    })
}
