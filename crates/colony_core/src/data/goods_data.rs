//! Goods and modifier data structures for data-driven rules.

use serde::{Deserialize, Serialize};

use crate::modifiers::Ability;

/// Data-driven goods type definition.
///
/// # Example RON
///
/// ```ron
/// GoodsData(
///     id: "fish",
///     food: true,
///     stored_as: Some("food"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsData {
    /// Unique string identifier for this goods type.
    pub id: String,

    /// Whether the goods can be kept in the warehouse.
    #[serde(default = "default_true")]
    pub storable: bool,

    /// Whether the goods are a kind of food.
    #[serde(default)]
    pub food: bool,

    /// Whether the goods are a raw building material.
    #[serde(default)]
    pub raw_building_material: bool,

    /// Goods type this type is accounted under (defaults to itself).
    #[serde(default)]
    pub stored_as: Option<String>,
}

/// Default to true for storable.
const fn default_true() -> bool {
    true
}

/// An amount of goods referenced by string id.
///
/// Written in RON as `(goods: "lumber", amount: 20)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsAmount {
    /// Goods type id.
    pub goods: String,
    /// Amount.
    pub amount: i32,
}

impl GoodsAmount {
    /// Create a new goods amount.
    #[must_use]
    pub fn new(goods: impl Into<String>, amount: i32) -> Self {
        Self {
            goods: goods.into(),
            amount,
        }
    }
}

/// What a data-driven modifier applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierTargetData {
    /// Production of the named goods type.
    Production(String),
    /// Consume only (scaled) surplus production.
    ConsumeOnlySurplusProduction,
    /// Warehouse capacity.
    WarehouseStorage,
}

/// How a data-driven modifier combines, with its whole-number value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierEffect {
    /// Add the value.
    Additive(i32),
    /// Multiply by the value.
    Multiplicative(i32),
    /// Add the given percentage.
    Percentage(i32),
}

/// Data-driven modifier definition.
///
/// # Example RON
///
/// ```ron
/// ModifierData(
///     target: Production("grain"),
///     effect: Additive(1),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierData {
    /// What the modifier applies to.
    pub target: ModifierTargetData,

    /// How it combines.
    pub effect: ModifierEffect,

    /// Application order, lowest first.
    #[serde(default)]
    pub priority: i32,
}

impl ModifierData {
    /// Goods type referenced by the modifier target, if any.
    #[must_use]
    pub fn goods_reference(&self) -> Option<&str> {
        match &self.target {
            ModifierTargetData::Production(goods) => Some(goods),
            _ => None,
        }
    }
}

/// Abilities are used verbatim in data files.
pub type AbilityData = Ability;
