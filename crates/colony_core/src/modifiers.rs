//! Modifiers and abilities attached to tiles, buildings and consumers.
//!
//! A [`Modifier`] scales a numeric quantity (usually a production amount).
//! Modifiers are applied in ascending priority order; percentage modifiers
//! that share a priority are summed first and applied once, so two +50%
//! bonuses at the same priority give +100%, not +125%.

use serde::{Deserialize, Serialize};

use crate::goods::GoodsTypeId;
use crate::math::{fixed_serde, floor_to_amount, from_amount, percent_of, Fixed};

/// What a modifier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModifierId {
    /// Production of one goods type.
    Production(GoodsTypeId),
    /// Restricts a consumer to the surplus of current production, scaled by
    /// the modifier, instead of production plus storage.
    ConsumeOnlySurplusProduction,
    /// Warehouse capacity for storable goods.
    WarehouseStorage,
}

/// How a modifier combines with the value it modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// `value + modifier`.
    Additive,
    /// `value * modifier`.
    Multiplicative,
    /// `value + value * modifier / 100`.
    Percentage,
}

/// A single modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// What the modifier applies to.
    pub id: ModifierId,
    /// How it combines.
    pub kind: ModifierKind,
    /// Modifier value (for percentages, the percent number, e.g. 50).
    #[serde(with = "fixed_serde")]
    pub value: Fixed,
    /// Application order, lowest first.
    pub priority: i32,
}

impl Modifier {
    /// Default application priority.
    pub const DEFAULT_PRIORITY: i32 = 0;

    /// Create a modifier at the default priority.
    #[must_use]
    pub fn new(id: ModifierId, kind: ModifierKind, value: Fixed) -> Self {
        Self {
            id,
            kind,
            value,
            priority: Self::DEFAULT_PRIORITY,
        }
    }

    /// Additive modifier with a whole value.
    #[must_use]
    pub fn additive(id: ModifierId, value: i32) -> Self {
        Self::new(id, ModifierKind::Additive, from_amount(value))
    }

    /// Multiplicative modifier with a whole factor.
    #[must_use]
    pub fn multiplicative(id: ModifierId, factor: i32) -> Self {
        Self::new(id, ModifierKind::Multiplicative, from_amount(factor))
    }

    /// Percentage modifier (`percent` of the current value is added).
    #[must_use]
    pub fn percentage(id: ModifierId, percent: i32) -> Self {
        Self::new(id, ModifierKind::Percentage, from_amount(percent))
    }

    /// Same modifier at a different priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Capabilities a consumer or building type may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Either every requirement is satisfied in a pass or nothing is consumed.
    ConsumeAllOrNothing,
    /// Never produce more storable output than the warehouse can hold.
    AvoidExcessProduction,
}

/// Modifiers from `modifiers` that apply to `id`.
pub fn modifiers_for(modifiers: &[Modifier], id: ModifierId) -> impl Iterator<Item = &Modifier> {
    modifiers.iter().filter(move |m| m.id == id)
}

/// Apply modifiers to a fixed-point value.
#[must_use]
pub fn apply_modifiers_fixed<'a, I>(base: Fixed, modifiers: I) -> Fixed
where
    I: IntoIterator<Item = &'a Modifier>,
{
    let mut sorted: Vec<&Modifier> = modifiers.into_iter().collect();
    // Stable: equal priorities keep their declaration order.
    sorted.sort_by_key(|m| m.priority);

    let mut result = base;
    let mut i = 0;
    while i < sorted.len() {
        let modifier = sorted[i];
        match modifier.kind {
            ModifierKind::Additive => result = result.saturating_add(modifier.value),
            ModifierKind::Multiplicative => result = result.saturating_mul(modifier.value),
            ModifierKind::Percentage => {
                let mut total = modifier.value;
                while i + 1 < sorted.len()
                    && sorted[i + 1].kind == ModifierKind::Percentage
                    && sorted[i + 1].priority == modifier.priority
                {
                    i += 1;
                    total = total.saturating_add(sorted[i].value);
                }
                result = result.saturating_add(percent_of(result, total));
            }
        }
        i += 1;
    }
    result
}

/// Apply modifiers to a whole amount, flooring the result.
#[must_use]
pub fn apply_modifiers<'a, I>(base: i32, modifiers: I) -> i32
where
    I: IntoIterator<Item = &'a Modifier>,
{
    floor_to_amount(apply_modifiers_fixed(from_amount(base), modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAIN: GoodsTypeId = GoodsTypeId(1);
    const ORE: GoodsTypeId = GoodsTypeId(2);

    #[test]
    fn test_no_modifiers_is_identity() {
        assert_eq!(apply_modifiers(7, std::iter::empty()), 7);
    }

    #[test]
    fn test_additive_then_multiplicative_by_priority() {
        let id = ModifierId::Production(GRAIN);
        let modifiers = [
            Modifier::multiplicative(id, 2).with_priority(20),
            Modifier::additive(id, 1).with_priority(10),
        ];
        // (3 + 1) * 2, regardless of declaration order
        assert_eq!(apply_modifiers(3, &modifiers), 8);
    }

    #[test]
    fn test_same_priority_percentages_are_summed() {
        let id = ModifierId::Production(GRAIN);
        let modifiers = [Modifier::percentage(id, 50), Modifier::percentage(id, 50)];
        assert_eq!(apply_modifiers(4, &modifiers), 8);
    }

    #[test]
    fn test_different_priority_percentages_compound() {
        let id = ModifierId::Production(GRAIN);
        let modifiers = [
            Modifier::percentage(id, 50).with_priority(1),
            Modifier::percentage(id, 50).with_priority(2),
        ];
        assert_eq!(apply_modifiers(4, &modifiers), 9);
    }

    #[test]
    fn test_negative_percentage_floors() {
        let modifiers = [Modifier::percentage(
            ModifierId::ConsumeOnlySurplusProduction,
            -50,
        )];
        assert_eq!(apply_modifiers(7, &modifiers), 3);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let id = ModifierId::Production(GRAIN);
        assert_eq!(
            apply_modifiers(30_000_000, &[Modifier::percentage(id, 100)]),
            60_000_000
        );
        assert_eq!(
            apply_modifiers(30_000_000, &[Modifier::percentage(id, -50)]),
            15_000_000
        );
        assert_eq!(
            apply_modifiers(i32::MAX, &[Modifier::multiplicative(id, 4)]),
            i32::MAX
        );
    }

    #[test]
    fn test_modifiers_for_filters_by_id() {
        let modifiers = [
            Modifier::additive(ModifierId::Production(GRAIN), 2),
            Modifier::additive(ModifierId::Production(ORE), 5),
            Modifier::additive(ModifierId::WarehouseStorage, 100),
        ];

        let grain: Vec<_> = modifiers_for(&modifiers, ModifierId::Production(GRAIN)).collect();
        assert_eq!(grain.len(), 1);
        assert_eq!(
            apply_modifiers(1, modifiers_for(&modifiers, ModifierId::Production(ORE))),
            6
        );
    }
}
