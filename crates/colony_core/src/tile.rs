//! Tiles in a colony's work radius.
//!
//! The centre tile works itself and yields every goods type it has base
//! production for. Any other tile yields only what its worker chooses to
//! produce, and nothing at all while unworked.

use serde::{Deserialize, Serialize};

use crate::goods::{amount_of, AbstractGoods, GoodsTypeId};
use crate::modifiers::{apply_modifiers, modifiers_for, Modifier, ModifierId};
use crate::unit::{Unit, UnitId};

/// Index of a tile within its colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u16);

impl TileId {
    /// Create a new tile ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// A tile the colony can work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColonyTile {
    id: TileId,
    center: bool,
    base_production: Vec<AbstractGoods>,
    modifiers: Vec<Modifier>,
    unit: Option<Unit>,
}

impl ColonyTile {
    /// Create an unworked tile.
    #[must_use]
    pub fn new(id: TileId, center: bool, base_production: Vec<AbstractGoods>) -> Self {
        Self {
            id,
            center,
            base_production,
            modifiers: Vec::new(),
            unit: None,
        }
    }

    /// Add improvement and resource modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Tile id.
    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Whether this is the colony centre tile.
    #[must_use]
    pub fn is_center(&self) -> bool {
        self.center
    }

    /// Base production before modifiers.
    #[must_use]
    pub fn base_production(&self) -> &[AbstractGoods] {
        &self.base_production
    }

    /// Improvement and resource modifiers.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The unit working this tile.
    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// Whether a unit can be placed here.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.center && self.unit.is_none()
    }

    /// Place a unit, returning whoever worked the tile before.
    pub fn set_unit(&mut self, unit: Unit) -> Option<Unit> {
        self.unit.replace(unit)
    }

    /// Remove the worker if it has the given id.
    pub fn take_unit(&mut self, id: UnitId) -> Option<Unit> {
        if self.unit.as_ref().is_some_and(|u| u.id() == id) {
            self.unit.take()
        } else {
            None
        }
    }

    /// Production of `goods_type` by this tile worked by `unit`.
    ///
    /// Tiles with no base production of a goods type never produce it,
    /// whatever their bonuses.
    #[must_use]
    pub fn potential_production(&self, goods_type: GoodsTypeId, unit: Option<&Unit>) -> i32 {
        let base = amount_of(&self.base_production, goods_type);
        if base <= 0 {
            return 0;
        }

        let expert = unit.map(|u| u.production_modifiers(goods_type)).unwrap_or_default();
        let modifiers = modifiers_for(&self.modifiers, ModifierId::Production(goods_type))
            .chain(expert.iter());
        apply_modifiers(base, modifiers).max(0)
    }

    /// What the tile produces this turn.
    #[must_use]
    pub fn production(&self) -> Vec<AbstractGoods> {
        if self.center {
            return self
                .base_production
                .iter()
                .map(|g| g.with_amount(self.potential_production(g.goods_type, None)))
                .filter(|g| g.amount > 0)
                .collect();
        }

        let Some(unit) = &self.unit else {
            return Vec::new();
        };
        let Some(work_type) = unit.work_type() else {
            return Vec::new();
        };
        let amount = self.potential_production(work_type, Some(unit));
        if amount > 0 {
            vec![AbstractGoods::new(work_type, amount)]
        } else {
            Vec::new()
        }
    }
}
