//! Goods types and typed goods amounts.
//!
//! A [`GoodsType`] is static catalog data owned by the
//! [`Specification`](crate::specification::Specification). Everything else
//! in the engine refers to goods through the copyable [`GoodsTypeId`], which
//! is resolved once when rules are loaded.

use serde::{Deserialize, Serialize};

/// Unique identifier for goods types.
///
/// The wrapped value is the index of the type in its specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodsTypeId(pub u16);

impl GoodsTypeId {
    /// Create a new goods type ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Index of this type in the specification's goods table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Static definition of a kind of goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsType {
    /// Unique identifier for this goods type.
    pub id: GoodsTypeId,
    /// Data identifier (e.g. `"lumber"`).
    pub name: String,
    /// Whether the goods can be kept in the colony warehouse.
    pub storable: bool,
    /// Whether the goods are a kind of food.
    pub food: bool,
    /// Whether the goods are a raw building material.
    pub raw_building_material: bool,
    /// Type under which this type's amounts are accounted.
    pub stored_as: GoodsTypeId,
}

impl GoodsType {
    /// Whether this type is accounted under a different type.
    #[must_use]
    pub fn is_stored_as_other(&self) -> bool {
        self.stored_as != self.id
    }
}

/// An amount of one goods type, not tied to any physical storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbstractGoods {
    /// The goods type.
    pub goods_type: GoodsTypeId,
    /// The amount.
    pub amount: i32,
}

impl AbstractGoods {
    /// Create a new goods amount.
    #[must_use]
    pub const fn new(goods_type: GoodsTypeId, amount: i32) -> Self {
        Self { goods_type, amount }
    }

    /// Same goods type with a different amount.
    #[must_use]
    pub const fn with_amount(self, amount: i32) -> Self {
        Self {
            goods_type: self.goods_type,
            amount,
        }
    }

    /// Whether this line is of the given goods type.
    #[must_use]
    pub fn matches(&self, goods_type: GoodsTypeId) -> bool {
        self.goods_type == goods_type
    }
}

/// Find the first line of a goods type in a goods list.
#[must_use]
pub fn find_goods(goods: &[AbstractGoods], goods_type: GoodsTypeId) -> Option<&AbstractGoods> {
    goods.iter().find(|g| g.matches(goods_type))
}

/// Total amount of a goods type across a goods list.
#[must_use]
pub fn amount_of(goods: &[AbstractGoods], goods_type: GoodsTypeId) -> i32 {
    goods
        .iter()
        .filter(|g| g.matches(goods_type))
        .map(|g| g.amount)
        .sum()
}
