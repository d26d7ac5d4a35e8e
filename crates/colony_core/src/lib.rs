//! # Colony Core
//!
//! Colony production engine: what a colony's tiles, buildings and units
//! produce and consume each turn.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No file IO
//! - No system randomness (callers pass seeded RNGs)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`data`] - RON data definitions for rules and colonies
//! - [`specification`] - Resolved rule catalog
//! - [`goods`], [`type_count_map`], [`modifiers`] - Value types
//! - [`consumer`] - The consumer contract
//! - [`build_queue`], [`building`], [`unit`], [`tile`] - Producers and consumers
//! - [`production_cache`] - The lazily recomputed resolution pass
//! - [`colony`] - Colony state and turn processing
//! - [`report`] - Serializable production summaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod build_queue;
pub mod building;
pub mod colony;
pub mod consumer;
pub mod data;
pub mod error;
pub mod goods;
pub mod math;
pub mod modifiers;
pub mod production;
pub mod production_cache;
pub mod report;
pub mod specification;
pub mod tile;
pub mod type_count_map;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::build_queue::{BuildQueue, CompletionAction};
    pub use crate::building::Building;
    pub use crate::colony::{Colony, ColonyEvent, WorkLocation};
    pub use crate::consumer::{
        Consumer, ResolveContext, BUILDING_PRIORITY, COLONY_PRIORITY, POPULATION_PRIORITY,
        UNIT_PRIORITY,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::goods::{AbstractGoods, GoodsType, GoodsTypeId};
    pub use crate::math::Fixed;
    pub use crate::modifiers::{Ability, Modifier, ModifierId, ModifierKind};
    pub use crate::production::{ProducerId, ProductionInfo, ProductionMap, QueueKind};
    pub use crate::production_cache::{ColonyView, ProductionCache, ProductionSnapshot};
    pub use crate::report::ProductionReport;
    pub use crate::specification::{
        Buildable, BuildableType, BuildingType, BuildingTypeId, Specification, UnitType,
        UnitTypeId,
    };
    pub use crate::tile::{ColonyTile, TileId};
    pub use crate::type_count_map::TypeCountMap;
    pub use crate::unit::{Unit, UnitId};
}
