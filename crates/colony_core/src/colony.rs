//! Colonies: work locations, storage, build queues and turn processing.
//!
//! A [`Colony`] owns its tiles, buildings, stored goods and two build
//! queues, and keeps a [`ProductionCache`] of what they produce. Every
//! mutation invalidates the cache (storage changes only when the goods
//! type was part of the last pass); reads recompute lazily.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::build_queue::{BuildQueue, CompletionAction};
use crate::building::Building;
use crate::consumer::{Consumer, COLONY_PRIORITY, POPULATION_PRIORITY};
use crate::data::{BuildableData, ColonyData, WorkData};
use crate::error::{GameError, Result};
use crate::goods::{AbstractGoods, GoodsTypeId};
use crate::modifiers::{apply_modifiers, ModifierId};
use crate::production::{ProducerId, ProductionInfo, QueueKind};
use crate::production_cache::{ColonyView, ProductionCache, ProductionSnapshot};
use crate::specification::{
    Buildable, BuildableType, BuildingType, BuildingTypeId, Specification, UnitType,
};
use crate::tile::{ColonyTile, TileId};
use crate::type_count_map::TypeCountMap;
use crate::unit::{Unit, UnitId};

/// Where a unit works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkLocation {
    /// On a tile, producing the goods type.
    Tile(TileId, GoodsTypeId),
    /// Inside a building.
    Building(BuildingTypeId),
}

/// Something that happened while ending a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColonyEvent {
    /// Goods beyond warehouse capacity were thrown away.
    GoodsOverflow {
        /// Goods type name.
        goods: String,
        /// Amount discarded.
        lost: i32,
    },
    /// Consumption exceeded production plus storage.
    GoodsShortage {
        /// Goods type name.
        goods: String,
        /// Amount that could not be supplied.
        missing: i32,
    },
    /// A building was completed and added to the colony.
    BuildingCompleted {
        /// Building type name.
        building: String,
    },
    /// A unit was completed and is waiting outside the colony.
    UnitCompleted {
        /// Unit type name.
        unit: String,
        /// Id of the new unit.
        id: UnitId,
    },
}

/// A colony and its production state.
#[derive(Debug, Clone)]
pub struct Colony {
    name: String,
    spec: Arc<Specification>,
    tiles: Vec<ColonyTile>,
    buildings: Vec<Building>,
    outside: Vec<Unit>,
    storage: TypeCountMap<GoodsTypeId>,
    build_queue: BuildQueue<Buildable>,
    population_queue: BuildQueue<Arc<UnitType>>,
    next_unit_id: u32,
    cache: ProductionCache,
}

impl Colony {
    /// Create a colony with the given tiles and no buildings or units.
    ///
    /// The build queue keeps its last item after completion and the
    /// population queue shuffles.
    #[must_use]
    pub fn new(name: impl Into<String>, spec: Arc<Specification>, tiles: Vec<ColonyTile>) -> Self {
        let (build_candidates, population_candidates) = queue_candidates(&spec);
        Self {
            name: name.into(),
            tiles,
            buildings: Vec::new(),
            outside: Vec::new(),
            storage: TypeCountMap::new(),
            build_queue: BuildQueue::new(
                QueueKind::Buildings,
                CompletionAction::RemoveExceptLast,
                COLONY_PRIORITY,
            )
            .with_candidates(build_candidates),
            population_queue: BuildQueue::new(
                QueueKind::Population,
                CompletionAction::Shuffle,
                POPULATION_PRIORITY,
            )
            .with_candidates(population_candidates),
            next_unit_id: 1,
            cache: ProductionCache::new(),
            spec,
        }
    }

    /// Build a colony from data, resolving every name against `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the data is inconsistent, a
    /// [`GameError::DuplicateId`] for a repeated building, or an unknown-type
    /// error for a name the specification does not define.
    pub fn from_data(spec: Arc<Specification>, data: &ColonyData) -> Result<Self> {
        let errors = data.validate();
        if !errors.is_empty() {
            return Err(GameError::InvalidState(format!(
                "Colony '{}': {}",
                data.name,
                errors.join("; ")
            )));
        }

        let tiles = data
            .tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                let id = u16::try_from(i)
                    .map_err(|_| GameError::InvalidState("Too many colony tiles".to_string()))?;
                Ok(ColonyTile::new(
                    TileId(id),
                    tile.center,
                    spec.resolve_goods_list(&tile.production)?,
                )
                .with_modifiers(spec.resolve_modifiers(&tile.modifiers)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut colony = Self::new(data.name.clone(), Arc::clone(&spec), tiles);
        colony.build_queue = BuildQueue::new(
            QueueKind::Buildings,
            data.build_completion,
            COLONY_PRIORITY,
        )
        .with_candidates(colony.build_queue.candidates().to_vec());
        colony.population_queue = BuildQueue::new(
            QueueKind::Population,
            data.population_completion,
            POPULATION_PRIORITY,
        )
        .with_candidates(colony.population_queue.candidates().to_vec());

        for name in &data.buildings {
            let building_type = Arc::clone(spec.require_building_type(name)?);
            if !colony.add_building(building_type) {
                return Err(GameError::DuplicateId {
                    kind: "building",
                    id: name.clone(),
                });
            }
        }

        for unit in &data.units {
            let unit_type = Arc::clone(spec.require_unit_type(&unit.unit_type)?);
            let location = match &unit.work {
                WorkData::Tile(index, goods) => WorkLocation::Tile(
                    TileId(u16::try_from(*index).map_err(|_| {
                        GameError::InvalidState(format!("Tile index {index} out of range"))
                    })?),
                    spec.require_goods_type(goods)?,
                ),
                WorkData::Building(name) => {
                    WorkLocation::Building(spec.require_building_type(name)?.id)
                }
            };
            colony.add_unit(unit_type, location)?;
        }

        for goods in spec.resolve_goods_list(&data.goods)? {
            colony.add_goods(goods.goods_type, goods.amount);
        }

        for item in &data.build_queue {
            let buildable = match item {
                BuildableData::Building(name) => {
                    Buildable::Building(Arc::clone(spec.require_building_type(name)?))
                }
                BuildableData::Unit(name) => {
                    Buildable::Unit(Arc::clone(spec.require_unit_type(name)?))
                }
            };
            colony.build_queue.add(buildable);
        }
        colony.prune_build_queue();
        for name in &data.population_queue {
            colony
                .population_queue
                .add(Arc::clone(spec.require_unit_type(name)?));
        }

        tracing::debug!(
            colony = %colony.name,
            tiles = colony.tiles.len(),
            buildings = colony.buildings.len(),
            units = colony.unit_count(),
            "Created colony"
        );

        Ok(colony)
    }

    /// Colony name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule catalog the colony was built against.
    #[must_use]
    pub fn specification(&self) -> &Arc<Specification> {
        &self.spec
    }

    /// Tiles in the work radius.
    #[must_use]
    pub fn tiles(&self) -> &[ColonyTile] {
        &self.tiles
    }

    /// Look up a tile.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&ColonyTile> {
        self.tiles.iter().find(|t| t.id() == id)
    }

    /// Buildings in the colony.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Look up a building.
    #[must_use]
    pub fn building(&self, id: BuildingTypeId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id() == id)
    }

    /// Whether the colony has a building of this type.
    #[must_use]
    pub fn has_building(&self, id: BuildingTypeId) -> bool {
        self.building(id).is_some()
    }

    /// Units living in the colony (tile workers first).
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.tiles
            .iter()
            .filter_map(ColonyTile::unit)
            .chain(self.buildings.iter().flat_map(|b| b.units().iter()))
    }

    /// Look up a colony unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().find(|u| u.id() == id)
    }

    /// Number of units living in the colony.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units().count()
    }

    /// Units waiting outside the colony.
    #[must_use]
    pub fn outside_units(&self) -> &[Unit] {
        &self.outside
    }

    /// Where a colony unit works.
    #[must_use]
    pub fn work_location(&self, id: UnitId) -> Option<WorkLocation> {
        for tile in &self.tiles {
            if let Some(unit) = tile.unit().filter(|u| u.id() == id) {
                return unit.work_type().map(|g| WorkLocation::Tile(tile.id(), g));
            }
        }
        self.buildings
            .iter()
            .find(|b| b.units().iter().any(|u| u.id() == id))
            .map(|b| WorkLocation::Building(b.id()))
    }

    /// Goods in storage.
    #[must_use]
    pub fn storage(&self) -> &TypeCountMap<GoodsTypeId> {
        &self.storage
    }

    /// Stored amount of a goods type (aliases count under their root).
    #[must_use]
    pub fn goods_count(&self, goods_type: GoodsTypeId) -> i32 {
        self.storage.count(self.spec.stored_as(goods_type))
    }

    /// Warehouse capacity for storable goods.
    #[must_use]
    pub fn warehouse_capacity(&self) -> i32 {
        apply_modifiers(
            self.spec.options().base_warehouse_capacity,
            self.buildings
                .iter()
                .flat_map(|b| b.building_type().modifiers_for(ModifierId::WarehouseStorage)),
        )
    }

    /// The buildings-and-units queue.
    #[must_use]
    pub fn build_queue(&self) -> &BuildQueue<Buildable> {
        &self.build_queue
    }

    /// Edit the buildings-and-units queue.
    pub fn build_queue_mut(&mut self) -> &mut BuildQueue<Buildable> {
        self.cache.invalidate();
        &mut self.build_queue
    }

    /// The population queue.
    #[must_use]
    pub fn population_queue(&self) -> &BuildQueue<Arc<UnitType>> {
        &self.population_queue
    }

    /// Edit the population queue.
    pub fn population_queue_mut(&mut self) -> &mut BuildQueue<Arc<UnitType>> {
        self.cache.invalidate();
        &mut self.population_queue
    }

    /// The production cache.
    #[must_use]
    pub fn cache(&self) -> &ProductionCache {
        &self.cache
    }

    /// The current production snapshot.
    pub fn production(&self) -> Arc<ProductionSnapshot> {
        self.cache.snapshot(self)
    }

    /// Net production of a goods type this turn.
    #[must_use]
    pub fn net_production_of(&self, goods_type: GoodsTypeId) -> i32 {
        self.cache.net_production_of(self, goods_type)
    }

    /// What a producer or consumer does this turn.
    #[must_use]
    pub fn production_info(&self, id: ProducerId) -> Option<ProductionInfo> {
        self.cache.production_info(self, id)
    }

    /// Copy of net production per goods type.
    #[must_use]
    pub fn production_map(&self) -> TypeCountMap<GoodsTypeId> {
        self.cache.production_map(self)
    }

    /// Human-readable name of a producer.
    #[must_use]
    pub fn producer_name(&self, id: ProducerId) -> String {
        match id {
            ProducerId::Colony => "colony".to_string(),
            ProducerId::Tile(tile) => {
                if self.tile(tile).is_some_and(ColonyTile::is_center) {
                    format!("tile {} (centre)", tile.0)
                } else {
                    format!("tile {}", tile.0)
                }
            }
            ProducerId::Building(building) => self
                .spec
                .building_type(building)
                .map_or_else(|| format!("building {}", building.0), |b| b.name.clone()),
            ProducerId::Unit(unit) => match self.unit(unit) {
                Some(u) => format!("unit {} ({})", unit.0, u.unit_type().name),
                None => format!("unit {}", unit.0),
            },
            ProducerId::BuildQueue(QueueKind::Buildings) => "build queue".to_string(),
            ProducerId::BuildQueue(QueueKind::Population) => "population queue".to_string(),
        }
    }

    /// Add a building. Returns `false` if the colony already has one of
    /// this type.
    pub fn add_building(&mut self, building_type: Arc<BuildingType>) -> bool {
        if self.has_building(building_type.id) {
            return false;
        }
        self.buildings.push(Building::new(building_type));
        self.cache.invalidate();
        true
    }

    /// Add a new unit at a work location.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the location cannot take the
    /// unit.
    pub fn add_unit(&mut self, unit_type: Arc<UnitType>, location: WorkLocation) -> Result<UnitId> {
        self.check_location(location, None)?;
        let unit = Unit::new(self.allocate_unit_id(), unit_type);
        let id = unit.id();
        self.place_unit(unit, location)?;
        Ok(id)
    }

    /// Remove a unit from the colony (or from outside it).
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let removed = self.take_unit(id);
        if removed.is_some() {
            self.cache.invalidate();
        }
        removed
    }

    /// Move a unit (from inside or outside the colony) to a work location.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if there is no such unit or the
    /// location cannot take it. The colony is unchanged on error.
    pub fn move_unit(&mut self, id: UnitId, location: WorkLocation) -> Result<()> {
        if self.unit(id).is_none() && !self.outside.iter().any(|u| u.id() == id) {
            return Err(GameError::InvalidState(format!("No unit {}", id.0)));
        }
        self.check_location(location, Some(id))?;
        let unit = self
            .take_unit(id)
            .ok_or_else(|| GameError::InvalidState(format!("No unit {}", id.0)))?;
        self.place_unit(unit, location)
    }

    /// Change the stored amount of a goods type.
    pub fn add_goods(&mut self, goods_type: GoodsTypeId, amount: i32) {
        let root = self.spec.stored_as(goods_type);
        self.storage.increment_count(root, amount);
        self.invalidate_goods(goods_type, root);
    }

    /// Set the stored amount of a goods type.
    pub fn set_goods_count(&mut self, goods_type: GoodsTypeId, amount: i32) {
        let root = self.spec.stored_as(goods_type);
        let current = self.storage.count(root);
        self.storage.increment_count(root, amount.saturating_sub(current));
        self.invalidate_goods(goods_type, root);
    }

    fn invalidate_goods(&self, goods_type: GoodsTypeId, root: GoodsTypeId) {
        self.cache.invalidate_goods(goods_type);
        if root != goods_type {
            self.cache.invalidate_goods(root);
        }
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    fn check_location(&self, location: WorkLocation, moving: Option<UnitId>) -> Result<()> {
        match location {
            WorkLocation::Tile(tile_id, _) => {
                let tile = self
                    .tile(tile_id)
                    .ok_or_else(|| GameError::InvalidState(format!("No tile {}", tile_id.0)))?;
                if tile.is_center() {
                    return Err(GameError::InvalidState(
                        "The centre tile cannot be worked".to_string(),
                    ));
                }
                match tile.unit() {
                    Some(worker) if Some(worker.id()) != moving => Err(GameError::InvalidState(
                        format!("Tile {} is already worked", tile_id.0),
                    )),
                    _ => Ok(()),
                }
            }
            WorkLocation::Building(building_id) => {
                let building = self.building(building_id).ok_or_else(|| {
                    GameError::InvalidState(format!(
                        "Colony has no building '{}'",
                        self.spec
                            .building_type(building_id)
                            .map_or("?", |b| b.name.as_str())
                    ))
                })?;
                let already_inside =
                    moving.is_some_and(|id| building.units().iter().any(|u| u.id() == id));
                if building.has_room() || already_inside {
                    Ok(())
                } else {
                    Err(GameError::InvalidState(format!(
                        "Building '{}' has no free workplace",
                        building.building_type().name
                    )))
                }
            }
        }
    }

    fn place_unit(&mut self, mut unit: Unit, location: WorkLocation) -> Result<()> {
        match location {
            WorkLocation::Tile(tile_id, goods_type) => {
                let tile = self
                    .tiles
                    .iter_mut()
                    .find(|t| t.id() == tile_id)
                    .ok_or_else(|| GameError::InvalidState(format!("No tile {}", tile_id.0)))?;
                unit.set_work_type(Some(goods_type));
                tile.set_unit(unit);
            }
            WorkLocation::Building(building_id) => {
                let building = self
                    .buildings
                    .iter_mut()
                    .find(|b| b.id() == building_id)
                    .ok_or_else(|| {
                        GameError::InvalidState(format!("No building {}", building_id.0))
                    })?;
                unit.set_work_type(None);
                building.add_unit(unit)?;
            }
        }
        self.cache.invalidate();
        Ok(())
    }

    fn take_unit(&mut self, id: UnitId) -> Option<Unit> {
        if let Some(unit) = self.tiles.iter_mut().find_map(|t| t.take_unit(id)) {
            return Some(unit);
        }
        if let Some(unit) = self.buildings.iter_mut().find_map(|b| b.remove_unit(id)) {
            return Some(unit);
        }
        let index = self.outside.iter().position(|u| u.id() == id)?;
        Some(self.outside.remove(index))
    }

    /// Apply one turn of production.
    ///
    /// Net production is added to storage. Storable goods other than food
    /// are capped at warehouse capacity, whether or not they were produced
    /// this turn, and negative totals are clamped to zero; both are
    /// reported. A queue whose head item was paid for this
    /// turn completes it: buildings join the colony, units wait outside.
    pub fn end_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<ColonyEvent> {
        let snapshot = self.cache.snapshot(&*self);
        let capacity = self.warehouse_capacity();
        let mut events = Vec::new();

        let goods_types: BTreeSet<GoodsTypeId> = self
            .storage
            .keys()
            .chain(snapshot.net_production.keys())
            .collect();
        for goods_type in goods_types {
            let net = snapshot.net_production.count(goods_type);
            let name = self.spec.goods_name(goods_type).to_string();
            let current = self.storage.count(goods_type);
            let mut total = current.saturating_add(net);

            if total < 0 {
                tracing::warn!(
                    colony = %self.name,
                    goods = %name,
                    missing = total.saturating_neg(),
                    "Goods shortage"
                );
                events.push(ColonyEvent::GoodsShortage {
                    goods: name.clone(),
                    missing: total.saturating_neg(),
                });
                total = 0;
            }

            if self.spec.is_storable(goods_type)
                && !self.spec.is_food(goods_type)
                && total > capacity
            {
                tracing::warn!(
                    colony = %self.name,
                    goods = %name,
                    lost = total - capacity,
                    "Warehouse overflow"
                );
                events.push(ColonyEvent::GoodsOverflow {
                    goods: name,
                    lost: total - capacity,
                });
                total = capacity;
            }

            self.storage.increment_count(goods_type, total.saturating_sub(current));
        }

        if queue_paid(&snapshot, QueueKind::Buildings) {
            match self.build_queue.complete_current(rng) {
                Some(Buildable::Building(building_type)) => {
                    tracing::info!(
                        colony = %self.name,
                        building = %building_type.name,
                        "Building completed"
                    );
                    let name = building_type.name.clone();
                    self.add_building(building_type);
                    self.prune_build_queue();
                    events.push(ColonyEvent::BuildingCompleted { building: name });
                }
                Some(Buildable::Unit(unit_type)) => {
                    events.push(self.complete_unit(unit_type));
                }
                None => {}
            }
        }

        if queue_paid(&snapshot, QueueKind::Population) {
            if let Some(unit_type) = self.population_queue.complete_current(rng) {
                events.push(self.complete_unit(unit_type));
            }
        }

        self.cache.invalidate();
        events
    }

    /// Drop queued buildings the colony already has.
    fn prune_build_queue(&mut self) {
        let remaining: Vec<Buildable> = self
            .build_queue
            .values()
            .iter()
            .filter(|item| !matches!(item, Buildable::Building(b) if self.has_building(b.id)))
            .cloned()
            .collect();
        if remaining.len() != self.build_queue.len() {
            self.build_queue.set_values(remaining);
            self.cache.invalidate();
        }
    }

    fn complete_unit(&mut self, unit_type: Arc<UnitType>) -> ColonyEvent {
        let id = self.allocate_unit_id();
        tracing::info!(colony = %self.name, unit = %unit_type.name, id = id.0, "Unit completed");
        let event = ColonyEvent::UnitCompleted {
            unit: unit_type.name.clone(),
            id,
        };
        self.outside.push(Unit::new(id, unit_type));
        event
    }

    /// Hash of the colony state, for determinism checks.
    ///
    /// Two colonies with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.name.hash(&mut hasher);
        self.next_unit_id.hash(&mut hasher);
        for (goods_type, amount) in self.storage.iter() {
            goods_type.hash(&mut hasher);
            amount.hash(&mut hasher);
        }
        for tile in &self.tiles {
            tile.id().hash(&mut hasher);
            hash_unit(tile.unit(), &mut hasher);
        }
        for building in &self.buildings {
            building.id().hash(&mut hasher);
            building.units().len().hash(&mut hasher);
            for unit in building.units() {
                hash_unit(Some(unit), &mut hasher);
            }
        }
        self.outside.len().hash(&mut hasher);
        for unit in &self.outside {
            hash_unit(Some(unit), &mut hasher);
        }
        for item in self.build_queue.values() {
            item.name().hash(&mut hasher);
        }
        self.population_queue.len().hash(&mut hasher);
        for item in self.population_queue.values() {
            item.name.hash(&mut hasher);
        }

        hasher.finish()
    }
}

fn hash_unit(unit: Option<&Unit>, hasher: &mut DefaultHasher) {
    if let Some(unit) = unit {
        unit.id().hash(hasher);
        unit.unit_type().id.hash(hasher);
        unit.work_type().hash(hasher);
    } else {
        0u8.hash(hasher);
    }
}

fn queue_paid(snapshot: &ProductionSnapshot, kind: QueueKind) -> bool {
    snapshot
        .production_info(ProducerId::BuildQueue(kind))
        .is_some_and(|info| info.consumption.iter().any(|g| g.amount > 0))
}

/// Random completion pools: units that cost food are bred by the population
/// queue, any other unit with a cost can be built.
fn queue_candidates(spec: &Specification) -> (Vec<Buildable>, Vec<Arc<UnitType>>) {
    let food = spec.food();
    let mut build = Vec::new();
    let mut population = Vec::new();
    for unit_type in spec.unit_types() {
        if unit_type.required_goods.is_empty() {
            continue;
        }
        if unit_type
            .required_goods
            .iter()
            .any(|g| spec.stored_as(g.goods_type) == food)
        {
            population.push(Arc::clone(unit_type));
        } else {
            build.push(Buildable::Unit(Arc::clone(unit_type)));
        }
    }
    (build, population)
}

impl ColonyView for Colony {
    fn specification(&self) -> &Specification {
        &self.spec
    }

    fn tile_production(&self) -> Vec<(ProducerId, Vec<AbstractGoods>)> {
        self.tiles
            .iter()
            .map(|tile| (ProducerId::Tile(tile.id()), tile.production()))
            .collect()
    }

    fn consumers(&self) -> Vec<&dyn Consumer> {
        let mut consumers: Vec<&dyn Consumer> = self
            .units()
            .map(|unit| unit as &dyn Consumer)
            .collect();
        consumers.extend(self.buildings.iter().map(|b| b as &dyn Consumer));
        consumers.push(&self.build_queue);
        consumers.push(&self.population_queue);
        consumers
    }

    fn goods_count(&self, goods_type: GoodsTypeId) -> i32 {
        Colony::goods_count(self, goods_type)
    }

    fn unit_count(&self) -> i32 {
        i32::try_from(Colony::unit_count(self)).unwrap_or(i32::MAX)
    }

    fn warehouse_capacity(&self) -> i32 {
        Colony::warehouse_capacity(self)
    }
}
