//! Lazily recomputed production results for one colony.
//!
//! # Resolution pass
//!
//! A pass turns the colony's current layout into a [`ProductionSnapshot`]:
//!
//! 1. Every tile adds its production to the raw [`ProductionMap`] and to
//!    net production (under the stored-as root of each goods type).
//! 2. The colony produces a baseline of bells for up to
//!    `units_that_use_no_bells` colonists. This counts towards net
//!    production only.
//! 3. Consumers are resolved in descending priority order. Each sees the
//!    surplus of the goods it consumes: raw production plus storage, or raw
//!    production scaled by its `ConsumeOnlySurplusProduction` modifiers if
//!    it has any. Whatever a consumer does is folded back into the raw map,
//!    so lower priority consumers only see what is left.
//!
//! The pass is a pure function of the colony view. The cache swaps in a new
//! snapshot only after a pass has finished, so readers never see a half
//! built result.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::consumer::{sort_by_priority, Consumer, ResolveContext};
use crate::goods::{AbstractGoods, GoodsTypeId};
use crate::modifiers::{apply_modifiers, ModifierId};
use crate::production::{ProducerId, ProductionInfo, ProductionMap};
use crate::specification::Specification;
use crate::type_count_map::TypeCountMap;

/// What the production cache needs to know about a colony.
pub trait ColonyView {
    /// The rule catalog.
    fn specification(&self) -> &Specification;

    /// Production of every tile, keyed by the tile's producer id.
    fn tile_production(&self) -> Vec<(ProducerId, Vec<AbstractGoods>)>;

    /// Every consumer in the colony, in any order.
    fn consumers(&self) -> Vec<&dyn Consumer>;

    /// Goods in storage, counted under the stored-as root.
    fn goods_count(&self, goods_type: GoodsTypeId) -> i32;

    /// Number of units living in the colony.
    fn unit_count(&self) -> i32;

    /// Warehouse capacity for storable goods.
    fn warehouse_capacity(&self) -> i32;
}

/// Result of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionSnapshot {
    /// Net production per stored-as root goods type.
    pub net_production: TypeCountMap<GoodsTypeId>,
    /// What each producer and consumer did.
    pub production_and_consumption: BTreeMap<ProducerId, ProductionInfo>,
    /// Goods types any producer or consumer touched.
    pub goods_used: BTreeSet<GoodsTypeId>,
}

impl ProductionSnapshot {
    /// Net production of a goods type (zero if untouched).
    #[must_use]
    pub fn net_production_of(&self, goods_type: GoodsTypeId) -> i32 {
        self.net_production.count(goods_type)
    }

    /// Record of one producer or consumer.
    #[must_use]
    pub fn production_info(&self, id: ProducerId) -> Option<&ProductionInfo> {
        self.production_and_consumption.get(&id)
    }
}

/// Run a resolution pass over a colony.
pub fn compute_snapshot<V: ColonyView + ?Sized>(colony: &V) -> ProductionSnapshot {
    let spec = colony.specification();
    let mut raw = ProductionMap::new();
    let mut snapshot = ProductionSnapshot::default();

    for (id, production) in colony.tile_production() {
        for goods in &production {
            raw.add(spec, *goods);
            snapshot.goods_used.insert(goods.goods_type);
            snapshot
                .net_production
                .increment_count(spec.stored_as(goods.goods_type), goods.amount);
        }
        snapshot
            .production_and_consumption
            .insert(id, ProductionInfo::producing(production));
    }

    let bells = spec.bells();
    let free_bells = spec
        .options()
        .units_that_use_no_bells
        .min(colony.unit_count())
        .max(0);
    snapshot.production_and_consumption.insert(
        ProducerId::Colony,
        ProductionInfo::producing(vec![AbstractGoods::new(bells, free_bells)]),
    );
    snapshot
        .net_production
        .increment_count(spec.stored_as(bells), free_bells);

    let ctx = ResolveContext {
        spec,
        warehouse_capacity: colony.warehouse_capacity(),
    };
    let mut consumers = colony.consumers();
    sort_by_priority(&mut consumers);

    for consumer in &consumers {
        let surplus_modifiers = consumer.modifiers(ModifierId::ConsumeOnlySurplusProduction);
        let input: Vec<AbstractGoods> = consumer
            .consumed_goods()
            .iter()
            .map(|wanted| {
                snapshot.goods_used.insert(wanted.goods_type);
                let produced = raw.get(spec, wanted.goods_type);
                let available = if surplus_modifiers.is_empty() {
                    produced + colony.goods_count(wanted.goods_type)
                } else {
                    apply_modifiers(produced, &surplus_modifiers)
                };
                wanted.with_amount(available)
            })
            .collect();

        let output = consumer.output_type().map(|output_type| {
            snapshot.goods_used.insert(output_type);
            AbstractGoods::new(
                output_type,
                raw.get(spec, output_type) + colony.goods_count(output_type),
            )
        });

        let Some(info) = consumer.resolve_production(&ctx, &input, output) else {
            continue;
        };

        raw.add_all(spec, &info.production);
        raw.remove_all(spec, &info.consumption);
        for goods in &info.production {
            snapshot
                .net_production
                .increment_count(spec.stored_as(goods.goods_type), goods.amount);
        }
        for goods in &info.consumption {
            snapshot
                .net_production
                .increment_count(spec.stored_as(goods.goods_type), -goods.amount);
        }

        tracing::trace!(
            consumer = ?consumer.producer_id(),
            priority = consumer.priority(),
            produced = info.production.len(),
            consumed = info.consumption.len(),
            "Resolved consumer"
        );
        snapshot
            .production_and_consumption
            .insert(consumer.producer_id(), info);
    }

    #[cfg(feature = "debug-validation")]
    validate_net_production(spec, &snapshot);

    tracing::debug!(
        consumers = consumers.len(),
        goods_used = snapshot.goods_used.len(),
        "Recomputed colony production"
    );

    snapshot
}

/// Check that net production equals the sum of every recorded line.
#[cfg(feature = "debug-validation")]
fn validate_net_production(spec: &Specification, snapshot: &ProductionSnapshot) {
    let mut expected = TypeCountMap::new();
    for info in snapshot.production_and_consumption.values() {
        for g in &info.production {
            expected.increment_count(spec.stored_as(g.goods_type), g.amount);
        }
        for g in &info.consumption {
            expected.increment_count(spec.stored_as(g.goods_type), -g.amount);
        }
    }
    assert_eq!(
        expected, snapshot.net_production,
        "net production does not match producer records"
    );
}

#[derive(Debug)]
struct CacheState {
    snapshot: Arc<ProductionSnapshot>,
    up_to_date: bool,
    recompute_count: u64,
}

/// Per-colony cache of production results.
///
/// A cache belongs to exactly one colony: every getter must be passed the
/// same [`ColonyView`] that filled it. The cache does not record which view
/// that was, so reading through a different view while the cache is up to
/// date returns the other colony's stale results.
///
/// Every reader brings the cache up to date first. Readers and
/// invalidations may come from different threads; the whole recompute runs
/// under one lock so concurrent readers never compute the same pass twice.
#[derive(Debug)]
pub struct ProductionCache {
    state: Mutex<CacheState>,
}

impl Default for ProductionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProductionCache {
    /// A clone starts stale; it will be filled from whichever colony reads it.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl ProductionCache {
    /// Create a stale, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                snapshot: Arc::new(ProductionSnapshot::default()),
                up_to_date: false,
                recompute_count: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panicking pass never replaced the snapshot, so the state is
        // still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the cache stale.
    pub fn invalidate(&self) {
        self.lock().up_to_date = false;
    }

    /// Mark the cache stale if the last pass touched `goods_type`.
    ///
    /// Returns whether the cache was invalidated.
    pub fn invalidate_goods(&self, goods_type: GoodsTypeId) -> bool {
        let mut state = self.lock();
        if state.snapshot.goods_used.contains(&goods_type) {
            state.up_to_date = false;
            true
        } else {
            false
        }
    }

    /// Whether the next read will be served without a pass.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.lock().up_to_date
    }

    /// Number of passes run so far.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.lock().recompute_count
    }

    /// The current snapshot, recomputing it first if stale.
    ///
    /// `colony` must be the view this cache belongs to.
    pub fn snapshot<V: ColonyView + ?Sized>(&self, colony: &V) -> Arc<ProductionSnapshot> {
        let mut state = self.lock();
        if !state.up_to_date {
            let fresh = compute_snapshot(colony);
            state.snapshot = Arc::new(fresh);
            state.up_to_date = true;
            state.recompute_count += 1;
        }
        Arc::clone(&state.snapshot)
    }

    /// Net production of a goods type.
    pub fn net_production_of<V: ColonyView + ?Sized>(
        &self,
        colony: &V,
        goods_type: GoodsTypeId,
    ) -> i32 {
        self.snapshot(colony).net_production_of(goods_type)
    }

    /// What one producer or consumer did in the last pass.
    pub fn production_info<V: ColonyView + ?Sized>(
        &self,
        colony: &V,
        id: ProducerId,
    ) -> Option<ProductionInfo> {
        self.snapshot(colony).production_info(id).cloned()
    }

    /// A copy of the net production map.
    pub fn production_map<V: ColonyView + ?Sized>(&self, colony: &V) -> TypeCountMap<GoodsTypeId> {
        self.snapshot(colony).net_production.clone()
    }
}
