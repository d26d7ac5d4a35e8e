//! Build queues for buildings and units.
//!
//! A colony owns two queues: the build queue (buildings and units paid for
//! with hammers and tools) and the population queue (colonists paid for
//! with food). The head of a queue is the item currently being built.
//!
//! A queue is a [`Consumer`]: each production pass it asks for the full
//! requirements of its head item and either receives all of them or
//! nothing at all.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consumer::{Consumer, ResolveContext};
use crate::goods::{find_goods, AbstractGoods, GoodsTypeId};
use crate::modifiers::Ability;
use crate::production::{ProducerId, ProductionInfo, QueueKind};
use crate::specification::BuildableType;

/// What happens to a queue when its head item completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionAction {
    /// Pop the completed item.
    Remove,
    /// Pop the completed item unless it is the last one.
    RemoveExceptLast,
    /// Keep every item and shuffle the queue.
    Shuffle,
    /// Pop the completed item and append a random candidate.
    AddRandom,
}

/// An ordered backlog of buildable items.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildQueue<T: BuildableType> {
    kind: QueueKind,
    items: Vec<T>,
    completion_action: CompletionAction,
    priority: i32,
    candidates: Vec<T>,
}

impl<T: BuildableType> BuildQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new(kind: QueueKind, completion_action: CompletionAction, priority: i32) -> Self {
        Self {
            kind,
            items: Vec::new(),
            completion_action,
            priority,
            candidates: Vec::new(),
        }
    }

    /// Set the pool [`CompletionAction::AddRandom`] draws from.
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<T>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Which colony queue this is.
    #[must_use]
    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// What happens when the head item completes.
    #[must_use]
    pub fn completion_action(&self) -> CompletionAction {
        self.completion_action
    }

    /// Items [`CompletionAction::AddRandom`] may append.
    #[must_use]
    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    /// The item currently being built.
    #[must_use]
    pub fn currently_building(&self) -> Option<&T> {
        self.items.first()
    }

    /// Put `item` at the head of the queue.
    ///
    /// A building already in the queue is moved rather than duplicated.
    pub fn set_currently_building(&mut self, item: T) {
        if item.is_building() {
            self.items.retain(|queued| *queued != item);
        }
        self.items.insert(0, item);
    }

    /// Append an item.
    ///
    /// Returns `false` (and leaves the queue unchanged) if the item is a
    /// building that is already queued.
    pub fn add(&mut self, item: T) -> bool {
        if item.is_building() && self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Queued items, head first.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.items
    }

    /// Replace the queue contents.
    ///
    /// Repeated buildings after their first occurrence are dropped.
    pub fn set_values(&mut self, items: Vec<T>) {
        self.items.clear();
        for item in items {
            self.add(item);
        }
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply the completion action after the head item has been built.
    ///
    /// Returns the completed item, or `None` if the queue was empty.
    pub fn complete_current<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        let completed = self.currently_building()?.clone();
        match self.completion_action {
            CompletionAction::Remove => {
                self.items.remove(0);
            }
            CompletionAction::RemoveExceptLast => {
                if self.items.len() > 1 {
                    self.items.remove(0);
                }
            }
            CompletionAction::Shuffle => {
                self.items.shuffle(rng);
            }
            CompletionAction::AddRandom => {
                self.items.remove(0);
                if let Some(next) = self.candidates.choose(rng).cloned() {
                    self.add(next);
                }
            }
        }
        Some(completed)
    }
}

impl<T: BuildableType> Consumer for BuildQueue<T> {
    fn producer_id(&self) -> ProducerId {
        ProducerId::BuildQueue(self.kind)
    }

    fn consumed_goods(&self) -> Vec<AbstractGoods> {
        self.currently_building()
            .map(|item| item.required_goods().to_vec())
            .unwrap_or_default()
    }

    fn consumes(&self, goods_type: GoodsTypeId) -> bool {
        self.currently_building().is_some_and(|item| {
            item.required_goods()
                .iter()
                .any(|g| g.matches(goods_type) && g.amount > 0)
        })
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn has_ability(&self, ability: Ability) -> bool {
        ability == Ability::ConsumeAllOrNothing
    }

    fn resolve_production(
        &self,
        ctx: &ResolveContext<'_>,
        input: &[AbstractGoods],
        _output: Option<AbstractGoods>,
    ) -> Option<ProductionInfo> {
        let mut info = ProductionInfo::new();
        let Some(current) = self.currently_building() else {
            return Some(info);
        };

        let save_overflow = ctx.spec.options().save_production_overflow;
        let mut consumption = Vec::with_capacity(current.required_goods().len());
        for required in current.required_goods() {
            let Some(available) = find_goods(input, required.goods_type)
                .filter(|available| available.amount >= required.amount)
            else {
                tracing::trace!(
                    queue = ?self.kind,
                    item = current.name(),
                    goods = ctx.spec.goods_name(required.goods_type),
                    "Build requirement not met"
                );
                info.maximum_consumption = current.required_goods().to_vec();
                return Some(info);
            };

            // Non-storable goods that cannot be carried over are used up.
            let amount = if save_overflow || ctx.spec.is_storable(required.goods_type) {
                required.amount
            } else {
                available.amount
            };
            consumption.push(required.with_amount(amount));
        }

        info.consumption = consumption;
        info.maximum_consumption = current.required_goods().to_vec();
        Some(info)
    }
}
