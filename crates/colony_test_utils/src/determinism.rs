//! Determinism testing utilities.
//!
//! Provides a harness for verifying that colony turns produce identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Turn processing must be reproducible so saved games replay and
//! regression tests stay stable. Sources of non-determinism include:
//!
//! - **Floating-point math**: modifiers use fixed-point arithmetic via
//!   [`colony_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Goods counts and producer maps iterate in key order.
//!
//! - **System randomness**: queue completion actions draw from a
//!   caller-supplied RNG. The harness always seeds a `ChaCha8Rng`.
//!
//! - **Shared cache state**: the production cache is recomputed lazily.
//!   A stale cache must never leak into turn results.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual consumers resolve deterministically
//! 2. **Property tests**: random layouts still produce reproducible turns
//! 3. **Integration tests**: multi-turn colony runs are reproducible
//! 4. **Parallel tests**: running N colonies on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use colony_core::colony::{Colony, ColonyEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns simulated.
    pub turns: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Colony turns are non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use colony_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// A colony paired with the seeded RNG that drives its turns.
#[derive(Debug, Clone)]
pub struct SeededColony {
    /// The colony.
    pub colony: Colony,
    /// RNG passed to every `end_turn`.
    pub rng: ChaCha8Rng,
}

impl SeededColony {
    /// Pair a colony with an RNG seeded from `seed`.
    #[must_use]
    pub fn new(colony: Colony, seed: u64) -> Self {
        Self {
            colony,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Run one turn.
    pub fn end_turn(&mut self) -> Vec<ColonyEvent> {
        self.colony.end_turn(&mut self.rng)
    }
}

/// Run `turns` turns of a colony with a seeded RNG, collecting every event.
pub fn run_turns(colony: &mut Colony, turns: u64, seed: u64) -> Vec<ColonyEvent> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::new();
    for _ in 0..turns {
        events.extend(colony.end_turn(&mut rng));
    }
    events
}

/// Run a colony twice with the same seed and compare final state hashes.
///
/// # Example
///
/// ```ignore
/// use colony_test_utils::{determinism, fixtures};
///
/// let spec = fixtures::classic_spec();
/// let result = determinism::verify_colony_determinism(|| fixtures::jamestown(&spec), 20, 7);
/// result.assert_deterministic();
/// ```
pub fn verify_colony_determinism<F>(setup_fn: F, turns: u64, seed: u64) -> DeterminismResult
where
    F: Fn() -> Colony,
{
    verify_determinism(
        2,
        turns,
        || SeededColony::new(setup_fn(), seed),
        |run| {
            run.end_turn();
        },
        |run| run.colony.state_hash(),
    )
}

/// Result of parallel colony runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of turns each run simulated.
    pub turns: u64,
    /// Number of runs.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all runs produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all runs matched.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel colony runs diverged!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_runs,
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N colonies on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling,
/// such as a production cache shared incorrectly between runs.
///
/// # Panics
///
/// Panics if a run panics.
pub fn run_parallel_colonies_scoped<F>(
    setup_fn: F,
    num_runs: usize,
    turns: u64,
    seed: u64,
) -> ParallelRunResult
where
    F: Fn() -> Colony + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut colony = setup_fn();
                    run_turns(&mut colony, turns, seed);
                    colony.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("colony run panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        turns,
        num_runs,
    }
}

/// Compare two colony runs turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(turn)` for the first turn after which
/// the state hashes differ (0 means the initial states already differ).
pub fn find_first_divergence<F>(setup_fn: F, turns: u64, seed: u64) -> Option<u64>
where
    F: Fn() -> Colony,
{
    let mut run1 = SeededColony::new(setup_fn(), seed);
    let mut run2 = SeededColony::new(setup_fn(), seed);

    if run1.colony.state_hash() != run2.colony.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        let events1 = run1.end_turn();
        let events2 = run2.end_turn();

        if events1 != events2 || run1.colony.state_hash() != run2.colony.state_hash() {
            tracing::debug!(turn, "Colony runs diverged");
            return Some(turn);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for colony testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing against the classic rules.
pub mod strategies {
    use colony_core::data::{ColonyData, ColonyUnitData, GoodsAmount, TileData, WorkData};
    use proptest::prelude::*;

    /// Goods a tile can yield under the classic rules.
    pub const TILE_GOODS: &[&str] = &[
        "grain", "fish", "sugar", "tobacco", "cotton", "furs", "lumber", "ore",
    ];

    /// Unit types that can work tiles under the classic rules.
    pub const WORKERS: &[&str] = &[
        "free_colonist",
        "expert_farmer",
        "expert_fisherman",
        "expert_lumberjack",
    ];

    /// Buildings a generated colony may have under the classic rules.
    pub const BUILDINGS: &[&str] = &[
        "town_hall",
        "chapel",
        "carpenter_house",
        "blacksmith_house",
        "stables",
        "warehouse",
    ];

    /// Generate a goods amount (-50 to 50).
    pub fn arb_amount() -> impl Strategy<Value = i32> {
        -50i32..50i32
    }

    /// Generate a stored goods amount (0 to 300).
    pub fn arb_stock() -> impl Strategy<Value = i32> {
        0i32..300i32
    }

    /// Generate a sequence of `(key, delta)` increments over a few keys.
    pub fn arb_increments(max_len: usize) -> impl Strategy<Value = Vec<(u16, i32)>> {
        proptest::collection::vec((0u16..6u16, arb_amount()), 0..max_len)
    }

    /// Generate a tile yielding one to three goods types.
    pub fn arb_tile(center: bool) -> impl Strategy<Value = TileData> {
        proptest::sample::subsequence(TILE_GOODS, 1..=3)
            .prop_flat_map(|names| {
                let len = names.len();
                (Just(names), proptest::collection::vec(0i32..8i32, len))
            })
            .prop_map(move |(names, amounts)| TileData {
                center,
                production: names
                    .into_iter()
                    .zip(amounts)
                    .map(|(goods, amount)| GoodsAmount::new(goods, amount))
                    .collect(),
                modifiers: Vec::new(),
            })
    }

    /// Generate a colony layout for the classic rules.
    ///
    /// The centre tile comes first; each other tile may be worked by a
    /// unit producing one of the tile's goods.
    pub fn arb_colony(max_tiles: usize) -> impl Strategy<Value = ColonyData> {
        (
            arb_tile(true),
            proptest::collection::vec(
                (
                    arb_tile(false),
                    proptest::option::of((proptest::sample::select(WORKERS), any::<usize>())),
                ),
                0..max_tiles,
            ),
            proptest::sample::subsequence(BUILDINGS, 0..=BUILDINGS.len()),
            proptest::collection::vec(
                (proptest::sample::select(TILE_GOODS), arb_stock()),
                0..4,
            ),
        )
            .prop_map(|(center, worked, buildings, stock)| {
                let mut tiles = vec![center];
                let mut units = Vec::new();
                for (index, (tile, worker)) in worked.into_iter().enumerate() {
                    if let Some((unit_type, pick)) = worker {
                        let goods = tile.production[pick % tile.production.len()].goods.clone();
                        units.push(ColonyUnitData {
                            unit_type: unit_type.to_string(),
                            work: WorkData::Tile(index + 1, goods),
                        });
                    }
                    tiles.push(tile);
                }

                let mut goods: Vec<GoodsAmount> = Vec::new();
                for (name, amount) in stock {
                    if !goods.iter().any(|g| g.goods == name) {
                        goods.push(GoodsAmount::new(name, amount));
                    }
                }

                ColonyData {
                    name: "Generated".to_string(),
                    tiles,
                    buildings: buildings.into_iter().map(str::to_string).collect(),
                    units,
                    goods,
                    build_queue: Vec::new(),
                    population_queue: vec!["free_colonist".to_string()],
                    build_completion: colony_core::build_queue::CompletionAction::RemoveExceptLast,
                    population_completion: colony_core::build_queue::CompletionAction::Shuffle,
                }
            })
    }
}
