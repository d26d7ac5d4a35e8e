//! Production reports after a number of turns.

use std::path::Path;

use colony_core::colony::ColonyEvent;
use colony_core::report::ProductionReport;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::data_loader::{load_colony_file, load_rules_file, DataLoadResult};

/// A colony's production after running some turns.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    /// Turns run before reporting.
    pub turns: u32,
    /// Seed of the RNG driving queue completion.
    pub seed: u64,
    /// Everything that happened, in order.
    pub events: Vec<ColonyEvent>,
    /// Production as of the last turn.
    pub production: ProductionReport,
}

/// Load rules and a colony, run `turns` turns and report.
///
/// # Errors
///
/// Returns an error if either file fails to load.
pub fn run_report(
    rules_path: &Path,
    colony_path: &Path,
    turns: u32,
    seed: u64,
) -> DataLoadResult<TurnReport> {
    let spec = load_rules_file(rules_path)?;
    let mut colony = load_colony_file(&spec, colony_path)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::new();
    for turn in 1..=turns {
        let turn_events = colony.end_turn(&mut rng);
        for event in &turn_events {
            tracing::info!(turn, ?event, "Turn event");
        }
        events.extend(turn_events);
    }

    Ok(TurnReport {
        turns,
        seed,
        events,
        production: ProductionReport::from_colony(&colony),
    })
}
