//! Colony layout data used to set up colonies from files.

use serde::{Deserialize, Serialize};

use super::goods_data::{GoodsAmount, ModifierData};
use crate::build_queue::CompletionAction;
use crate::error::{GameError, Result};

/// A tile in the colony's work radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    /// Whether this is the colony centre tile (produces unattended).
    #[serde(default)]
    pub center: bool,

    /// Base production per goods type.
    #[serde(default)]
    pub production: Vec<GoodsAmount>,

    /// Improvements and resource bonuses.
    #[serde(default)]
    pub modifiers: Vec<ModifierData>,
}

/// Where a colony unit works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkData {
    /// Works tile `index` (into the colony's tile list) producing the goods.
    Tile(usize, String),
    /// Works inside the named building.
    Building(String),
}

/// A unit placed in the colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyUnitData {
    /// Unit type id.
    pub unit_type: String,
    /// Work location.
    pub work: WorkData,
}

/// An item in the colony build queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildableData {
    /// A building type id.
    Building(String),
    /// A unit type id.
    Unit(String),
}

/// Data-driven colony definition.
///
/// # Example RON
///
/// ```ron
/// ColonyData(
///     name: "Jamestown",
///     tiles: [(center: true, production: [(goods: "grain", amount: 5)])],
///     buildings: ["town_hall", "carpenter_house"],
///     units: [(unit_type: "free_colonist", work: Building("carpenter_house"))],
///     goods: [(goods: "lumber", amount: 30)],
///     build_queue: [Building("stockade")],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyData {
    /// Colony name.
    pub name: String,

    /// Tiles, centre tile included.
    #[serde(default)]
    pub tiles: Vec<TileData>,

    /// Building type ids present in the colony.
    #[serde(default)]
    pub buildings: Vec<String>,

    /// Units and where they work.
    #[serde(default)]
    pub units: Vec<ColonyUnitData>,

    /// Goods in storage.
    #[serde(default)]
    pub goods: Vec<GoodsAmount>,

    /// Items in the build queue, head first.
    #[serde(default)]
    pub build_queue: Vec<BuildableData>,

    /// Unit type ids in the population queue, head first.
    #[serde(default)]
    pub population_queue: Vec<String>,

    /// Completion action of the build queue.
    #[serde(default = "default_build_completion")]
    pub build_completion: CompletionAction,

    /// Completion action of the population queue.
    #[serde(default = "default_population_completion")]
    pub population_completion: CompletionAction,
}

const fn default_build_completion() -> CompletionAction {
    CompletionAction::RemoveExceptLast
}

const fn default_population_completion() -> CompletionAction {
    CompletionAction::Shuffle
}

impl ColonyData {
    /// Check that tile references are in range and the centre is unique.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let centers = self.tiles.iter().filter(|t| t.center).count();
        if centers > 1 {
            errors.push(format!("Colony '{}' has {centers} centre tiles", self.name));
        }

        for unit in &self.units {
            if let WorkData::Tile(index, _) = &unit.work {
                match self.tiles.get(*index) {
                    None => errors.push(format!(
                        "Unit '{}' works missing tile {index}",
                        unit.unit_type
                    )),
                    Some(tile) if tile.center => errors.push(format!(
                        "Unit '{}' cannot work the centre tile",
                        unit.unit_type
                    )),
                    Some(_) => {}
                }
            }
        }

        errors
    }
}

/// Parse a colony definition from RON text.
///
/// # Errors
///
/// Returns [`GameError::DataParseError`] if the text is not a valid colony.
pub fn parse_colony(source: &str, label: &str) -> Result<ColonyData> {
    ron::from_str(source).map_err(|e| GameError::DataParseError {
        path: label.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colony() {
        let source = r#"
            ColonyData(
                name: "Roanoke",
                tiles: [
                    (center: true, production: [(goods: "grain", amount: 5)]),
                    (production: [(goods: "lumber", amount: 4)]),
                ],
                buildings: ["town_hall"],
                units: [(unit_type: "free_colonist", work: Tile(1, "lumber"))],
                build_queue: [Unit("free_colonist"), Building("stockade")],
            )
        "#;

        let colony = parse_colony(source, "roanoke.ron").unwrap();
        assert_eq!(colony.name, "Roanoke");
        assert_eq!(colony.tiles.len(), 2);
        assert_eq!(colony.units[0].work, WorkData::Tile(1, "lumber".to_string()));
        assert_eq!(colony.build_queue.len(), 2);
        assert_eq!(colony.build_completion, CompletionAction::RemoveExceptLast);
        assert_eq!(colony.population_completion, CompletionAction::Shuffle);
        assert!(colony.validate().is_empty());
    }

    #[test]
    fn test_validate_bad_tile_references() {
        let colony = ColonyData {
            name: "Bad".to_string(),
            tiles: vec![TileData {
                center: true,
                production: vec![],
                modifiers: vec![],
            }],
            buildings: vec![],
            units: vec![
                ColonyUnitData {
                    unit_type: "free_colonist".to_string(),
                    work: WorkData::Tile(0, "grain".to_string()),
                },
                ColonyUnitData {
                    unit_type: "free_colonist".to_string(),
                    work: WorkData::Tile(4, "grain".to_string()),
                },
            ],
            goods: vec![],
            build_queue: vec![],
            population_queue: vec![],
            build_completion: CompletionAction::Remove,
            population_completion: CompletionAction::Remove,
        };

        let errors = colony.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("centre tile"));
        assert!(errors[1].contains("missing tile 4"));
    }
}
