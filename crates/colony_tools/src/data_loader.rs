//! Rule and colony loading from RON files.
//!
//! Reads files, parses them, validates the data and resolves it against
//! the core types. Every error carries the path it came from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colony_core::colony::Colony;
use colony_core::data::{ColonyData, RulesData};
use colony_core::error::GameError;
use colony_core::specification::Specification;
use thiserror::Error;

/// Errors that can occur during data loading.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Failed to read a file or directory.
    #[error("Failed to read '{path}': {source}")]
    IoError {
        /// Path that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a RON file.
    #[error("Failed to parse RON file '{path}': {source}")]
    ParseError {
        /// Path to the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Data validation failed.
    #[error("Validation failed for '{name}': {errors:?}")]
    ValidationError {
        /// Rule set or colony that failed validation.
        name: String,
        /// List of validation errors.
        errors: Vec<String>,
    },

    /// Valid data that does not resolve against the rules.
    #[error("Failed to resolve '{path}': {source}")]
    ResolveError {
        /// Path to the file.
        path: String,
        /// Underlying core error.
        #[source]
        source: GameError,
    },
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

fn read_file(path: &Path) -> DataLoadResult<String> {
    std::fs::read_to_string(path).map_err(|e| DataLoadError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> DataLoadResult<T> {
    let contents = read_file(path)?;
    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load and resolve a rule set from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, validated or
/// resolved.
pub fn load_rules_file(path: &Path) -> DataLoadResult<Arc<Specification>> {
    let rules: RulesData = parse_file(path)?;

    let errors = rules.validate();
    if !errors.is_empty() {
        return Err(DataLoadError::ValidationError {
            name: rules.id,
            errors,
        });
    }

    let spec = Specification::from_rules(&rules).map_err(|e| DataLoadError::ResolveError {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::info!(
        "Loaded rules '{}' with {} goods, {} buildings, {} units",
        rules.id,
        rules.goods.len(),
        rules.buildings.len(),
        rules.units.len()
    );

    Ok(Arc::new(spec))
}

/// Load colony data from a RON file without resolving it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_colony_data_file(path: &Path) -> DataLoadResult<ColonyData> {
    let data: ColonyData = parse_file(path)?;

    let errors = data.validate();
    if !errors.is_empty() {
        return Err(DataLoadError::ValidationError {
            name: data.name,
            errors,
        });
    }

    Ok(data)
}

/// Load a colony from a RON file and resolve it against `spec`.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or names types the
/// rules do not define.
pub fn load_colony_file(spec: &Arc<Specification>, path: &Path) -> DataLoadResult<Colony> {
    let data = load_colony_data_file(path)?;
    let colony = Colony::from_data(Arc::clone(spec), &data).map_err(|e| {
        DataLoadError::ResolveError {
            path: path.display().to_string(),
            source: e,
        }
    })?;

    tracing::info!(
        "Loaded colony '{}' with {} units, {} buildings",
        colony.name(),
        colony.unit_count(),
        colony.buildings().len()
    );

    Ok(colony)
}

/// List the `.ron` files in a directory, sorted by path.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn ron_files(dir: &Path) -> DataLoadResult<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::warn!("Data directory does not exist: {}", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| DataLoadError::IoError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DataLoadError::IoError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every rule set in a directory.
///
/// # Errors
///
/// Returns an error if any file fails to load.
pub fn load_rules_from_directory(dir: &Path) -> DataLoadResult<Vec<Arc<Specification>>> {
    let specs = ron_files(dir)?
        .iter()
        .map(|path| load_rules_file(path))
        .collect::<DataLoadResult<Vec<_>>>()?;

    tracing::info!("Loaded {} rule sets from {}", specs.len(), dir.display());
    Ok(specs)
}
