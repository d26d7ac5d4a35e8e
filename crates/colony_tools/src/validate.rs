//! Data validation utilities.

use std::path::Path;
use std::sync::Arc;

use colony_core::colony::Colony;

use crate::data_loader::{
    load_colony_data_file, load_rules_from_directory, ron_files, DataLoadError, DataLoadResult,
};

/// What a successful validation covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Rule sets loaded.
    pub rules: usize,
    /// Colonies resolved against every rule set.
    pub colonies: usize,
}

/// Validate all RON data files in a directory.
///
/// Expects rule sets under `rules/` and colonies under `colonies/`. Every
/// colony must resolve against every rule set.
///
/// # Errors
///
/// Returns the first error found.
pub fn validate_data_directory(path: &Path) -> DataLoadResult<ValidationSummary> {
    let specs = load_rules_from_directory(&path.join("rules"))?;
    let colony_files = ron_files(&path.join("colonies"))?;

    for file in &colony_files {
        let data = load_colony_data_file(file)?;
        for spec in &specs {
            Colony::from_data(Arc::clone(spec), &data).map_err(|e| {
                DataLoadError::ResolveError {
                    path: file.display().to_string(),
                    source: e,
                }
            })?;
            tracing::debug!(colony = %data.name, rules = spec.id(), "Colony resolves");
        }
    }

    Ok(ValidationSummary {
        rules: specs.len(),
        colonies: colony_files.len(),
    })
}
