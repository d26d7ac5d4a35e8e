//! Error types for the colony production engine.
//!
//! Errors only arise while resolving rules data into a [`Specification`]
//! or while parsing data files. Production resolution itself never fails:
//! an unsatisfiable requirement yields an empty production record instead.
//!
//! [`Specification`]: crate::specification::Specification

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A goods type id referenced by rules or colony data does not exist.
    #[error("Unknown goods type: {0}")]
    UnknownGoodsType(String),

    /// A building type id referenced by rules or colony data does not exist.
    #[error("Unknown building type: {0}")]
    UnknownBuildingType(String),

    /// A unit type id referenced by rules or colony data does not exist.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// Two definitions share the same id.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Kind of definition ("goods", "building", "unit").
        kind: &'static str,
        /// The duplicated id.
        id: String,
    },

    /// Rules data failed validation.
    #[error("Invalid rules '{rules}': {errors:?}")]
    InvalidRules {
        /// Identifier of the rule set.
        rules: String,
        /// Every validation message collected.
        errors: Vec<String>,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid colony state.
    #[error("Invalid colony state: {0}")]
    InvalidState(String),
}
