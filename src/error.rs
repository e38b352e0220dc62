//! Error types for model construction and evaluation
//!
//! Only structural failures live here. Accounting mismatches found by the
//! consistency checks are reported as `CheckResult`s, not errors.

use thiserror::Error;

use crate::model::Stage;

/// Errors that abort a model run
#[derive(Debug, Error)]
pub enum ModelError {
    /// Scenario selector is not one of Base, Bull, Bear
    #[error("Unknown scenario: {0:?} (expected base, bull or bear)")]
    UnknownScenario(String),

    /// A stage referenced a name that no earlier stage produced.
    /// Indicates a pipeline ordering bug.
    #[error("Stage {stage} references missing dependency: {name}")]
    MissingDependency { stage: Stage, name: String },

    /// Assumption table failed validation
    #[error("Invalid assumption table: {0}")]
    InvalidAssumptionTable(String),

    /// Assumption files could not be read or parsed
    #[error("Failed to load assumptions from {path}: {reason}")]
    AssumptionLoad { path: String, reason: String },

    /// Output could not be produced by a renderer
    #[error("Render error: {0}")]
    Render(String),
}

/// Standard result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
