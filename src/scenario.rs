//! Scenario selection and batch runs across scenarios
//!
//! A `Scenario` picks which override set of the assumption table is active.
//! It is always passed explicitly; there is no ambient selection.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionTable;
use crate::error::{ModelError, ModelResult};
use crate::model::{ModelConfig, ModelEngine, ModelRun};

/// Assumption override set selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Base,
    Bull,
    Bear,
}

impl Scenario {
    /// All scenarios in display order
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Bull, Scenario::Bear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Base => "Base",
            Scenario::Bull => "Bull",
            Scenario::Bear => "Bear",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Scenario::Base),
            "bull" => Ok(Scenario::Bull),
            "bear" => Ok(Scenario::Bear),
            _ => Err(ModelError::UnknownScenario(s.to_string())),
        }
    }
}

/// Runs the model for one or all scenarios against a shared assumption table
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// for run in runner.run_all()? {
///     println!("{}: {:?}", run.scenario(), run.value_per_share());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: ModelEngine,
}

impl ScenarioRunner {
    /// Create runner with the built-in assumption table
    pub fn new() -> Self {
        Self {
            engine: ModelEngine::new(AssumptionTable::default_table(), ModelConfig::default()),
        }
    }

    /// Create runner by loading assumptions from a CSV directory
    pub fn from_csv_path(path: &std::path::Path, config: ModelConfig) -> ModelResult<Self> {
        let table = AssumptionTable::from_csv_path(path)?;
        Ok(Self {
            engine: ModelEngine::new(table, config),
        })
    }

    /// Create runner with a pre-built engine
    pub fn with_engine(engine: ModelEngine) -> Self {
        Self { engine }
    }

    /// Run a single scenario
    pub fn run(&self, scenario: Scenario) -> ModelResult<ModelRun> {
        self.engine.run_model(scenario)
    }

    /// Run every scenario. Runs are independent and evaluated in parallel;
    /// results come back in `Scenario::ALL` order.
    pub fn run_all(&self) -> ModelResult<Vec<ModelRun>> {
        Scenario::ALL
            .par_iter()
            .map(|&scenario| self.engine.run_model(scenario))
            .collect()
    }

    pub fn engine(&self) -> &ModelEngine {
        &self.engine
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
