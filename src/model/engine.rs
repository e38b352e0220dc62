//! Model engine: resolves a scenario, runs the stages in order and freezes the result

use log::{debug, info, warn};

use super::checks::{self, CheckResult, DEFAULT_TOLERANCE};
use super::line_item::Unit;
use super::run::ModelRun;
use super::stage::{Stage, StageOutput};
use super::stages::SensitivityConfig;
use super::state::ModelState;
use crate::assumptions::{AssumptionTable, ResolvedAssumptions};
use crate::error::ModelResult;
use crate::scenario::Scenario;

/// Configuration for a model run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Largest deviation a consistency check accepts, in money units
    pub tolerance: f64,

    /// Discount FCF from mid-year instead of year end
    pub mid_year_convention: bool,

    /// Shape of the WACC x terminal growth grid
    pub sensitivity: SensitivityConfig,

    /// Evaluate sensitivity rows on the rayon pool
    pub parallel_sensitivity: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            mid_year_convention: false,
            sensitivity: SensitivityConfig::default(),
            parallel_sensitivity: true,
        }
    }
}

/// Main model engine
#[derive(Debug, Clone)]
pub struct ModelEngine {
    table: AssumptionTable,
    config: ModelConfig,
}

impl ModelEngine {
    pub fn new(table: AssumptionTable, config: ModelConfig) -> Self {
        Self { table, config }
    }

    /// Create an engine after checking the table carries every driver the
    /// stages read
    pub fn try_new(table: AssumptionTable, config: ModelConfig) -> ModelResult<Self> {
        table.validate()?;
        Ok(Self::new(table, config))
    }

    pub fn table(&self) -> &AssumptionTable {
        &self.table
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Resolve the table for one scenario
    pub fn resolve_assumptions(&self, scenario: Scenario) -> ResolvedAssumptions {
        self.table.resolve(scenario)
    }

    /// Resolve from a textual selector; anything other than base/bull/bear
    /// fails with `UnknownScenario`
    pub fn resolve_named(&self, scenario: &str) -> ModelResult<ResolvedAssumptions> {
        Ok(self.resolve_assumptions(scenario.parse()?))
    }

    /// Evaluate one stage against the accumulated state. The state is not
    /// modified; apply the output to advance it.
    pub fn compute_stage(&self, stage: Stage, state: &ModelState) -> ModelResult<StageOutput> {
        stage.compute(&state.inputs(stage, &self.config))
    }

    /// Evaluate every consistency check. Never fails.
    pub fn run_consistency_checks(&self, state: &ModelState) -> Vec<CheckResult> {
        checks::run_consistency_checks(state, self.config.tolerance)
    }

    /// Run the full pipeline for one scenario
    pub fn run_model(&self, scenario: Scenario) -> ModelResult<ModelRun> {
        info!(
            "Running {} scenario ({} forecast years)",
            scenario,
            self.table.periods.forecast_count()
        );

        let mut state = ModelState::new(self.resolve_assumptions(scenario));
        for stage in Stage::ALL {
            let output = self.compute_stage(stage, &state)?;
            debug!(
                "{}: {} line items, {} scalars",
                stage,
                output.line_items.len(),
                output.scalars.len()
            );
            state.apply(output);
        }

        let checks = self.run_consistency_checks(&state);
        for check in checks.iter().filter(|c| !c.passed) {
            warn!(
                "{} scenario: check {} failed (delta {:.6}, tolerance {}, {} points evaluated)",
                scenario, check.name, check.delta, check.tolerance, check.evaluated
            );
        }

        let run = ModelRun::from_state(state, checks);
        info!(
            "{} scenario complete: value per share {}",
            scenario,
            Unit::PerShare.format(run.value_per_share())
        );
        Ok(run)
    }

    /// Run from a textual scenario selector
    pub fn run_model_named(&self, scenario: &str) -> ModelResult<ModelRun> {
        self.run_model(scenario.parse()?)
    }
}

impl Default for ModelEngine {
    fn default() -> Self {
        Self::new(AssumptionTable::default_table(), ModelConfig::default())
    }
}
