//! Accumulated state of a model run
//!
//! Stages read from the state through `StageInputs`, which turns an absent
//! name into a `MissingDependency` error tagged with the reading stage.

use std::collections::BTreeMap;

use super::engine::ModelConfig;
use super::line_item::{LineItem, Scalar, Value};
use super::stage::{Stage, StageOutput};
use super::stages::SensitivityGrid;
use crate::assumptions::{PeriodRange, ResolvedAssumptions, Segment};
use crate::error::{ModelError, ModelResult};

/// Resolved assumptions plus everything computed so far
#[derive(Debug, Clone)]
pub struct ModelState {
    assumptions: ResolvedAssumptions,
    line_items: Vec<LineItem>,
    item_index: BTreeMap<String, usize>,
    scalars: Vec<Scalar>,
    scalar_index: BTreeMap<String, usize>,
    sensitivity: Option<SensitivityGrid>,
    completed: Vec<Stage>,
}

impl ModelState {
    pub fn new(assumptions: ResolvedAssumptions) -> Self {
        Self {
            assumptions,
            line_items: Vec::new(),
            item_index: BTreeMap::new(),
            scalars: Vec::new(),
            scalar_index: BTreeMap::new(),
            sensitivity: None,
            completed: Vec::new(),
        }
    }

    /// Merge a stage's output into the state
    pub fn apply(&mut self, output: StageOutput) {
        for item in output.line_items {
            debug_assert!(
                !self.item_index.contains_key(&item.name),
                "duplicate line item {}",
                item.name
            );
            self.item_index.insert(item.name.clone(), self.line_items.len());
            self.line_items.push(item);
        }
        for scalar in output.scalars {
            debug_assert!(
                !self.scalar_index.contains_key(&scalar.name),
                "duplicate scalar {}",
                scalar.name
            );
            self.scalar_index.insert(scalar.name.clone(), self.scalars.len());
            self.scalars.push(scalar);
        }
        if output.sensitivity.is_some() {
            self.sensitivity = output.sensitivity;
        }
        self.completed.push(output.stage);
    }

    /// Read access for one stage
    pub fn inputs<'a>(&'a self, stage: Stage, config: &'a ModelConfig) -> StageInputs<'a> {
        StageInputs {
            stage,
            state: self,
            config,
        }
    }

    pub fn assumptions(&self) -> &ResolvedAssumptions {
        &self.assumptions
    }

    pub fn periods(&self) -> &PeriodRange {
        &self.assumptions.periods
    }

    pub fn line_item(&self, name: &str) -> Option<&LineItem> {
        self.item_index.get(name).map(|&i| &self.line_items[i])
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.scalar_index.get(name).map(|&i| &self.scalars[i])
    }

    pub fn scalars(&self) -> &[Scalar] {
        &self.scalars
    }

    pub fn sensitivity(&self) -> Option<&SensitivityGrid> {
        self.sensitivity.as_ref()
    }

    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed
    }

    pub(crate) fn into_parts(
        self,
    ) -> (ResolvedAssumptions, Vec<LineItem>, Vec<Scalar>, Option<SensitivityGrid>) {
        (self.assumptions, self.line_items, self.scalars, self.sensitivity)
    }
}

/// A stage's read-only view of the state
#[derive(Debug, Clone, Copy)]
pub struct StageInputs<'a> {
    stage: Stage,
    state: &'a ModelState,
    config: &'a ModelConfig,
}

impl<'a> StageInputs<'a> {
    fn missing(&self, name: &str) -> ModelError {
        ModelError::MissingDependency {
            stage: self.stage,
            name: name.to_string(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &'a ModelConfig {
        self.config
    }

    pub fn periods(&self) -> &'a PeriodRange {
        self.state.periods()
    }

    pub fn segments(&self) -> &'a [Segment] {
        self.state.assumptions.segments()
    }

    /// Empty output tagged with this stage
    pub fn output(&self) -> StageOutput {
        StageOutput::new(self.stage)
    }

    /// Resolved assumption series
    pub fn assumption(&self, name: &str) -> ModelResult<&'a [Value]> {
        self.state
            .assumptions
            .values(name)
            .ok_or_else(|| self.missing(name))
    }

    /// Upstream line item series
    pub fn item(&self, name: &str) -> ModelResult<&'a [Value]> {
        self.state
            .line_item(name)
            .map(|i| i.values.as_slice())
            .ok_or_else(|| self.missing(name))
    }

    /// Upstream scalar value
    pub fn scalar(&self, name: &str) -> ModelResult<Value> {
        self.state
            .scalar(name)
            .map(|s| s.value)
            .ok_or_else(|| self.missing(name))
    }
}
