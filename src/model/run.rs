//! Completed model run

use serde::{Deserialize, Serialize};

use super::checks::CheckResult;
use super::line_item::{LineItem, Scalar, Value};
use super::names;
use super::stage::Stage;
use super::stages::SensitivityGrid;
use super::state::ModelState;
use crate::assumptions::{PeriodRange, ResolvedAssumption, Segment};
use crate::scenario::Scenario;

/// Frozen output of `ModelEngine::run_model`. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    scenario: Scenario,
    unit_label: String,
    periods: PeriodRange,
    segments: Vec<Segment>,
    assumptions: Vec<ResolvedAssumption>,
    /// In pipeline order
    line_items: Vec<LineItem>,
    scalars: Vec<Scalar>,
    sensitivity: Option<SensitivityGrid>,
    checks: Vec<CheckResult>,
}

/// Headline figures of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: Scenario,
    pub enterprise_value: Value,
    pub equity_value: Value,
    pub value_per_share: Value,
    pub wacc: Value,
    pub terminal_growth: Value,
    /// Final forecast year revenue
    pub exit_revenue: Value,
    /// Final forecast year EBIT margin
    pub exit_ebit_margin: Value,
    pub checks_passed: usize,
    pub checks_total: usize,
}

impl ModelRun {
    pub(crate) fn from_state(state: ModelState, checks: Vec<CheckResult>) -> Self {
        let (assumptions, line_items, scalars, sensitivity) = state.into_parts();
        Self {
            scenario: assumptions.scenario,
            unit_label: assumptions.unit_label.clone(),
            periods: assumptions.periods.clone(),
            segments: assumptions.segments.clone(),
            assumptions: assumptions.iter().cloned().collect(),
            line_items,
            scalars,
            sensitivity,
            checks,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Denomination of money figures
    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    pub fn periods(&self) -> &PeriodRange {
        &self.periods
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn assumptions(&self) -> &[ResolvedAssumption] {
        &self.assumptions
    }

    pub fn assumption(&self, name: &str) -> Option<&ResolvedAssumption> {
        self.assumptions.iter().find(|a| a.name == name)
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn line_item(&self, name: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|i| i.name == name)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.line_item(name).map(|i| i.values.as_slice())
    }

    /// Line items produced by one stage, in emission order
    pub fn items_for_stage(&self, stage: Stage) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(move |i| i.stage == stage)
    }

    pub fn scalars(&self) -> &[Scalar] {
        &self.scalars
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.scalars.iter().find(|s| s.name == name)
    }

    pub fn scalars_for_stage(&self, stage: Stage) -> impl Iterator<Item = &Scalar> {
        self.scalars.iter().filter(move |s| s.stage == stage)
    }

    pub fn sensitivity(&self) -> Option<&SensitivityGrid> {
        self.sensitivity.as_ref()
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Value of a scalar output, n/m when absent
    pub fn scalar_value(&self, name: &str) -> Value {
        self.scalar(name).and_then(|s| s.value)
    }

    /// Final forecast year value of a line item, n/m when absent
    pub fn exit_value(&self, name: &str) -> Value {
        self.values(name).and_then(|v| v.last().copied().flatten())
    }

    pub fn value_per_share(&self) -> Value {
        self.scalar_value(names::DCF_VALUE_PER_SHARE)
    }

    pub fn enterprise_value(&self) -> Value {
        self.scalar_value(names::DCF_ENTERPRISE_VALUE)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            scenario: self.scenario,
            enterprise_value: self.enterprise_value(),
            equity_value: self.scalar_value(names::DCF_EQUITY_VALUE),
            value_per_share: self.value_per_share(),
            wacc: self.scalar_value(names::DCF_WACC),
            terminal_growth: self.scalar_value(names::DCF_TERMINAL_GROWTH),
            exit_revenue: self.exit_value(names::PL_REVENUE),
            exit_ebit_margin: self.exit_value(names::RATIO_EBIT_MARGIN),
            checks_passed: self.checks.iter().filter(|c| c.passed).count(),
            checks_total: self.checks.len(),
        }
    }
}
