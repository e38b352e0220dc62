//! Cross-statement consistency checks
//!
//! A failed check is a finding about the assumptions, not an error: the run
//! still completes and the result carries the deviation.

use serde::{Deserialize, Serialize};

use super::line_item::Value;
use super::names;
use super::series;
use super::state::ModelState;

/// Default tolerance in money units (USD 1,000 on a USD-millions model)
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Declared checks, evaluated in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyCheck {
    /// Sum of segment EBIT equals consolidated EBIT, every period
    SegmentEbit,
    /// Total assets equal liabilities plus equity, every period
    BalanceSheet,
    /// Cash flow ending cash equals balance sheet cash, forecast periods
    CashReconciliation,
    /// Sensitivity grid centre equals the DCF value per share
    SensitivityCentre,
}

impl ConsistencyCheck {
    pub const ALL: [ConsistencyCheck; 4] = [
        ConsistencyCheck::SegmentEbit,
        ConsistencyCheck::BalanceSheet,
        ConsistencyCheck::CashReconciliation,
        ConsistencyCheck::SensitivityCentre,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConsistencyCheck::SegmentEbit => "segment_ebit_vs_consolidated",
            ConsistencyCheck::BalanceSheet => "balance_sheet_identity",
            ConsistencyCheck::CashReconciliation => "cash_reconciliation",
            ConsistencyCheck::SensitivityCentre => "sensitivity_centre",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConsistencyCheck::SegmentEbit => "Sum of segment EBIT - consolidated EBIT",
            ConsistencyCheck::BalanceSheet => "Total assets - (total liabilities + equity)",
            ConsistencyCheck::CashReconciliation => {
                "Cash flow ending cash - balance sheet cash (forecast)"
            }
            ConsistencyCheck::SensitivityCentre => "Sensitivity centre cell - DCF value per share",
        }
    }

    /// Signed deviations, one per evaluated point. Missing inputs make every
    /// point undefined.
    fn deviations(&self, state: &ModelState) -> Vec<Value> {
        let len = state.periods().len();
        let values = |name: &str| -> Vec<Value> {
            state
                .line_item(name)
                .map(|i| i.values.clone())
                .unwrap_or_else(|| vec![None; len])
        };

        match self {
            ConsistencyCheck::SegmentEbit => {
                let parts: Vec<Vec<Value>> = state
                    .assumptions()
                    .segments()
                    .iter()
                    .map(|s| values(&names::segment_item(&s.key, names::EBIT)))
                    .collect();
                let slices: Vec<&[Value]> = parts.iter().map(Vec::as_slice).collect();
                series::sub(&series::sum(&slices, len), &values(names::PL_EBIT))
            }
            ConsistencyCheck::BalanceSheet => series::sub(
                &values(names::BS_TOTAL_ASSETS),
                &values(names::BS_LIABILITIES_AND_EQUITY),
            ),
            ConsistencyCheck::CashReconciliation => {
                let periods = state.periods();
                let delta = series::sub(&values(names::CF_ENDING_CASH), &values(names::BS_CASH));
                series::mask(&delta, |i| periods.is_forecast(i))
            }
            ConsistencyCheck::SensitivityCentre => {
                let grid = state.sensitivity();
                let primary = state.scalar(names::DCF_VALUE_PER_SHARE);
                let delta = match grid.zip(primary) {
                    // Both sides n/m (WACC <= g) is agreement
                    Some((grid, primary)) => match (grid.centre_value(), primary.value) {
                        (Some(c), Some(p)) => Some(c - p),
                        (None, None) => Some(0.0),
                        _ => None,
                    },
                    None => None,
                };
                vec![delta]
            }
        }
    }

    /// Evaluate against the state. Never fails.
    pub fn evaluate(&self, state: &ModelState, tolerance: f64) -> CheckResult {
        let deviations = self.deviations(state);
        CheckResult::from_deviations(self.name(), self.description(), deviations, tolerance)
    }
}

/// Outcome of one consistency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub description: String,
    /// True when at least one point was evaluated and every deviation is
    /// within tolerance
    pub passed: bool,
    /// Largest deviation by magnitude, with its sign
    pub delta: f64,
    pub tolerance: f64,
    /// Number of points where both sides were defined
    pub evaluated: usize,
    /// Deviation per point (per period for statement checks)
    pub deviations: Vec<Value>,
}

impl CheckResult {
    fn from_deviations(
        name: &str,
        description: &str,
        deviations: Vec<Value>,
        tolerance: f64,
    ) -> Self {
        let defined: Vec<f64> = deviations.iter().flatten().copied().collect();
        let delta = defined
            .iter()
            .copied()
            .fold(0.0_f64, |worst, d| if d.abs() > worst.abs() { d } else { worst });
        let passed = !defined.is_empty() && defined.iter().all(|d| d.abs() <= tolerance);

        Self {
            name: name.to_string(),
            description: description.to_string(),
            passed,
            delta,
            tolerance,
            evaluated: defined.len(),
            deviations,
        }
    }
}

/// Evaluate every declared check
pub fn run_consistency_checks(state: &ModelState, tolerance: f64) -> Vec<CheckResult> {
    ConsistencyCheck::ALL
        .iter()
        .map(|check| check.evaluate(state, tolerance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AssumptionTable;
    use crate::scenario::Scenario;

    #[test]
    fn test_worst_deviation_keeps_sign() {
        let deviations = vec![Some(0.5), None, Some(-2.0), Some(1.0)];
        let result = CheckResult::from_deviations("x", "", deviations, 0.1);
        assert_eq!(result.delta, -2.0);
        assert_eq!(result.evaluated, 3);
        assert!(!result.passed);
    }

    #[test]
    fn test_within_tolerance_passes() {
        let deviations = vec![Some(1e-9), Some(-1e-9)];
        let result = CheckResult::from_deviations("x", "", deviations, DEFAULT_TOLERANCE);
        assert!(result.passed);
    }

    #[test]
    fn test_nothing_evaluated_does_not_pass() {
        let result = CheckResult::from_deviations("x", "", vec![None, None], DEFAULT_TOLERANCE);
        assert!(!result.passed);
        assert_eq!(result.delta, 0.0);
    }

    #[test]
    fn test_checks_on_empty_state_report_instead_of_failing() {
        let state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        let results = run_consistency_checks(&state, DEFAULT_TOLERANCE);

        assert_eq!(results.len(), ConsistencyCheck::ALL.len());
        assert!(results.iter().all(|r| !r.passed && r.evaluated == 0));
    }
}
