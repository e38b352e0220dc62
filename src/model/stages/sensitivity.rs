//! WACC x terminal growth sensitivity of value per share
//!
//! Each cell is an isolated call of `DcfInputs::value` on shared immutable
//! inputs. Rows are evaluated in parallel; collection preserves order.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::dcf::DcfInputs;
use crate::error::ModelResult;
use crate::model::line_item::Value;
use crate::model::names;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

/// Shape of the sensitivity grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Spacing of the WACC axis
    pub wacc_step: f64,
    /// Spacing of the terminal growth axis
    pub growth_step: f64,
    /// Points on each side of the run's own value
    pub steps: usize,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            wacc_step: 0.005,   // 50bp
            growth_step: 0.005, // 50bp
            steps: 2,           // 5 x 5 grid
        }
    }
}

impl SensitivityConfig {
    /// Axis centred on `centre`. The centre point is `centre` itself, not
    /// `centre + 0 * step`, so it matches the primary run exactly.
    pub fn axis(&self, centre: f64, step: f64) -> Vec<f64> {
        (0..=2 * self.steps)
            .map(|i| {
                if i == self.steps {
                    centre
                } else {
                    centre + (i as f64 - self.steps as f64) * step
                }
            })
            .collect()
    }
}

/// Value per share over a WACC (rows) x terminal growth (columns) grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub wacc: Vec<f64>,
    pub terminal_growth: Vec<f64>,
    /// `values[w][g]` for `wacc[w]`, `terminal_growth[g]`
    pub values: Vec<Vec<Value>>,
    centre: (usize, usize),
}

impl SensitivityGrid {
    pub fn value(&self, wacc_idx: usize, growth_idx: usize) -> Value {
        self.values.get(wacc_idx)?.get(growth_idx).copied().flatten()
    }

    /// Indices of the run's own (WACC, terminal growth) pair
    pub fn centre(&self) -> (usize, usize) {
        self.centre
    }

    pub fn centre_value(&self) -> Value {
        self.value(self.centre.0, self.centre.1)
    }

    /// Exact lookup by axis values
    pub fn find(&self, wacc: f64, terminal_growth: f64) -> Value {
        let w = self.wacc.iter().position(|&x| x == wacc)?;
        let g = self.terminal_growth.iter().position(|&x| x == terminal_growth)?;
        self.value(w, g)
    }
}

/// Evaluate every cell of the grid around (`wacc`, `growth`)
pub fn sweep(
    dcf: &DcfInputs,
    config: &SensitivityConfig,
    wacc: f64,
    growth: f64,
    parallel: bool,
) -> SensitivityGrid {
    let wacc_axis = config.axis(wacc, config.wacc_step);
    let growth_axis = config.axis(growth, config.growth_step);

    let row = |&w: &f64| -> Vec<Value> {
        growth_axis
            .iter()
            .map(|&g| dcf.value(w, g).value_per_share)
            .collect()
    };
    let values: Vec<Vec<Value>> = if parallel {
        wacc_axis.par_iter().map(row).collect()
    } else {
        wacc_axis.iter().map(row).collect()
    };

    SensitivityGrid {
        wacc: wacc_axis,
        terminal_growth: growth_axis,
        values,
        centre: (config.steps, config.steps),
    }
}

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let mut out = inputs.output();
    let wacc = inputs.scalar(names::DCF_WACC)?;
    let growth = inputs.scalar(names::DCF_TERMINAL_GROWTH)?;
    let dcf = DcfInputs::gather(inputs)?;

    match (wacc, growth) {
        (Some(w), Some(g)) => {
            let config = inputs.config();
            let grid = sweep(&dcf, &config.sensitivity, w, g, config.parallel_sensitivity);
            out.sensitivity = Some(grid);
        }
        _ => warn!("Sensitivity grid skipped: WACC or terminal growth is not defined"),
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> DcfInputs {
        DcfInputs {
            fcf: vec![Some(80.0), Some(90.0), Some(100.0)],
            net_debt: Some(100.0),
            shares: Some(10.0),
            mid_year: false,
        }
    }

    #[test]
    fn test_axis_centre_is_exact() {
        let config = SensitivityConfig::default();
        let axis = config.axis(0.09, 0.005);
        assert_eq!(axis.len(), 5);
        assert_eq!(axis[2], 0.09);
        assert!(axis[0] < axis[1] && axis[3] < axis[4]);
    }

    #[test]
    fn test_centre_matches_single_valuation() {
        let dcf = inputs();
        let grid = sweep(&dcf, &SensitivityConfig::default(), 0.09, 0.03, true);
        let direct = dcf.value(0.09, 0.03).value_per_share;

        assert_eq!(grid.centre_value(), direct);
        assert_eq!(grid.find(0.09, 0.03), direct);
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let dcf = inputs();
        let config = SensitivityConfig::default();
        assert_eq!(sweep(&dcf, &config, 0.09, 0.03, true), sweep(&dcf, &config, 0.09, 0.03, false));
    }

    #[test]
    fn test_monotonic_in_wacc_and_growth() {
        let grid = sweep(&inputs(), &SensitivityConfig::default(), 0.09, 0.03, false);
        // Higher WACC lowers value; higher growth raises it
        assert!(grid.value(0, 2).unwrap() > grid.value(4, 2).unwrap());
        assert!(grid.value(2, 4).unwrap() > grid.value(2, 0).unwrap());
    }

    #[test]
    fn test_cells_with_growth_above_wacc_are_not_meaningful() {
        let config = SensitivityConfig {
            wacc_step: 0.01,
            growth_step: 0.01,
            steps: 2,
        };
        let grid = sweep(&inputs(), &config, 0.05, 0.04, false);
        // wacc 0.03 vs growth 0.06
        assert_eq!(grid.value(0, 4), None);
        assert!(grid.centre_value().is_some());
    }
}
