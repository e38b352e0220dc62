//! Discounted cash flow valuation
//!
//! `DcfInputs::value` is the single valuation function. The primary run and
//! every sensitivity cell call it, so a cell evaluated at the run's own
//! (WACC, terminal growth) reproduces the primary result bit for bit.

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Scalar, Unit, Value};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

/// Immutable inputs shared by every evaluation of the valuation
#[derive(Debug, Clone, PartialEq)]
pub struct DcfInputs {
    /// Unlevered FCF for each forecast year, in order
    pub fcf: Vec<Value>,
    /// Debt less cash at the valuation date (last reported year)
    pub net_debt: Value,
    pub shares: Value,
    /// Discount cash flows from mid-year instead of year end
    pub mid_year: bool,
}

/// Outputs of one valuation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DcfValuation {
    pub sum_pv_fcf: Value,
    pub terminal_value: Value,
    pub pv_terminal_value: Value,
    pub enterprise_value: Value,
    pub equity_value: Value,
    pub value_per_share: Value,
}

impl DcfInputs {
    /// Collect valuation inputs from the accumulated state
    pub fn gather(inputs: &StageInputs<'_>) -> ModelResult<Self> {
        let periods = inputs.periods();
        let fcf = inputs.item(names::CF_UNLEVERED_FCF)?;
        let cash = inputs.item(names::BS_CASH)?;
        let debt = inputs.item(names::BS_DEBT)?;
        let shares = inputs.assumption(names::SHARES_OUTSTANDING)?;

        let net_debt = periods
            .last_historical_index()
            .and_then(|i| Some(debt[i]? - cash[i]?));
        let shares = periods.first_forecast_index().and_then(|i| shares[i]);

        Ok(Self {
            fcf: periods.forecast_indices().map(|i| fcf[i]).collect(),
            net_debt,
            shares,
            mid_year: inputs.config().mid_year_convention,
        })
    }

    /// Discount factor for forecast year `n` (1-based)
    pub fn discount_factor(&self, wacc: f64, n: usize) -> Value {
        let exponent = if self.mid_year { n as f64 - 0.5 } else { n as f64 };
        let base = 1.0 + wacc;
        if base <= 0.0 {
            return None;
        }
        Some(1.0 / base.powf(exponent))
    }

    /// Value the forecast at the given discount rate and terminal growth.
    /// Terminal value uses the Gordon growth model on the final year's FCF and
    /// is undefined when `wacc <= terminal_growth`.
    pub fn value(&self, wacc: f64, terminal_growth: f64) -> DcfValuation {
        let Some(&last_fcf) = self.fcf.last() else {
            return DcfValuation::default();
        };
        let n = self.fcf.len();

        let sum_pv_fcf = self
            .fcf
            .iter()
            .enumerate()
            .try_fold(0.0, |acc, (k, fcf)| {
                Some(acc + (*fcf)? * self.discount_factor(wacc, k + 1)?)
            });

        let terminal_value = if wacc > terminal_growth {
            last_fcf.map(|f| f * (1.0 + terminal_growth) / (wacc - terminal_growth))
        } else {
            None
        };
        // Terminal value sits at the end of the final year regardless of convention
        let terminal_discount = (1.0 + wacc > 0.0).then(|| 1.0 / (1.0 + wacc).powi(n as i32));
        let pv_terminal_value = terminal_value.zip(terminal_discount).map(|(tv, df)| tv * df);

        let enterprise_value = sum_pv_fcf.zip(pv_terminal_value).map(|(a, b)| a + b);
        let equity_value = enterprise_value.zip(self.net_debt).map(|(ev, nd)| ev - nd);
        let value_per_share = series::safe_div(equity_value, self.shares);

        DcfValuation {
            sum_pv_fcf,
            terminal_value,
            pv_terminal_value,
            enterprise_value,
            equity_value,
            value_per_share,
        }
    }
}

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let stage = inputs.stage();
    let mut out = inputs.output();

    let dcf = DcfInputs::gather(inputs)?;
    let wacc_series = inputs.assumption(names::WACC)?;
    let growth_series = inputs.assumption(names::TERMINAL_GROWTH)?;
    // Valuation rates are read at the first forecast year
    let first = periods.first_forecast_index();
    let wacc = first.and_then(|i| wacc_series[i]);
    let growth = first.and_then(|i| growth_series[i]);

    let offset = periods.historical_count();
    let fcf = series::mask(inputs.item(names::CF_UNLEVERED_FCF)?, |i| periods.is_forecast(i));
    let discount: Vec<Value> = (0..periods.len())
        .map(|i| {
            if periods.is_forecast(i) {
                dcf.discount_factor(wacc?, i - offset + 1)
            } else {
                None
            }
        })
        .collect();
    let pv = series::mul(&fcf, &discount);

    let discount_note = if dcf.mid_year {
        "1 / (1 + WACC)^(n - 0.5), mid-year convention"
    } else {
        "1 / (1 + WACC)^n, year-end convention"
    };
    let fcf_label = "Unlevered free cash flow";
    out.push_item(LineItem::new(stage, names::DCF_FCF, fcf_label, Unit::Money, fcf));
    out.push_item(
        LineItem::new(stage, names::DCF_DISCOUNT_FACTOR, "Discount factor", Unit::Factor, discount)
            .with_note(discount_note),
    );
    out.push_item(LineItem::new(stage, names::DCF_PV_FCF, "PV of free cash flow", Unit::Money, pv));

    let valuation = match (wacc, growth) {
        (Some(w), Some(g)) => dcf.value(w, g),
        _ => DcfValuation::default(),
    };

    let v = &valuation;
    let scalars: [(&str, &str, Unit, Value, &str); 10] = [
        (names::DCF_WACC, "WACC", Unit::Percent, wacc, ""),
        (names::DCF_TERMINAL_GROWTH, "Terminal growth", Unit::Percent, growth, ""),
        (names::DCF_SUM_PV_FCF, "Sum of PV of FCF", Unit::Money, v.sum_pv_fcf, ""),
        (
            names::DCF_TERMINAL_VALUE,
            "Terminal value",
            Unit::Money,
            v.terminal_value,
            "Final FCF x (1 + g) / (WACC - g)",
        ),
        (
            names::DCF_PV_TERMINAL_VALUE,
            "PV of terminal value",
            Unit::Money,
            v.pv_terminal_value,
            "",
        ),
        (names::DCF_ENTERPRISE_VALUE, "Enterprise value", Unit::Money, v.enterprise_value, ""),
        (
            names::DCF_NET_DEBT,
            "Net debt",
            Unit::Money,
            dcf.net_debt,
            "Debt less cash at valuation date",
        ),
        (names::DCF_EQUITY_VALUE, "Equity value", Unit::Money, v.equity_value, ""),
        (names::DCF_SHARES, "Shares outstanding", Unit::Count, dcf.shares, ""),
        (names::DCF_VALUE_PER_SHARE, "Value per share", Unit::PerShare, v.value_per_share, ""),
    ];
    for (name, label, unit, value, note) in scalars {
        out.push_scalar(Scalar::new(stage, name, label, unit, value).with_note(note));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_inputs() -> DcfInputs {
        DcfInputs {
            fcf: vec![Some(100.0); 3],
            net_debt: Some(50.0),
            shares: Some(10.0),
            mid_year: false,
        }
    }

    #[test]
    fn test_flat_cash_flows() {
        let v = flat_inputs().value(0.10, 0.0);

        let annuity = 100.0 / 1.1 + 100.0 / 1.21 + 100.0 / 1.331;
        assert_relative_eq!(v.sum_pv_fcf.unwrap(), annuity, epsilon = 1e-9);
        assert_relative_eq!(v.terminal_value.unwrap(), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(v.pv_terminal_value.unwrap(), 1000.0 / 1.331, epsilon = 1e-9);
        // Flat perpetuity at 10% is worth 1000 in total
        assert_relative_eq!(v.enterprise_value.unwrap(), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(v.value_per_share.unwrap(), 95.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_at_or_above_wacc_is_not_meaningful() {
        let v = flat_inputs().value(0.05, 0.05);
        assert_eq!(v.terminal_value, None);
        assert_eq!(v.enterprise_value, None);
        assert_eq!(v.value_per_share, None);
        assert!(v.sum_pv_fcf.is_some());
    }

    #[test]
    fn test_zero_shares_is_not_meaningful() {
        let mut inputs = flat_inputs();
        inputs.shares = Some(0.0);
        let v = inputs.value(0.10, 0.02);
        assert!(v.equity_value.is_some());
        assert_eq!(v.value_per_share, None);
    }

    #[test]
    fn test_mid_year_raises_value() {
        let mut inputs = flat_inputs();
        let year_end = inputs.value(0.10, 0.02).sum_pv_fcf.unwrap();
        inputs.mid_year = true;
        let mid_year = inputs.value(0.10, 0.02).sum_pv_fcf.unwrap();
        assert!(mid_year > year_end);
        let first = inputs.discount_factor(0.10, 1).unwrap();
        assert_relative_eq!(first, 1.0 / 1.1_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_forecast() {
        let inputs = DcfInputs {
            fcf: vec![],
            net_debt: Some(0.0),
            shares: Some(1.0),
            mid_year: false,
        };
        assert_eq!(inputs.value(0.1, 0.02), DcfValuation::default());
    }
}
