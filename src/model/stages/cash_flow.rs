//! Indirect-method cash flow statement and unlevered free cash flow
//!
//! Signs follow cash impact: outflows are negative.

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Unit, Value};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let stage = inputs.stage();
    let mut out = inputs.output();

    let net_income = inputs.item(names::PL_NET_INCOME)?.to_vec();
    let da = inputs.item(names::PL_DA)?.to_vec();
    let ebit = inputs.item(names::PL_EBIT)?;
    let dividends_paid = inputs.item(names::PL_DIVIDENDS)?;
    let nwc = inputs.item(names::BS_NET_WORKING_CAPITAL)?;
    let debt = inputs.item(names::BS_DEBT)?;
    let cash = inputs.item(names::BS_CASH)?;
    let capex = inputs.assumption(names::CAPEX)?;
    let tax_rate = inputs.assumption(names::TAX_RATE)?;

    let change_in_nwc = series::map(&series::change(nwc), |c| -c);
    let operating = series::add(&series::add(&net_income, &da), &change_in_nwc);

    let capex_outflow = series::map(capex, |c| -c);
    let investing = capex_outflow.clone();

    let net_borrowing = series::change(debt);
    let dividends = series::map(dividends_paid, |d| -d);
    let financing = series::add(&net_borrowing, &dividends);

    let flows = [operating.as_slice(), investing.as_slice(), financing.as_slice()];
    let net_change = series::sum(&flows, periods.len());
    let ending_cash: Vec<Value> = (0..periods.len())
        .map(|i| Some(series::prior(cash, i)? + net_change[i]?))
        .collect();

    let unlevered_fcf: Vec<Value> = (0..periods.len())
        .map(|i| {
            let nopat = ebit[i]? * (1.0 - tax_rate[i]?);
            Some(nopat + da[i]? + capex_outflow[i]? + change_in_nwc[i]?)
        })
        .collect();

    let money = |name: &str, label: &str, values: Vec<Value>| {
        LineItem::new(stage, name, label, Unit::Money, values)
    };

    out.push_item(money(names::CF_NET_INCOME, "Net income", net_income));
    out.push_item(money(names::CF_DA, "D&A", da).with_note("Non-cash add-back"));
    out.push_item(
        money(names::CF_CHANGE_NWC, "Change in working capital", change_in_nwc)
            .with_note("Decrease in net working capital is a cash inflow"),
    );
    out.push_item(money(names::CF_OPERATING, "Cash from operations", operating));
    out.push_item(money(names::CF_CAPEX, "Capital expenditure", capex_outflow));
    out.push_item(money(names::CF_INVESTING, "Cash from investing", investing));
    out.push_item(
        money(names::CF_NET_DEBT, "Net borrowing", net_borrowing)
            .with_note("Change in closing debt"),
    );
    out.push_item(money(names::CF_DIVIDENDS, "Dividends paid", dividends));
    out.push_item(money(names::CF_FINANCING, "Cash from financing", financing));
    out.push_item(money(names::CF_NET_CHANGE, "Net change in cash", net_change));
    out.push_item(
        money(names::CF_ENDING_CASH, "Ending cash", ending_cash)
            .with_note("Prior balance sheet cash + net change"),
    );
    out.push_item(
        money(names::CF_UNLEVERED_FCF, "Unlevered free cash flow", unlevered_fcf)
            .with_note("EBIT x (1 - tax rate) + D&A - capex - increase in working capital"),
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::model::{ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    fn state_through_cf() -> ModelState {
        let config = ModelConfig::default();
        let mut state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        for stage in &Stage::ALL[..5] {
            let out = stage.compute(&state.inputs(*stage, &config)).unwrap();
            state.apply(out);
        }
        state
    }

    #[test]
    fn test_first_period_has_no_prior() {
        let state = state_through_cf();
        assert_eq!(state.line_item("cf.change_in_nwc").unwrap().value(0), None);
        assert_eq!(state.line_item("cf.ending_cash").unwrap().value(0), None);
        assert_eq!(state.line_item("cf.unlevered_fcf").unwrap().value(0), None);
    }

    #[test]
    fn test_forecast_ending_cash_matches_balance_sheet() {
        let state = state_through_cf();
        for idx in 3..8 {
            let from_cf = state.line_item("cf.ending_cash").unwrap().value(idx).unwrap();
            let from_bs = state.line_item("bs.cash").unwrap().value(idx).unwrap();
            assert_relative_eq!(from_cf, from_bs, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_capex_is_outflow() {
        let state = state_through_cf();
        assert_eq!(state.line_item("cf.capex").unwrap().value(3), Some(-60.0));
        assert_eq!(state.line_item("cf.net_borrowing").unwrap().value(3), Some(-20.0));
    }
}
