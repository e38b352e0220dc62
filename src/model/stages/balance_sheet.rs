//! Balance sheet: reported balances for actuals, driver-based roll-forward
//! for the forecast
//!
//! Forecast cash is rolled with the same flows the cash flow statement later
//! reports, so the balance identity holds whenever the opening balance sheet
//! balances.

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Unit, Value};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

const DAYS_PER_YEAR: f64 = 365.0;

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let stage = inputs.stage();
    let mut out = inputs.output();

    let revenue = inputs.item(names::PL_REVENUE)?;
    let cogs = inputs.item(names::PL_COGS)?;
    let da = inputs.item(names::PL_DA)?;
    let net_income = inputs.item(names::PL_NET_INCOME)?;
    let dividends = inputs.item(names::PL_DIVIDENDS)?;
    let debt = inputs.item(names::SCHEDULE_DEBT_CLOSING)?.to_vec();

    let dso = inputs.assumption(names::DSO)?;
    let dio = inputs.assumption(names::DIO)?;
    let dpo = inputs.assumption(names::DPO)?;
    let capex = inputs.assumption(names::CAPEX)?;

    let reported_receivables = inputs.assumption(names::ACCOUNTS_RECEIVABLE)?;
    let receivables = series::reported_then(periods, reported_receivables, |i| {
        Some(revenue[i]? * dso[i]? / DAYS_PER_YEAR)
    });
    let inventory = series::reported_then(periods, inputs.assumption(names::INVENTORY)?, |i| {
        Some(cogs[i]? * dio[i]? / DAYS_PER_YEAR)
    });
    let reported_payables = inputs.assumption(names::ACCOUNTS_PAYABLE)?;
    let payables = series::reported_then(periods, reported_payables, |i| {
        Some(cogs[i]? * dpo[i]? / DAYS_PER_YEAR)
    });
    let nwc = series::sub(&series::add(&receivables, &inventory), &payables);

    let ppe = series::roll_forward(periods, inputs.assumption(names::PPE)?, |i, prior| {
        Some(prior + capex[i]? - da[i]?)
    });
    let equity = series::roll_forward(periods, inputs.assumption(names::EQUITY)?, |i, prior| {
        Some(prior + net_income[i]? - dividends[i]?)
    });
    let cash = series::roll_forward(periods, inputs.assumption(names::CASH)?, |i, prior| {
        let nwc_increase = nwc[i]? - series::prior(&nwc, i)?;
        let net_borrowing = debt[i]? - series::prior(&debt, i)?;
        let operating = net_income[i]? + da[i]? - nwc_increase;
        Some(prior + operating - capex[i]? + net_borrowing - dividends[i]?)
    });

    let assets = [
        cash.as_slice(),
        receivables.as_slice(),
        inventory.as_slice(),
        ppe.as_slice(),
    ];
    let total_assets = series::sum(&assets, periods.len());
    let total_liabilities = series::add(&payables, &debt);
    let liabilities_and_equity = series::add(&total_liabilities, &equity);

    // (name, label, values, note); an empty note leaves the row without one
    let rows: [(&str, &str, Vec<Value>, &str); 11] = [
        (names::BS_CASH, "Cash", cash, "Prior cash + operating, investing and financing flows"),
        (names::BS_RECEIVABLES, "Accounts receivable", receivables, "Revenue x DSO / 365"),
        (names::BS_INVENTORY, "Inventory", inventory, "COGS x DIO / 365"),
        (names::BS_PPE, "PP&E, net", ppe, "Prior PP&E + capex - D&A"),
        (names::BS_TOTAL_ASSETS, "Total assets", total_assets, ""),
        (names::BS_PAYABLES, "Accounts payable", payables, "COGS x DPO / 365"),
        (names::BS_DEBT, "Debt", debt, "Closing balance from debt schedule"),
        (names::BS_TOTAL_LIABILITIES, "Total liabilities", total_liabilities, ""),
        (names::BS_EQUITY, "Shareholders' equity", equity, "Prior equity + net income - dividends"),
        (
            names::BS_LIABILITIES_AND_EQUITY,
            "Total liabilities & equity",
            liabilities_and_equity,
            "",
        ),
        (
            names::BS_NET_WORKING_CAPITAL,
            "Net working capital",
            nwc,
            "Receivables + inventory - payables",
        ),
    ];
    for (name, label, values, note) in rows {
        out.push_item(LineItem::new(stage, name, label, Unit::Money, values).with_note(note));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::model::{ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    fn state_through_bs() -> ModelState {
        let config = ModelConfig::default();
        let mut state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        for stage in &Stage::ALL[..4] {
            let out = stage.compute(&state.inputs(*stage, &config)).unwrap();
            state.apply(out);
        }
        state
    }

    #[test]
    fn test_reported_years_use_anchors() {
        let state = state_through_bs();
        assert_eq!(state.line_item("bs.cash").unwrap().value(2), Some(120.0));
        assert_eq!(state.line_item("bs.total_assets").unwrap().value(2), Some(960.0));
        let claims = state.line_item("bs.total_liabilities_and_equity").unwrap();
        assert_eq!(claims.value(2), Some(960.0));
    }

    #[test]
    fn test_working_capital_days() {
        let state = state_through_bs();
        let revenue = state.line_item("pl.revenue").unwrap().value(3).unwrap();
        let receivables = state.line_item("bs.accounts_receivable").unwrap().value(3).unwrap();
        assert_relative_eq!(receivables, revenue * 45.0 / 365.0, epsilon = 1e-9);
    }

    #[test]
    fn test_forecast_balances() {
        let state = state_through_bs();
        for idx in 3..8 {
            let assets = state.line_item("bs.total_assets").unwrap().value(idx).unwrap();
            let claims = state.line_item("bs.total_liabilities_and_equity").unwrap();
            let claims = claims.value(idx).unwrap();
            assert_relative_eq!(assets, claims, epsilon = 1e-6);
        }
    }
}
