//! Consolidated P&L and the debt schedule that drives interest expense
//!
//! Totals are rebuilt from segment revenue and cost lines. Consolidated EBIT
//! comes from those totals, not from segment EBIT; the consistency checks
//! compare the two.

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Unit, Value};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

/// Sum a segment line item across all segments
fn segment_total(inputs: &StageInputs<'_>, item: &str) -> ModelResult<Vec<Value>> {
    let parts = inputs
        .segments()
        .iter()
        .map(|s| inputs.item(&names::segment_item(&s.key, item)))
        .collect::<ModelResult<Vec<_>>>()?;
    Ok(series::sum(&parts, inputs.periods().len()))
}

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let stage = inputs.stage();
    let mut out = inputs.output();

    let revenue = segment_total(inputs, names::REVENUE)?;
    let cogs = segment_total(inputs, names::COGS)?;
    let opex = segment_total(inputs, names::OPEX)?;
    let da = segment_total(inputs, names::DA)?;

    let gross_profit = series::sub(&revenue, &cogs);
    let ebitda = series::sub(&gross_profit, &opex);
    let ebit = series::sub(&ebitda, &da);

    // Debt is assumption-driven, so interest has no circular reference to cash
    let reported_debt = inputs.assumption(names::DEBT)?;
    let issuance = inputs.assumption(names::DEBT_ISSUANCE)?;
    let repayment = inputs.assumption(names::DEBT_REPAYMENT)?;
    let debt_closing = series::roll_forward(periods, reported_debt, |i, prior| {
        Some(prior + issuance[i]? - repayment[i]?)
    });
    let debt_opening: Vec<Value> =
        (0..periods.len()).map(|i| series::prior(&debt_closing, i)).collect();

    let interest_rate = inputs.assumption(names::INTEREST_RATE)?;
    let interest: Vec<Value> = (0..periods.len())
        .map(|i| {
            let closing = debt_closing[i]?;
            let average = match debt_opening[i] {
                Some(opening) => (opening + closing) / 2.0,
                None => closing,
            };
            Some(interest_rate[i]? * average)
        })
        .collect();

    let pretax = series::sub(&ebit, &interest);
    let tax_rate = inputs.assumption(names::TAX_RATE)?;
    let tax = series::zip_with(&pretax, tax_rate, |p, t| p.max(0.0) * t);
    let net_income = series::sub(&pretax, &tax);
    let payout = inputs.assumption(names::PAYOUT_RATIO)?;
    let dividends = series::zip_with(&net_income, payout, |n, p| n.max(0.0) * p);

    let money = |name: &str, label: &str, values: Vec<Value>| {
        LineItem::new(stage, name, label, Unit::Money, values)
    };

    out.push_item(money(names::PL_REVENUE, "Revenue", revenue).with_note("Sum of segment revenue"));
    out.push_item(money(names::PL_COGS, "COGS", cogs).with_note("Sum of segment COGS"));
    out.push_item(money(names::PL_GROSS_PROFIT, "Gross profit", gross_profit));
    out.push_item(
        money(names::PL_OPEX, "Operating expenses", opex).with_note("Sum of segment opex"),
    );
    out.push_item(money(names::PL_EBITDA, "EBITDA", ebitda));
    out.push_item(money(names::PL_DA, "D&A", da).with_note("Sum of segment D&A"));
    out.push_item(
        money(names::PL_EBIT, "EBIT", ebit).with_note("EBITDA less D&A from consolidated totals"),
    );
    out.push_item(
        money(names::SCHEDULE_DEBT_OPENING, "Debt, opening", debt_opening)
            .with_note("Prior year closing debt"),
    );
    out.push_item(
        money(names::SCHEDULE_DEBT_CLOSING, "Debt, closing", debt_closing)
            .with_note("Reported for actuals; opening + issuance - repayment for forecast"),
    );
    out.push_item(
        money(names::PL_INTEREST, "Interest expense", interest)
            .with_note("Interest rate x average of opening and closing debt"),
    );
    out.push_item(money(names::PL_PRETAX, "Pre-tax income", pretax));
    out.push_item(
        money(names::PL_TAX, "Income tax", tax).with_note("Tax rate x positive pre-tax income"),
    );
    out.push_item(money(names::PL_NET_INCOME, "Net income", net_income));
    out.push_item(
        money(names::PL_DIVIDENDS, "Dividends", dividends)
            .with_note("Payout ratio x positive net income"),
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::model::{ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    fn state_through_pl(table: AssumptionTable) -> ModelState {
        let config = ModelConfig::default();
        let mut state = ModelState::new(table.resolve(Scenario::Base));
        for stage in [Stage::SegmentRevenue, Stage::SegmentPL, Stage::ConsolidatedPL] {
            let out = stage.compute(&state.inputs(stage, &config)).unwrap();
            state.apply(out);
        }
        state
    }

    #[test]
    fn test_debt_schedule_and_interest() {
        let state = state_through_pl(AssumptionTable::default_table());
        let closing = &state.line_item("schedule.debt_closing").unwrap().values;
        let interest = &state.line_item("pl.interest_expense").unwrap().values;

        assert_eq!(closing[2], Some(300.0));
        assert_eq!(closing[3], Some(280.0));
        assert_eq!(closing[7], Some(200.0));
        // 5% on average of 300 and 280
        assert_relative_eq!(interest[3].unwrap(), 14.5, epsilon = 1e-9);
        // First reported year has no opening balance: closing balance is used
        assert_relative_eq!(interest[0].unwrap(), 17.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_tax_on_losses() {
        let mut table = AssumptionTable::default_table();
        for key in ["a", "b", "c"] {
            table.set_scenario_value(&format!("{}.opex_pct", key), Scenario::Base, 0.9).unwrap();
        }
        let state = state_through_pl(table);

        let pretax = state.line_item("pl.pretax_income").unwrap().value(3).unwrap();
        let tax = state.line_item("pl.tax").unwrap().value(3).unwrap();
        let dividends = state.line_item("pl.dividends").unwrap().value(3).unwrap();
        assert!(pretax < 0.0);
        assert_eq!(tax, 0.0);
        assert_eq!(dividends, 0.0);
    }
}
