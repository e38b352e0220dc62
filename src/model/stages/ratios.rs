//! Margins, growth, returns and leverage
//!
//! Every ratio with a zero or undefined denominator is n/m.

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Scalar, Unit, Value};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let stage = inputs.stage();
    let mut out = inputs.output();

    let revenue = inputs.item(names::PL_REVENUE)?;
    let gross_profit = inputs.item(names::PL_GROSS_PROFIT)?;
    let ebitda = inputs.item(names::PL_EBITDA)?;
    let ebit = inputs.item(names::PL_EBIT)?;
    let interest = inputs.item(names::PL_INTEREST)?;
    let pretax = inputs.item(names::PL_PRETAX)?;
    let tax = inputs.item(names::PL_TAX)?;
    let net_income = inputs.item(names::PL_NET_INCOME)?;
    let cash = inputs.item(names::BS_CASH)?;
    let debt = inputs.item(names::BS_DEBT)?;
    let equity = inputs.item(names::BS_EQUITY)?;
    let fcf = inputs.item(names::CF_UNLEVERED_FCF)?;
    let shares = inputs.assumption(names::SHARES_OUTSTANDING)?;
    let enterprise_value = inputs.scalar(names::DCF_ENTERPRISE_VALUE)?;

    let net_debt = series::sub(debt, cash);
    let roe: Vec<Value> = (0..periods.len())
        .map(|i| series::safe_div(net_income[i], series::prior(equity, i)))
        .collect();

    let item = |name: &str, label: &str, unit: Unit, values: Vec<Value>| {
        LineItem::new(stage, name, label, unit, values)
    };

    let net_debt_to_ebitda = series::ratio(&net_debt, ebitda);
    // (name, label, unit, values, note)
    let rows: [(&str, &str, Unit, Vec<Value>, &str); 12] = [
        (
            names::RATIO_REVENUE_GROWTH,
            "Revenue growth",
            Unit::Percent,
            series::yoy_growth(revenue),
            "Revenue / prior revenue - 1",
        ),
        (
            names::RATIO_GROSS_MARGIN,
            "Gross margin",
            Unit::Percent,
            series::ratio(gross_profit, revenue),
            "",
        ),
        (
            names::RATIO_EBITDA_MARGIN,
            "EBITDA margin",
            Unit::Percent,
            series::ratio(ebitda, revenue),
            "",
        ),
        (names::RATIO_EBIT_MARGIN, "EBIT margin", Unit::Percent, series::ratio(ebit, revenue), ""),
        (
            names::RATIO_NET_MARGIN,
            "Net margin",
            Unit::Percent,
            series::ratio(net_income, revenue),
            "",
        ),
        (
            names::RATIO_EFFECTIVE_TAX,
            "Effective tax rate",
            Unit::Percent,
            series::ratio(tax, pretax),
            "Income tax / pre-tax income",
        ),
        (
            names::RATIO_EPS,
            "Earnings per share",
            Unit::PerShare,
            series::ratio(net_income, shares),
            "",
        ),
        (
            names::RATIO_NET_DEBT_TO_EBITDA,
            "Net debt / EBITDA",
            Unit::Multiple,
            net_debt_to_ebitda,
            "",
        ),
        (names::RATIO_NET_DEBT, "Net debt", Unit::Money, net_debt, "Debt less cash"),
        (
            names::RATIO_INTEREST_COVERAGE,
            "Interest coverage",
            Unit::Multiple,
            series::ratio(ebit, interest),
            "EBIT / interest expense",
        ),
        (names::RATIO_ROE, "Return on equity", Unit::Percent, roe, "Net income / opening equity"),
        (
            names::RATIO_FCF_CONVERSION,
            "FCF conversion",
            Unit::Percent,
            series::ratio(fcf, ebitda),
            "Unlevered FCF / EBITDA",
        ),
    ];
    for (name, label, unit, values, note) in rows {
        out.push_item(item(name, label, unit, values).with_note(note));
    }

    for segment in inputs.segments() {
        let key = segment.key.as_str();
        let seg_revenue = inputs.item(&names::segment_item(key, names::REVENUE))?;
        let seg_ebit = inputs.item(&names::segment_item(key, names::EBIT))?;

        out.push_item(item(
            &names::segment_ratio(key, names::REVENUE_GROWTH),
            &format!("{} revenue growth", segment.name),
            Unit::Percent,
            series::yoy_growth(seg_revenue),
        ));
        out.push_item(item(
            &names::segment_ratio(key, names::EBIT_MARGIN),
            &format!("{} EBIT margin", segment.name),
            Unit::Percent,
            series::ratio(seg_ebit, seg_revenue),
        ));
        out.push_item(
            item(
                &names::segment_ratio(key, names::REVENUE_MIX),
                &format!("{} share of revenue", segment.name),
                Unit::Percent,
                series::ratio(seg_revenue, revenue),
            )
            .with_note("Segment revenue / total revenue"),
        );
    }

    let first_forecast_ebitda = periods.first_forecast_index().and_then(|i| ebitda[i]);
    out.push_scalar(
        Scalar::new(
            stage,
            names::RATIO_IMPLIED_EV_EBITDA,
            "Implied EV / EBITDA (first forecast year)",
            Unit::Multiple,
            series::safe_div(enterprise_value, first_forecast_ebitda),
        )
        .with_note("DCF enterprise value / first forecast year EBITDA"),
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::error::ModelError;
    use crate::model::{names, ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    fn state_through(count: usize) -> ModelState {
        let config = ModelConfig::default();
        let mut state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        for stage in &Stage::ALL[..count] {
            let out = stage.compute(&state.inputs(*stage, &config)).unwrap();
            state.apply(out);
        }
        state
    }

    #[test]
    fn test_ratios_need_valuation() {
        let config = ModelConfig::default();
        let state = state_through(5);
        let err = Stage::Ratios.compute(&state.inputs(Stage::Ratios, &config)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MissingDependency { stage: Stage::Ratios, ref name }
                if name == names::DCF_ENTERPRISE_VALUE
        ));
    }

    #[test]
    fn test_margins_and_mix() {
        let state = state_through(8);
        let value = |name: &str, idx: usize| state.line_item(name).unwrap().value(idx).unwrap();

        // FY2024A: revenue 1030, segment A 500
        let a_mix = value("ratio.segment.a.revenue_mix", 2);
        assert_relative_eq!(a_mix, 500.0 / 1030.0, epsilon = 1e-12);
        let margin = value("ratio.segment.a.ebit_margin", 2);
        assert_relative_eq!(margin, 1.0 - 0.30 - 0.35 - 0.05, epsilon = 1e-12);
        assert_relative_eq!(value(names::RATIO_EFFECTIVE_TAX, 3), 0.25, epsilon = 1e-12);

        let mix: f64 = ["a", "b", "c"]
            .iter()
            .map(|k| value(&names::segment_ratio(k, names::REVENUE_MIX), 4))
            .sum();
        assert_relative_eq!(mix, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_period_growth_and_return_are_not_meaningful() {
        let state = state_through(8);
        assert_eq!(state.line_item(names::RATIO_REVENUE_GROWTH).unwrap().value(0), None);
        assert_eq!(state.line_item(names::RATIO_ROE).unwrap().value(0), None);
        assert!(state.line_item(names::RATIO_ROE).unwrap().value(1).is_some());
        assert!(state.scalar(names::RATIO_IMPLIED_EV_EBITDA).unwrap().value.unwrap() > 0.0);
    }
}
