//! Per-segment P&L down to EBIT

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Unit};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let mut out = inputs.output();
    let stage = inputs.stage();

    for segment in inputs.segments() {
        let key = segment.key.as_str();
        let revenue = inputs.item(&names::segment_item(key, names::REVENUE))?;
        let cogs_pct = inputs.assumption(&names::segment_assumption(key, names::SEG_COGS_PCT))?;
        let opex_pct = inputs.assumption(&names::segment_assumption(key, names::SEG_OPEX_PCT))?;
        let da_pct = inputs.assumption(&names::segment_assumption(key, names::SEG_DA_PCT))?;

        let cogs = series::mul(revenue, cogs_pct);
        let gross_profit = series::sub(revenue, &cogs);
        let opex = series::mul(revenue, opex_pct);
        let ebitda = series::sub(&gross_profit, &opex);
        let da = series::mul(revenue, da_pct);
        let ebit = series::sub(&ebitda, &da);

        let item = |name: &str, label: &str, values| {
            LineItem::new(
                stage,
                names::segment_item(key, name),
                format!("{} {}", segment.name, label),
                Unit::Money,
                values,
            )
        };

        out.push_item(item(names::COGS, "COGS", cogs).with_note("Revenue x COGS %"));
        out.push_item(item(names::GROSS_PROFIT, "gross profit", gross_profit));
        out.push_item(item(names::OPEX, "opex", opex).with_note("Revenue x opex %"));
        out.push_item(item(names::EBITDA, "EBITDA", ebitda));
        out.push_item(item(names::DA, "D&A", da).with_note("Revenue x D&A %"));
        out.push_item(item(names::EBIT, "EBIT", ebit));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::error::ModelError;
    use crate::model::{ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    #[test]
    fn test_requires_segment_revenue() {
        let state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        let config = ModelConfig::default();
        let err = Stage::SegmentPL.compute(&state.inputs(Stage::SegmentPL, &config)).unwrap_err();

        match err {
            ModelError::MissingDependency { stage, name } => {
                assert_eq!(stage, Stage::SegmentPL);
                assert_eq!(name, "segment.a.revenue");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_segment_ebit_first_forecast_year() {
        let config = ModelConfig::default();
        let mut state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        for stage in [Stage::SegmentRevenue, Stage::SegmentPL] {
            let out = stage.compute(&state.inputs(stage, &config)).unwrap();
            state.apply(out);
        }

        // 560 revenue, 30% COGS, 34% opex, 5% D&A
        let ebit = state.line_item("segment.a.ebit").unwrap().value(3).unwrap();
        assert_relative_eq!(ebit, 560.0 * (1.0 - 0.30 - 0.34 - 0.05), epsilon = 1e-9);
    }
}
