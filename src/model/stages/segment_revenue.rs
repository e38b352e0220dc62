//! Segment revenue build: reported revenue, then compounding growth

use crate::error::ModelResult;
use crate::model::line_item::{LineItem, Unit};
use crate::model::names;
use crate::model::series;
use crate::model::stage::StageOutput;
use crate::model::state::StageInputs;

pub fn compute(inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
    let periods = inputs.periods();
    let mut out = inputs.output();

    for segment in inputs.segments() {
        let driver = |name: &str| names::segment_assumption(&segment.key, name);
        let reported = inputs.assumption(&driver(names::SEG_REVENUE_ANCHOR))?;
        let growth = inputs.assumption(&driver(names::SEG_REVENUE_GROWTH))?;

        let revenue = series::roll_forward(periods, reported, |i, prior| {
            growth[i].map(|g| prior * (1.0 + g))
        });

        out.push_item(
            LineItem::new(
                inputs.stage(),
                names::segment_item(&segment.key, names::REVENUE),
                format!("{} revenue", segment.name),
                Unit::Money,
                revenue,
            )
            .with_note("Reported for actuals; prior year x (1 + growth) for forecast"),
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::assumptions::AssumptionTable;
    use crate::model::{ModelConfig, ModelState, Stage};
    use crate::scenario::Scenario;

    #[test]
    fn test_segment_a_compounds_at_twelve_percent() {
        let state = ModelState::new(AssumptionTable::default_table().resolve(Scenario::Base));
        let config = ModelConfig::default();
        let inputs = state.inputs(Stage::SegmentRevenue, &config);
        let out = Stage::SegmentRevenue.compute(&inputs).unwrap();

        let revenue = &out.item("segment.a.revenue").unwrap().values;
        assert_eq!(revenue[2], Some(500.0));
        assert_relative_eq!(revenue[3].unwrap(), 560.0, epsilon = 1e-9);
        assert_relative_eq!(revenue[4].unwrap(), 627.2, epsilon = 1e-9);
        assert_eq!(out.line_items.len(), 3);
    }
}
