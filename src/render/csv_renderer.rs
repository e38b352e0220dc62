//! Long-format CSV: one row per line item and period, plus one row per scalar

use serde::Serialize;

use super::{RenderOutput, Renderer};
use crate::error::{ModelError, ModelResult};
use crate::model::{ModelRun, Value, NOT_MEANINGFUL};

#[derive(Debug, Serialize)]
struct Row<'a> {
    scenario: &'a str,
    stage: &'a str,
    name: &'a str,
    label: &'a str,
    /// Empty for scalars
    period: &'a str,
    value: String,
    note: &'a str,
}

/// Raw value at full precision, `n/m` when undefined
fn raw(value: Value) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_MEANINGFUL.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn render(&self, run: &ModelRun) -> ModelResult<RenderOutput> {
        let err = |e: csv::Error| ModelError::Render(format!("csv: {}", e));
        let mut writer = csv::Writer::from_writer(Vec::new());
        let scenario = run.scenario().as_str();
        let labels = run.periods().labels();

        for item in run.line_items() {
            for (period, value) in labels.iter().zip(&item.values) {
                writer
                    .serialize(Row {
                        scenario,
                        stage: item.stage.title(),
                        name: &item.name,
                        label: &item.label,
                        period,
                        value: raw(*value),
                        note: &item.note,
                    })
                    .map_err(err)?;
            }
        }
        for scalar in run.scalars() {
            writer
                .serialize(Row {
                    scenario,
                    stage: scalar.stage.title(),
                    name: &scalar.name,
                    label: &scalar.label,
                    period: "",
                    value: raw(scalar.value),
                    note: &scalar.note,
                })
                .map_err(err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ModelError::Render(format!("csv: {}", e)))?;
        Ok(RenderOutput {
            format: self.format(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{names, ModelEngine};
    use crate::scenario::Scenario;

    #[test]
    fn test_long_format() {
        let run = ModelEngine::default().run_model(Scenario::Base).unwrap();
        let out = CsvRenderer.render(&run).unwrap();
        let text = out.as_str().unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("scenario,stage,name,label,period,value,note"));

        let rows = text.lines().count() - 1;
        let expected = run.line_items().len() * run.periods().len() + run.scalars().len();
        assert_eq!(rows, expected);

        // Historical cash flow has no prior period
        let first_cash =
            format!("Base,Cash Flow,{},Ending cash,FY2022A,n/m", names::CF_ENDING_CASH);
        assert!(text.contains(&first_cash));
        assert!(text.contains("Base,DCF,dcf.wacc,WACC,,0.09,"));
    }
}
