//! Markdown report: statement tables with a notes column, the sensitivity
//! matrix and the consistency check table

use std::fmt::{self, Write};

use super::{RenderOutput, Renderer};
use crate::error::{ModelError, ModelResult};
use crate::model::{ModelRun, Stage, Unit};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

/// Table cell text; pipes would split the cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn write_header(out: &mut String, run: &ModelRun) -> fmt::Result {
    let summary = run.summary();
    writeln!(out, "# {} scenario", run.scenario())?;
    writeln!(out)?;
    writeln!(out, "Figures in {} unless stated otherwise.", run.unit_label())?;
    writeln!(out)?;
    writeln!(out, "| Output | Value |")?;
    writeln!(out, "|---|---:|")?;
    writeln!(out, "| Enterprise value | {} |", Unit::Money.format(summary.enterprise_value))?;
    writeln!(out, "| Equity value | {} |", Unit::Money.format(summary.equity_value))?;
    writeln!(out, "| Value per share | {} |", Unit::PerShare.format(summary.value_per_share))?;
    writeln!(out, "| WACC | {} |", Unit::Percent.format(summary.wacc))?;
    writeln!(out, "| Terminal growth | {} |", Unit::Percent.format(summary.terminal_growth))?;
    writeln!(out, "| Checks passed | {} / {} |", summary.checks_passed, summary.checks_total)?;
    writeln!(out)
}

fn write_period_header(out: &mut String, run: &ModelRun, first: &str) -> fmt::Result {
    let labels = run.periods().labels();
    writeln!(out, "| {} | {} | Notes |", first, labels.join(" | "))?;
    writeln!(out, "|---|{}---|", "---:|".repeat(labels.len()))
}

fn write_assumptions(out: &mut String, run: &ModelRun) -> fmt::Result {
    writeln!(out, "## Assumptions")?;
    writeln!(out)?;
    write_period_header(out, run, "Assumption")?;
    for a in run.assumptions() {
        let values: Vec<String> = a.values.iter().map(|v| a.unit.format(*v)).collect();
        writeln!(
            out,
            "| {} | {} | {} |",
            cell(&a.name),
            values.join(" | "),
            cell(a.note.as_deref().unwrap_or(""))
        )?;
    }
    writeln!(out)
}

fn write_stage(out: &mut String, run: &ModelRun, stage: Stage) -> fmt::Result {
    let mut items = run.items_for_stage(stage).peekable();
    let mut scalars = run.scalars_for_stage(stage).peekable();
    if items.peek().is_none() && scalars.peek().is_none() {
        return Ok(());
    }

    writeln!(out, "## {}", stage.title())?;
    writeln!(out)?;
    if items.peek().is_some() {
        write_period_header(out, run, "Line item")?;
        for item in items {
            writeln!(
                out,
                "| {} | {} | {} |",
                cell(&item.label),
                item.formatted().join(" | "),
                cell(&item.note)
            )?;
        }
        writeln!(out)?;
    }
    if scalars.peek().is_some() {
        writeln!(out, "| Output | Value | Notes |")?;
        writeln!(out, "|---|---:|---|")?;
        for scalar in scalars {
            writeln!(
                out,
                "| {} | {} | {} |",
                cell(&scalar.label),
                scalar.formatted(),
                cell(&scalar.note)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_sensitivity(out: &mut String, run: &ModelRun) -> fmt::Result {
    let Some(grid) = run.sensitivity() else {
        return Ok(());
    };
    let (centre_w, centre_g) = grid.centre();

    writeln!(out, "## Sensitivity: value per share")?;
    writeln!(out)?;
    let growth: Vec<String> = grid
        .terminal_growth
        .iter()
        .map(|g| format!("g {}", Unit::Percent.format(Some(*g))))
        .collect();
    writeln!(out, "| WACC | {} |", growth.join(" | "))?;
    writeln!(out, "|---|{}", "---:|".repeat(growth.len()))?;
    for (w, wacc) in grid.wacc.iter().enumerate() {
        let row: Vec<String> = (0..grid.terminal_growth.len())
            .map(|g| {
                let text = Unit::PerShare.format(grid.value(w, g));
                if (w, g) == (centre_w, centre_g) {
                    format!("**{}**", text)
                } else {
                    text
                }
            })
            .collect();
        writeln!(out, "| {} | {} |", Unit::Percent.format(Some(*wacc)), row.join(" | "))?;
    }
    writeln!(out)
}

fn write_checks(out: &mut String, run: &ModelRun) -> fmt::Result {
    writeln!(out, "## Consistency checks")?;
    writeln!(out)?;
    writeln!(out, "| Check | Result | Largest delta | Tolerance | Points | Description |")?;
    writeln!(out, "|---|---|---:|---:|---:|---|")?;
    for check in run.checks() {
        writeln!(
            out,
            "| {} | {} | {:.6} | {} | {} | {} |",
            check.name,
            if check.passed { "PASS" } else { "FAIL" },
            check.delta,
            check.tolerance,
            check.evaluated,
            cell(&check.description)
        )?;
    }
    Ok(())
}

fn report(run: &ModelRun) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_header(&mut out, run)?;
    write_assumptions(&mut out, run)?;
    for stage in Stage::ALL {
        write_stage(&mut out, run, stage)?;
        if stage == Stage::Sensitivity {
            write_sensitivity(&mut out, run)?;
        }
    }
    write_checks(&mut out, run)?;
    Ok(out)
}

impl Renderer for MarkdownRenderer {
    fn format(&self) -> &'static str {
        "md"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn render(&self, run: &ModelRun) -> ModelResult<RenderOutput> {
        let text = report(run).map_err(|e| ModelError::Render(format!("markdown: {}", e)))?;
        Ok(RenderOutput {
            format: self.format(),
            bytes: text.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelEngine;
    use crate::scenario::Scenario;

    fn base_report() -> String {
        let run = ModelEngine::default().run_model(Scenario::Base).unwrap();
        let out = MarkdownRenderer.render(&run).unwrap();
        String::from_utf8(out.bytes).unwrap()
    }

    #[test]
    fn test_sections_in_pipeline_order() {
        let report = base_report();
        let positions: Vec<usize> = [
            "## Segment Revenue",
            "## Consolidated P&L",
            "## Balance Sheet",
            "## Cash Flow",
            "## DCF",
            "## Sensitivity: value per share",
            "## Ratios",
            "## Consistency checks",
        ]
        .iter()
        .map(|h| report.find(h).unwrap_or_else(|| panic!("missing {}", h)))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_notes_and_not_meaningful() {
        let report = base_report();
        assert!(report.contains("| Line item | FY2022A | FY2023A | FY2024A | FY2025E |"));
        assert!(report.contains("Revenue x DSO / 365"));
        assert!(report.contains("n/m"));
        assert!(report.contains("| balance_sheet_identity | PASS |"));
    }

    #[test]
    fn test_sensitivity_centre_is_highlighted() {
        let report = base_report();
        assert!(report.contains("| WACC | g 2.0% | g 2.5% | g 3.0% | g 3.5% | g 4.0% |"));
        assert_eq!(report.matches("**").count(), 2);
    }
}
