//! Pipeline stages and their outputs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, Scalar};
use super::stages::{self, SensitivityGrid};
use super::state::StageInputs;
use crate::error::ModelResult;

/// A step of the model pipeline. Variants are declared in evaluation order;
/// each stage only reads outputs of stages before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    SegmentRevenue,
    SegmentPL,
    ConsolidatedPL,
    BalanceSheet,
    CashFlow,
    Dcf,
    Sensitivity,
    Ratios,
}

impl Stage {
    /// All stages in required evaluation order
    pub const ALL: [Stage; 8] = [
        Stage::SegmentRevenue,
        Stage::SegmentPL,
        Stage::ConsolidatedPL,
        Stage::BalanceSheet,
        Stage::CashFlow,
        Stage::Dcf,
        Stage::Sensitivity,
        Stage::Ratios,
    ];

    /// Human-readable title, used as a sheet/section heading by renderers
    pub fn title(&self) -> &'static str {
        match self {
            Stage::SegmentRevenue => "Segment Revenue",
            Stage::SegmentPL => "Segment P&L",
            Stage::ConsolidatedPL => "Consolidated P&L",
            Stage::BalanceSheet => "Balance Sheet",
            Stage::CashFlow => "Cash Flow",
            Stage::Dcf => "DCF",
            Stage::Sensitivity => "Sensitivity",
            Stage::Ratios => "Ratios",
        }
    }

    /// Evaluate this stage against the accumulated state
    pub fn compute(&self, inputs: &StageInputs<'_>) -> ModelResult<StageOutput> {
        match self {
            Stage::SegmentRevenue => stages::segment_revenue::compute(inputs),
            Stage::SegmentPL => stages::segment_pl::compute(inputs),
            Stage::ConsolidatedPL => stages::consolidated_pl::compute(inputs),
            Stage::BalanceSheet => stages::balance_sheet::compute(inputs),
            Stage::CashFlow => stages::cash_flow::compute(inputs),
            Stage::Dcf => stages::dcf::compute(inputs),
            Stage::Sensitivity => stages::sensitivity::compute(inputs),
            Stage::Ratios => stages::ratios::compute(inputs),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.title())
    }
}

/// Everything one stage produces
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub stage: Stage,
    pub line_items: Vec<LineItem>,
    pub scalars: Vec<Scalar>,
    pub sensitivity: Option<SensitivityGrid>,
}

impl StageOutput {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            line_items: Vec::new(),
            scalars: Vec::new(),
            sensitivity: None,
        }
    }

    pub fn push_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    pub fn push_scalar(&mut self, scalar: Scalar) {
        self.scalars.push(scalar);
    }

    pub fn item(&self, name: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|i| i.name == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.scalars.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_matches_declaration() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
        assert_eq!(Stage::ALL.first(), Some(&Stage::SegmentRevenue));
        assert_eq!(Stage::ALL.last(), Some(&Stage::Ratios));
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::ConsolidatedPL.to_string(), "Consolidated P&L");
    }
}
