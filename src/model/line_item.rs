//! Derived line items, scalar outputs and their display units

use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// A single period value. `None` is "not meaningful" (shown as `n/m`),
/// used for undefined ratios and for periods a series does not cover.
pub type Value = Option<f64>;

/// Display marker for undefined values
pub const NOT_MEANINGFUL: &str = "n/m";

/// Measurement unit of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Currency amount in the table's denomination (e.g. USD millions)
    Money,
    /// Fraction, displayed as a percentage
    Percent,
    /// Valuation or leverage multiple
    Multiple,
    /// Currency per share
    PerShare,
    /// Share count or other plain quantity
    Count,
    /// Working capital days
    Days,
    /// Unitless factor, e.g. a discount factor
    Factor,
}

impl Unit {
    /// Format a value for display; undefined values render as `n/m`
    pub fn format(&self, value: Value) -> String {
        let Some(v) = value else {
            return NOT_MEANINGFUL.to_string();
        };
        match self {
            Unit::Money => format!("{:.1}", v),
            Unit::Percent => format!("{:.1}%", v * 100.0),
            Unit::Multiple => format!("{:.1}x", v),
            Unit::PerShare => format!("{:.2}", v),
            Unit::Count => format!("{:.1}", v),
            Unit::Days => format!("{:.0}", v),
            Unit::Factor => format!("{:.4}", v),
        }
    }

    /// Parse a unit name as written in assumption files
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "money" => Some(Unit::Money),
            "percent" | "pct" => Some(Unit::Percent),
            "multiple" => Some(Unit::Multiple),
            "per_share" => Some(Unit::PerShare),
            "count" => Some(Unit::Count),
            "days" => Some(Unit::Days),
            "factor" => Some(Unit::Factor),
            _ => None,
        }
    }
}

/// A named series indexed by period, produced by exactly one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub label: String,
    pub stage: Stage,
    pub unit: Unit,
    /// Forecast rationale shown next to the row by renderers
    pub note: String,
    pub values: Vec<Value>,
}

impl LineItem {
    pub fn new(
        stage: Stage,
        name: impl Into<String>,
        label: impl Into<String>,
        unit: Unit,
        values: Vec<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            stage,
            unit,
            note: String::new(),
            values,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn value(&self, idx: usize) -> Value {
        self.values.get(idx).copied().flatten()
    }

    /// Formatted values for every period
    pub fn formatted(&self) -> Vec<String> {
        self.values.iter().map(|v| self.unit.format(*v)).collect()
    }
}

/// A named single-value output (enterprise value, value per share, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub name: String,
    pub label: String,
    pub stage: Stage,
    pub unit: Unit,
    pub note: String,
    pub value: Value,
}

impl Scalar {
    pub fn new(
        stage: Stage,
        name: impl Into<String>,
        label: impl Into<String>,
        unit: Unit,
        value: Value,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            stage,
            unit,
            note: String::new(),
            value,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn formatted(&self) -> String {
        self.unit.format(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_format() {
        assert_eq!(Unit::Money.format(Some(1234.56)), "1234.6");
        assert_eq!(Unit::Percent.format(Some(0.125)), "12.5%");
        assert_eq!(Unit::Multiple.format(Some(8.04)), "8.0x");
        assert_eq!(Unit::PerShare.format(Some(31.456)), "31.46");
        assert_eq!(Unit::Percent.format(None), "n/m");
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(Unit::parse("Money"), Some(Unit::Money));
        assert_eq!(Unit::parse("pct"), Some(Unit::Percent));
        assert_eq!(Unit::parse("furlongs"), None);
    }

    #[test]
    fn test_line_item_value_out_of_range() {
        let values = vec![Some(1.0), None];
        let item = LineItem::new(Stage::SegmentRevenue, "x", "X", Unit::Money, values);
        assert_eq!(item.value(0), Some(1.0));
        assert_eq!(item.value(1), None);
        assert_eq!(item.value(5), None);
        assert_eq!(item.formatted(), vec!["1.0", "n/m"]);
    }
}
