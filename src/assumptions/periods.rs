//! Fiscal period range shared by every series in a model run

use serde::{Deserialize, Serialize};

/// Whether a period carries reported actuals or projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodKind {
    Historical,
    Forecast,
}

/// A single fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub kind: PeriodKind,
}

impl Period {
    /// Display label, e.g. `FY2024A` or `FY2025E`
    pub fn label(&self) -> String {
        let suffix = match self.kind {
            PeriodKind::Historical => 'A',
            PeriodKind::Forecast => 'E',
        };
        format!("FY{}{}", self.year, suffix)
    }

    pub fn is_forecast(&self) -> bool {
        self.kind == PeriodKind::Forecast
    }
}

/// Contiguous historical years followed by contiguous forecast years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    periods: Vec<Period>,
}

impl PeriodRange {
    /// Build a range starting at `first_year` with the given number of
    /// historical and forecast years
    pub fn new(first_year: i32, historical_years: usize, forecast_years: usize) -> Self {
        let total = historical_years + forecast_years;
        let periods = (0..total)
            .map(|i| Period {
                year: first_year + i as i32,
                kind: if i < historical_years {
                    PeriodKind::Historical
                } else {
                    PeriodKind::Forecast
                },
            })
            .collect();
        Self { periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn get(&self, idx: usize) -> Option<&Period> {
        self.periods.get(idx)
    }

    pub fn index_of(&self, year: i32) -> Option<usize> {
        self.periods.iter().position(|p| p.year == year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.periods.iter().map(|p| p.year)
    }

    pub fn historical_count(&self) -> usize {
        self.periods.iter().filter(|p| !p.is_forecast()).count()
    }

    pub fn forecast_count(&self) -> usize {
        self.len() - self.historical_count()
    }

    /// Indices of forecast periods, in order
    pub fn forecast_indices(&self) -> std::ops::Range<usize> {
        self.historical_count()..self.len()
    }

    pub fn is_forecast(&self, idx: usize) -> bool {
        self.periods.get(idx).map(|p| p.is_forecast()).unwrap_or(false)
    }

    /// Valuation date for the DCF: the last reported year
    pub fn last_historical_index(&self) -> Option<usize> {
        self.historical_count().checked_sub(1)
    }

    pub fn first_forecast_index(&self) -> Option<usize> {
        let idx = self.historical_count();
        (idx < self.len()).then_some(idx)
    }

    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(Period::label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_range_layout() {
        let range = PeriodRange::new(2022, 3, 5);

        assert_eq!(range.len(), 8);
        assert_eq!(range.historical_count(), 3);
        assert_eq!(range.forecast_count(), 5);
        assert_eq!(range.last_historical_index(), Some(2));
        assert_eq!(range.first_forecast_index(), Some(3));
        assert_eq!(range.forecast_indices(), 3..8);
        assert_eq!(range.index_of(2025), Some(3));
        assert!(!range.is_forecast(2));
        assert!(range.is_forecast(3));
    }

    #[test]
    fn test_labels() {
        let range = PeriodRange::new(2024, 1, 1);
        assert_eq!(range.labels(), vec!["FY2024A", "FY2025E"]);
    }

    #[test]
    fn test_no_history() {
        let range = PeriodRange::new(2025, 0, 2);
        assert_eq!(range.last_historical_index(), None);
        assert_eq!(range.first_forecast_index(), Some(0));
    }
}
