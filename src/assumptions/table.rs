//! Static assumption table: named drivers with per-scenario values and
//! historical anchors

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::periods::PeriodRange;
use super::resolved::{ResolvedAssumption, ResolvedAssumptions};
use crate::error::{ModelError, ModelResult};
use crate::model::{names, Unit};
use crate::scenario::Scenario;

/// Values for one scenario across the forecast years
///
/// A `default` applies to every forecast year; `by_year` entries override it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub default: Option<f64>,
    pub by_year: BTreeMap<i32, f64>,
}

impl Schedule {
    pub fn constant(value: f64) -> Self {
        Self {
            default: Some(value),
            by_year: BTreeMap::new(),
        }
    }

    /// Explicit per-year values starting at `first_year`
    pub fn yearly(first_year: i32, values: &[f64]) -> Self {
        Self {
            default: None,
            by_year: values
                .iter()
                .enumerate()
                .map(|(i, &v)| (first_year + i as i32, v))
                .collect(),
        }
    }

    pub fn value_for(&self, year: i32) -> Option<f64> {
        self.by_year.get(&year).copied().or(self.default)
    }
}

/// One schedule per scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValues {
    pub base: Schedule,
    pub bull: Schedule,
    pub bear: Schedule,
}

impl ScenarioValues {
    pub fn constant(base: f64, bull: f64, bear: f64) -> Self {
        Self {
            base: Schedule::constant(base),
            bull: Schedule::constant(bull),
            bear: Schedule::constant(bear),
        }
    }

    pub fn get(&self, scenario: Scenario) -> &Schedule {
        match scenario {
            Scenario::Base => &self.base,
            Scenario::Bull => &self.bull,
            Scenario::Bear => &self.bear,
        }
    }

    pub fn get_mut(&mut self, scenario: Scenario) -> &mut Schedule {
        match scenario {
            Scenario::Base => &mut self.base,
            Scenario::Bull => &mut self.bull,
            Scenario::Bear => &mut self.bear,
        }
    }
}

/// A named input to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub name: String,
    pub unit: Unit,
    pub note: Option<String>,
    /// Forecast values; `None` for pure historical anchors
    pub scenario: Option<ScenarioValues>,
    /// Reported values by fiscal year
    pub historical: BTreeMap<i32, f64>,
}

impl Assumption {
    /// Forecast driver with a constant value per scenario
    pub fn driver(name: impl Into<String>, unit: Unit, base: f64, bull: f64, bear: f64) -> Self {
        Self {
            name: name.into(),
            unit,
            note: None,
            scenario: Some(ScenarioValues::constant(base, bull, bear)),
            historical: BTreeMap::new(),
        }
    }

    /// Forecast driver with explicit per-year values per scenario
    pub fn schedule(
        name: impl Into<String>,
        unit: Unit,
        first_year: i32,
        base: &[f64],
        bull: &[f64],
        bear: &[f64],
    ) -> Self {
        Self {
            name: name.into(),
            unit,
            note: None,
            scenario: Some(ScenarioValues {
                base: Schedule::yearly(first_year, base),
                bull: Schedule::yearly(first_year, bull),
                bear: Schedule::yearly(first_year, bear),
            }),
            historical: BTreeMap::new(),
        }
    }

    /// Reported values only, no forecast
    pub fn anchor(name: impl Into<String>, unit: Unit, history: &[(i32, f64)]) -> Self {
        Self {
            name: name.into(),
            unit,
            note: None,
            scenario: None,
            historical: history.iter().copied().collect(),
        }
    }

    pub fn with_history(mut self, history: &[(i32, f64)]) -> Self {
        self.historical.extend(history.iter().copied());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Value per period: anchors for historical years, the scenario's
    /// schedule for forecast years
    fn resolve(&self, scenario: Scenario, periods: &PeriodRange) -> ResolvedAssumption {
        let values = periods
            .periods()
            .iter()
            .map(|p| {
                if p.is_forecast() {
                    self.scenario
                        .as_ref()
                        .and_then(|s| s.get(scenario).value_for(p.year))
                } else {
                    self.historical.get(&p.year).copied()
                }
            })
            .collect();

        ResolvedAssumption {
            name: self.name.clone(),
            unit: self.unit,
            note: self.note.clone(),
            values,
        }
    }
}

/// A reporting segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Short key used in assumption and line item names
    pub key: String,
    pub name: String,
}

impl Segment {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// The complete static input of a model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionTable {
    /// Denomination of every money figure, e.g. "USD millions"
    pub unit_label: String,
    pub periods: PeriodRange,
    pub segments: Vec<Segment>,
    assumptions: BTreeMap<String, Assumption>,
}

impl AssumptionTable {
    pub fn new(
        unit_label: impl Into<String>,
        periods: PeriodRange,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            unit_label: unit_label.into(),
            periods,
            segments,
            assumptions: BTreeMap::new(),
        }
    }

    /// Add or replace an assumption
    pub fn insert(&mut self, assumption: Assumption) {
        self.assumptions.insert(assumption.name.clone(), assumption);
    }

    pub fn get(&self, name: &str) -> Option<&Assumption> {
        self.assumptions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Assumption> {
        self.assumptions.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assumption> {
        self.assumptions.values()
    }

    pub fn len(&self) -> usize {
        self.assumptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assumptions.is_empty()
    }

    /// Override one scenario's value for every forecast year
    pub fn set_scenario_value(
        &mut self,
        name: &str,
        scenario: Scenario,
        value: f64,
    ) -> ModelResult<()> {
        let assumption = self.assumptions.get_mut(name).ok_or_else(|| {
            ModelError::InvalidAssumptionTable(format!("no assumption named {}", name))
        })?;
        let values = assumption.scenario.get_or_insert_with(ScenarioValues::default);
        *values.get_mut(scenario) = Schedule::constant(value);
        Ok(())
    }

    /// Resolve every assumption for one scenario. Pure: the table is not touched.
    pub fn resolve(&self, scenario: Scenario) -> ResolvedAssumptions {
        let values = self
            .assumptions
            .values()
            .map(|a| (a.name.clone(), a.resolve(scenario, &self.periods)))
            .collect();

        ResolvedAssumptions {
            scenario,
            unit_label: self.unit_label.clone(),
            periods: self.periods.clone(),
            segments: self.segments.clone(),
            values,
        }
    }

    /// Check that the table carries everything the stages read.
    ///
    /// Drivers need a value in every scenario for every forecast year.
    /// Segment revenue and the opening balances need an anchor for the last
    /// historical year.
    pub fn validate(&self) -> ModelResult<()> {
        let mut problems = Vec::new();

        let Some(last_hist) = self.periods.last_historical_index() else {
            return Err(ModelError::InvalidAssumptionTable(
                "at least one historical year is required for opening balances".to_string(),
            ));
        };
        if self.periods.forecast_count() == 0 {
            return Err(ModelError::InvalidAssumptionTable("no forecast years".to_string()));
        }
        if self.segments.is_empty() {
            return Err(ModelError::InvalidAssumptionTable("no segments".to_string()));
        }
        let mut keys = BTreeSet::new();
        for segment in &self.segments {
            if segment.key.trim().is_empty() {
                problems.push(format!("segment {:?} has an empty key", segment.name));
            } else if !keys.insert(segment.key.as_str()) {
                problems.push(format!("duplicate segment key {}", segment.key));
            }
        }
        if !problems.is_empty() {
            return Err(ModelError::InvalidAssumptionTable(problems.join("; ")));
        }

        let last_hist_year = self.periods.periods()[last_hist].year;
        let forecast_years: Vec<i32> = self
            .periods
            .forecast_indices()
            .map(|i| self.periods.periods()[i].year)
            .collect();

        let mut drivers: Vec<String> =
            names::COMPANY_DRIVERS.iter().map(|s| s.to_string()).collect();
        let mut anchors: Vec<String> =
            names::OPENING_BALANCES.iter().map(|s| s.to_string()).collect();
        for segment in &self.segments {
            drivers.extend(
                names::SEGMENT_DRIVERS
                    .iter()
                    .map(|d| names::segment_assumption(&segment.key, d)),
            );
            anchors.push(names::segment_assumption(&segment.key, names::SEG_REVENUE_ANCHOR));
        }

        for name in &drivers {
            match self.assumptions.get(name).and_then(|a| a.scenario.as_ref()) {
                None => problems.push(format!("missing driver {}", name)),
                Some(values) => {
                    for scenario in Scenario::ALL {
                        let schedule = values.get(scenario);
                        let gap = forecast_years.iter().find(|&&y| schedule.value_for(y).is_none());
                        if let Some(year) = gap {
                            problems
                                .push(format!("{} has no {} value for {}", name, scenario, year));
                        }
                    }
                }
            }
        }

        // A year override outside the forecast range would never be read
        for assumption in self.assumptions.values() {
            let Some(values) = &assumption.scenario else {
                continue;
            };
            let stray: BTreeSet<i32> = Scenario::ALL
                .iter()
                .flat_map(|&s| values.get(s).by_year.keys().copied())
                .filter(|y| !forecast_years.contains(y))
                .collect();
            if let Some(year) = stray.first() {
                problems.push(format!(
                    "{} has a forecast value for {}, which is not a forecast year",
                    assumption.name, year
                ));
            }
        }

        for name in &anchors {
            let reported = self
                .assumptions
                .get(name)
                .map(|a| a.historical.contains_key(&last_hist_year))
                .unwrap_or(false);
            if !reported {
                problems.push(format!("{} has no reported value for {}", name, last_hist_year));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ModelError::InvalidAssumptionTable(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_override() {
        let mut schedule = Schedule::constant(0.1);
        schedule.by_year.insert(2026, 0.2);
        assert_eq!(schedule.value_for(2025), Some(0.1));
        assert_eq!(schedule.value_for(2026), Some(0.2));
    }

    #[test]
    fn test_resolve_uses_anchors_then_scenario() {
        let mut table = AssumptionTable::new("USD millions", PeriodRange::new(2023, 2, 2), vec![]);
        table.insert(
            Assumption::driver("tax_rate", Unit::Percent, 0.25, 0.2, 0.3)
                .with_history(&[(2024, 0.22)]),
        );

        let base = table.resolve(Scenario::Base);
        let bear = table.resolve(Scenario::Bear);

        assert_eq!(base.values("tax_rate").unwrap(), &[None, Some(0.22), Some(0.25), Some(0.25)]);
        assert_eq!(bear.values("tax_rate").unwrap(), &[None, Some(0.22), Some(0.3), Some(0.3)]);
    }

    #[test]
    fn test_default_table_is_valid() {
        assert!(AssumptionTable::default_table().validate().is_ok());
    }

    #[test]
    fn test_missing_driver_rejected() {
        let mut table = AssumptionTable::default_table();
        table.assumptions.remove("wacc");
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("missing driver wacc"), "{}", err);
    }

    #[test]
    fn test_duplicate_segment_key_rejected() {
        let mut table = AssumptionTable::default_table();
        table.segments.push(Segment::new("a", "Software again"));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidAssumptionTable(_)));
        assert!(err.to_string().contains("duplicate segment key a"), "{}", err);
    }

    #[test]
    fn test_empty_segment_key_rejected() {
        let mut table = AssumptionTable::default_table();
        table.segments.push(Segment::new("  ", "Unnamed"));
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("empty key"), "{}", err);
    }

    #[test]
    fn test_override_outside_forecast_rejected() {
        let mut table = AssumptionTable::default_table();
        let last_year = table.periods.periods().last().unwrap().year;
        table
            .get_mut("wacc")
            .unwrap()
            .scenario
            .as_mut()
            .unwrap()
            .bull
            .by_year
            .insert(last_year + 1, 0.2);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("not a forecast year"), "{}", err);
        let expected = format!("wacc has a forecast value for {}", last_year + 1);
        assert!(err.to_string().contains(&expected), "{}", err);
    }

    #[test]
    fn test_missing_opening_balance_rejected() {
        let mut table = AssumptionTable::default_table();
        table.get_mut("cash").unwrap().historical.clear();
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("cash has no reported value"), "{}", err);
    }

    #[test]
    fn test_set_scenario_value() {
        let mut table = AssumptionTable::default_table();
        table.set_scenario_value("wacc", Scenario::Bear, 0.11).unwrap();
        let resolved = table.resolve(Scenario::Bear);
        let idx = table.periods.first_forecast_index().unwrap();
        assert_eq!(resolved.values("wacc").unwrap()[idx], Some(0.11));
        assert!(table.set_scenario_value("nope", Scenario::Base, 1.0).is_err());
    }
}
