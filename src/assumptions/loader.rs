//! CSV-based assumption loader
//!
//! Loads an assumption table from CSV files in data/assumptions/:
//! - `settings.csv`   key,value (`unit`, `forecast_years`)
//! - `segments.csv`   key,name
//! - `drivers.csv`    name,year,base,bull,bear,unit,note
//!   (blank year = every forecast year; a year row overrides that year)
//! - `historical.csv` name,year,value,unit

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use csv::Reader;
use log::debug;

use super::periods::PeriodRange;
use super::table::{Assumption, AssumptionTable, ScenarioValues, Segment};
use crate::error::{ModelError, ModelResult};
use crate::model::Unit;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

fn load_err(path: &Path, reason: impl Display) -> ModelError {
    ModelError::AssumptionLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn open(path: &Path) -> ModelResult<Reader<std::fs::File>> {
    Reader::from_path(path).map_err(|e| load_err(path, e))
}

fn parse_unit(path: &Path, unit: Option<&str>) -> ModelResult<Option<Unit>> {
    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        None => Ok(None),
        Some(u) => Unit::parse(u)
            .map(Some)
            .ok_or_else(|| load_err(path, format!("unknown unit {:?}", u))),
    }
}

#[derive(Debug, serde::Deserialize)]
struct SettingRow {
    key: String,
    value: String,
}

#[derive(Debug, serde::Deserialize)]
struct SegmentRow {
    key: String,
    name: String,
}

#[derive(Debug, serde::Deserialize)]
struct DriverRow {
    name: String,
    year: Option<i32>,
    base: f64,
    bull: f64,
    bear: f64,
    unit: Option<String>,
    note: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct HistoricalRow {
    name: String,
    year: i32,
    value: f64,
    unit: Option<String>,
}

/// Model-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub unit_label: String,
    pub forecast_years: usize,
}

/// Load settings from `settings.csv`
pub fn load_settings(dir: &Path) -> ModelResult<Settings> {
    let path = dir.join("settings.csv");
    let mut reader = open(&path)?;
    let mut values = BTreeMap::new();

    for result in reader.deserialize() {
        let row: SettingRow = result.map_err(|e| load_err(&path, e))?;
        values.insert(row.key.trim().to_string(), row.value.trim().to_string());
    }

    let unit_label = values
        .get("unit")
        .cloned()
        .ok_or_else(|| load_err(&path, "missing setting: unit"))?;
    let forecast_years = values
        .get("forecast_years")
        .ok_or_else(|| load_err(&path, "missing setting: forecast_years"))?
        .parse()
        .map_err(|e| load_err(&path, format!("forecast_years: {}", e)))?;

    Ok(Settings {
        unit_label,
        forecast_years,
    })
}

/// Load segment definitions from `segments.csv`, in file order
pub fn load_segments(dir: &Path) -> ModelResult<Vec<Segment>> {
    let path = dir.join("segments.csv");
    let mut reader = open(&path)?;
    let mut segments = Vec::new();

    for result in reader.deserialize() {
        let row: SegmentRow = result.map_err(|e| load_err(&path, e))?;
        segments.push(Segment::new(row.key.trim(), row.name.trim()));
    }

    Ok(segments)
}

/// Load forecast drivers from `drivers.csv`
pub fn load_drivers(dir: &Path) -> ModelResult<BTreeMap<String, Assumption>> {
    let path = dir.join("drivers.csv");
    let mut reader = open(&path)?;
    let mut drivers: BTreeMap<String, Assumption> = BTreeMap::new();

    for result in reader.deserialize() {
        let row: DriverRow = result.map_err(|e| load_err(&path, e))?;
        let unit = parse_unit(&path, row.unit.as_deref())?;
        let name = row.name.trim().to_string();

        let entry = drivers.entry(name.clone()).or_insert_with(|| Assumption {
            name,
            unit: Unit::Money,
            note: None,
            scenario: Some(ScenarioValues::default()),
            historical: BTreeMap::new(),
        });
        if let Some(unit) = unit {
            entry.unit = unit;
        }
        if let Some(note) = row.note.filter(|n| !n.trim().is_empty()) {
            entry.note = Some(note.trim().to_string());
        }

        let values = entry.scenario.get_or_insert_with(ScenarioValues::default);
        for (schedule, value) in [
            (&mut values.base, row.base),
            (&mut values.bull, row.bull),
            (&mut values.bear, row.bear),
        ] {
            match row.year {
                Some(year) => {
                    schedule.by_year.insert(year, value);
                }
                None => schedule.default = Some(value),
            }
        }
    }

    Ok(drivers)
}

/// Load reported values from `historical.csv`
pub fn load_historical(dir: &Path) -> ModelResult<Vec<(String, i32, f64, Option<Unit>)>> {
    let path = dir.join("historical.csv");
    let mut reader = open(&path)?;
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: HistoricalRow = result.map_err(|e| load_err(&path, e))?;
        let unit = parse_unit(&path, row.unit.as_deref())?;
        rows.push((row.name.trim().to_string(), row.year, row.value, unit));
    }

    Ok(rows)
}

/// Load and validate a complete table from a directory
pub fn load_table(dir: &Path) -> ModelResult<AssumptionTable> {
    let settings = load_settings(dir)?;
    let segments = load_segments(dir)?;
    let mut assumptions = load_drivers(dir)?;
    let historical = load_historical(dir)?;

    let first_year = historical.iter().map(|(_, y, _, _)| *y).min();
    let last_year = historical.iter().map(|(_, y, _, _)| *y).max();
    let (Some(first_year), Some(last_year)) = (first_year, last_year) else {
        return Err(load_err(&dir.join("historical.csv"), "no reported values"));
    };

    for (name, year, value, unit) in historical {
        let entry = assumptions
            .entry(name.clone())
            .or_insert_with(|| Assumption::anchor(name, unit.unwrap_or(Unit::Money), &[]));
        entry.historical.insert(year, value);
    }

    let periods = PeriodRange::new(
        first_year,
        (last_year - first_year + 1) as usize,
        settings.forecast_years,
    );
    let mut table = AssumptionTable::new(settings.unit_label, periods, segments);
    for assumption in assumptions.into_values() {
        table.insert(assumption);
    }

    debug!(
        "Loaded {} assumptions, {} segments from {}",
        table.len(),
        table.segments.len(),
        dir.display()
    );

    table.validate()?;
    Ok(table)
}

impl AssumptionTable {
    /// Load from the default location (data/assumptions/)
    pub fn from_csv() -> ModelResult<Self> {
        Self::from_csv_path(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> ModelResult<Self> {
        load_table(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    fn data_dir() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_ASSUMPTIONS_PATH)
    }

    #[test]
    fn test_load_default_assumptions() {
        let result = AssumptionTable::from_csv_path(&data_dir());
        assert!(result.is_ok(), "Failed to load assumptions: {:?}", result.err());

        let table = result.unwrap();
        assert_eq!(table.unit_label, "USD millions");
        assert_eq!(table.segments.len(), 3);
        assert_eq!(table.periods.historical_count(), 3);
        assert_eq!(table.periods.forecast_count(), 5);
    }

    #[test]
    fn test_shipped_files_match_builtin_table() {
        let loaded = AssumptionTable::from_csv_path(&data_dir()).unwrap();
        let builtin = AssumptionTable::default_table();

        for scenario in Scenario::ALL {
            let a = loaded.resolve(scenario);
            let b = builtin.resolve(scenario);
            for assumption in b.iter() {
                assert_eq!(
                    a.values(&assumption.name),
                    Some(assumption.values.as_slice()),
                    "{} differs in {}",
                    assumption.name,
                    scenario
                );
            }
        }
    }

    /// Copy of the shipped files with one file replaced
    fn dir_with(test: &str, file: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ib_model_{}_{}", test, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["settings.csv", "segments.csv", "drivers.csv", "historical.csv"] {
            std::fs::copy(data_dir().join(name), dir.join(name)).unwrap();
        }
        std::fs::write(dir.join(file), contents).unwrap();
        dir
    }

    fn shipped(file: &str) -> String {
        std::fs::read_to_string(data_dir().join(file)).unwrap()
    }

    #[test]
    fn test_unknown_unit() {
        let drivers = format!("{}wacc,,0.09,0.085,0.1,furlongs,\n", shipped("drivers.csv"));
        let dir = dir_with("unknown_unit", "drivers.csv", &drivers);
        let err = AssumptionTable::from_csv_path(&dir).unwrap_err();
        assert!(matches!(err, ModelError::AssumptionLoad { .. }));
        assert!(err.to_string().contains("unknown unit \"furlongs\""), "{}", err);
    }

    #[test]
    fn test_malformed_row() {
        let bad_row = "tax_rate,,not-a-number,0.2,0.3,percent,\n";
        let drivers = format!("{}{}", shipped("drivers.csv"), bad_row);
        let dir = dir_with("malformed_row", "drivers.csv", &drivers);
        let err = AssumptionTable::from_csv_path(&dir).unwrap_err();
        match err {
            ModelError::AssumptionLoad { path, .. } => {
                assert!(path.ends_with("drivers.csv"), "{}", path)
            }
            other => panic!("expected a load error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_setting() {
        let dir = dir_with("missing_setting", "settings.csv", "key,value\nunit,USD millions\n");
        let err = AssumptionTable::from_csv_path(&dir).unwrap_err();
        assert!(err.to_string().contains("missing setting: forecast_years"), "{}", err);
    }

    #[test]
    fn test_repeated_segment_key() {
        let segments = format!("{}a,Software again\n", shipped("segments.csv"));
        let dir = dir_with("repeated_segment", "segments.csv", &segments);
        let err = AssumptionTable::from_csv_path(&dir).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAssumptionTable(_)));
        assert!(err.to_string().contains("duplicate segment key a"), "{}", err);
    }

    #[test]
    fn test_override_year_outside_forecast() {
        let drivers = format!("{}capex,2031,90,95,60,money,\n", shipped("drivers.csv"));
        let dir = dir_with("stray_year", "drivers.csv", &drivers);
        let err = AssumptionTable::from_csv_path(&dir).unwrap_err();
        assert!(err.to_string().contains("capex has a forecast value for 2031"), "{}", err);
    }

    #[test]
    fn test_missing_directory() {
        let err =
            AssumptionTable::from_csv_path(Path::new("/nonexistent/assumptions")).unwrap_err();
        assert!(matches!(err, ModelError::AssumptionLoad { .. }));
    }
}
