//! Built-in assumption table
//!
//! Three segments, FY2022-FY2024 actuals and a five-year forecast, in USD
//! millions. The reported balance sheets balance exactly so that a run on
//! this table passes every consistency check.

use super::periods::PeriodRange;
use super::table::{Assumption, AssumptionTable, Segment};
use crate::model::{names, Unit};

const FIRST_YEAR: i32 = 2022;
const HISTORICAL_YEARS: usize = 3;
const FORECAST_YEARS: usize = 5;
const FIRST_FORECAST_YEAR: i32 = FIRST_YEAR + HISTORICAL_YEARS as i32;

fn history(values: [f64; HISTORICAL_YEARS]) -> Vec<(i32, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (FIRST_YEAR + i as i32, v))
        .collect()
}

/// Per-segment inputs: reported revenue and cost ratios, then forecast
/// drivers as (base, bull, bear)
struct SegmentDefaults {
    key: &'static str,
    name: &'static str,
    revenue: [f64; HISTORICAL_YEARS],
    growth: (f64, f64, f64),
    cogs_hist: f64,
    cogs: (f64, f64, f64),
    opex_hist: f64,
    opex: (f64, f64, f64),
    da: f64,
}

const SEGMENTS: [SegmentDefaults; 3] = [
    SegmentDefaults {
        key: "a",
        name: "Software",
        revenue: [400.0, 450.0, 500.0],
        growth: (0.12, 0.16, 0.06),
        cogs_hist: 0.30,
        cogs: (0.30, 0.29, 0.32),
        opex_hist: 0.35,
        opex: (0.34, 0.33, 0.36),
        da: 0.05,
    },
    SegmentDefaults {
        key: "b",
        name: "Services",
        revenue: [300.0, 315.0, 330.0],
        growth: (0.05, 0.08, 0.01),
        cogs_hist: 0.55,
        cogs: (0.55, 0.54, 0.57),
        opex_hist: 0.20,
        opex: (0.20, 0.19, 0.21),
        da: 0.04,
    },
    SegmentDefaults {
        key: "c",
        name: "Hardware",
        revenue: [200.0, 198.0, 200.0],
        growth: (0.02, 0.04, -0.03),
        cogs_hist: 0.65,
        cogs: (0.65, 0.64, 0.67),
        opex_hist: 0.15,
        opex: (0.15, 0.15, 0.16),
        da: 0.06,
    },
];

impl AssumptionTable {
    /// Built-in table used when no assumption directory is given
    pub fn default_table() -> Self {
        let segments = SEGMENTS.iter().map(|s| Segment::new(s.key, s.name)).collect();
        let mut table = AssumptionTable::new(
            "USD millions",
            PeriodRange::new(FIRST_YEAR, HISTORICAL_YEARS, FORECAST_YEARS),
            segments,
        );

        for s in &SEGMENTS {
            let name = |driver: &str| names::segment_assumption(s.key, driver);

            table.insert(
                Assumption::anchor(
                    name(names::SEG_REVENUE_ANCHOR),
                    Unit::Money,
                    &history(s.revenue),
                )
                .with_note("Reported segment revenue"),
            );
            table.insert(
                Assumption::driver(
                    name(names::SEG_REVENUE_GROWTH),
                    Unit::Percent,
                    s.growth.0,
                    s.growth.1,
                    s.growth.2,
                )
                .with_note("Annual revenue growth"),
            );
            table.insert(
                Assumption::driver(
                    name(names::SEG_COGS_PCT),
                    Unit::Percent,
                    s.cogs.0,
                    s.cogs.1,
                    s.cogs.2,
                )
                .with_history(&history([s.cogs_hist; HISTORICAL_YEARS]))
                .with_note("Cost of goods sold as % of segment revenue"),
            );
            table.insert(
                Assumption::driver(
                    name(names::SEG_OPEX_PCT),
                    Unit::Percent,
                    s.opex.0,
                    s.opex.1,
                    s.opex.2,
                )
                .with_history(&history([s.opex_hist; HISTORICAL_YEARS]))
                .with_note("Operating expenses as % of segment revenue"),
            );
            table.insert(
                Assumption::driver(name(names::SEG_DA_PCT), Unit::Percent, s.da, s.da, s.da)
                    .with_history(&history([s.da; HISTORICAL_YEARS]))
                    .with_note("Depreciation & amortisation as % of segment revenue"),
            );
        }

        table.insert(
            Assumption::driver(names::TAX_RATE, Unit::Percent, 0.25, 0.25, 0.25)
                .with_history(&history([0.25; HISTORICAL_YEARS])),
        );
        table.insert(
            Assumption::driver(names::INTEREST_RATE, Unit::Percent, 0.05, 0.05, 0.06)
                .with_history(&history([0.05; HISTORICAL_YEARS]))
                .with_note("Charged on average debt"),
        );
        table.insert(
            Assumption::driver(names::PAYOUT_RATIO, Unit::Percent, 0.30, 0.30, 0.30)
                .with_history(&history([0.30; HISTORICAL_YEARS])),
        );
        table.insert(Assumption::driver(names::DSO, Unit::Days, 45.0, 42.0, 50.0));
        table.insert(Assumption::driver(names::DIO, Unit::Days, 60.0, 55.0, 65.0));
        table.insert(Assumption::driver(names::DPO, Unit::Days, 40.0, 40.0, 38.0));
        table.insert(
            Assumption::schedule(
                names::CAPEX,
                Unit::Money,
                FIRST_FORECAST_YEAR,
                &[60.0, 65.0, 70.0, 75.0, 80.0],
                &[70.0, 75.0, 80.0, 85.0, 90.0],
                &[50.0, 50.0, 55.0, 55.0, 60.0],
            )
            .with_history(&history([50.0, 55.0, 58.0]))
            .with_note("Capital expenditure programme"),
        );
        table.insert(Assumption::driver(names::DEBT_ISSUANCE, Unit::Money, 0.0, 0.0, 0.0));
        table.insert(
            Assumption::driver(names::DEBT_REPAYMENT, Unit::Money, 20.0, 30.0, 10.0)
                .with_note("Scheduled amortisation of term debt"),
        );
        table.insert(Assumption::driver(names::WACC, Unit::Percent, 0.09, 0.085, 0.10));
        table.insert(Assumption::driver(names::TERMINAL_GROWTH, Unit::Percent, 0.03, 0.035, 0.02));
        table.insert(
            Assumption::driver(names::SHARES_OUTSTANDING, Unit::Count, 100.0, 100.0, 100.0)
                .with_history(&history([100.0; HISTORICAL_YEARS]))
                .with_note("Diluted shares, millions"),
        );

        // Reported balance sheets: assets == liabilities + equity in each year
        for (name, reported) in [
            (names::CASH, [100.0, 110.0, 120.0]),
            (names::ACCOUNTS_RECEIVABLE, [110.0, 120.0, 150.0]),
            (names::INVENTORY, [80.0, 85.0, 90.0]),
            (names::PPE, [540.0, 570.0, 600.0]),
            (names::ACCOUNTS_PAYABLE, [70.0, 75.0, 80.0]),
            (names::DEBT, [340.0, 320.0, 300.0]),
            (names::EQUITY, [420.0, 490.0, 580.0]),
        ] {
            table.insert(Assumption::anchor(name, Unit::Money, &history(reported)));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_default_periods() {
        let table = AssumptionTable::default_table();
        assert_eq!(table.periods.len(), 8);
        assert_eq!(table.periods.labels()[0], "FY2022A");
        assert_eq!(table.periods.labels()[7], "FY2029E");
        assert_eq!(table.segments.len(), 3);
    }

    #[test]
    fn test_base_scenario_headline_drivers() {
        let resolved = AssumptionTable::default_table().resolve(Scenario::Base);
        let idx = resolved.periods.first_forecast_index().unwrap();

        assert_eq!(resolved.values("wacc").unwrap()[idx], Some(0.09));
        assert_eq!(resolved.values("terminal_growth").unwrap()[idx], Some(0.03));
        assert_eq!(resolved.values("a.revenue_growth").unwrap()[idx], Some(0.12));
    }

    #[test]
    fn test_capex_schedule_by_year() {
        let resolved = AssumptionTable::default_table().resolve(Scenario::Bull);
        let capex = resolved.values("capex").unwrap();
        assert_eq!(capex[2], Some(58.0)); // FY2024A reported
        assert_eq!(capex[3], Some(70.0));
        assert_eq!(capex[7], Some(90.0));
    }
}
