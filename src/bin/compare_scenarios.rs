//! Run Base, Bull and Bear side by side and print the key outputs
//!
//! Usage: cargo run --bin compare_scenarios -- [--assumptions DIR] [--output FILE]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use ib_model::model::{names, Unit, Value};
use ib_model::{AssumptionTable, ModelConfig, ModelEngine, ModelRun, ScenarioRunner};

/// Compare headline outputs across scenarios
#[derive(Parser, Debug)]
#[command(name = "compare_scenarios")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory of assumption CSV files (built-in table when omitted)
    #[arg(short, long, value_name = "DIR")]
    assumptions: Option<PathBuf>,

    /// Also write the comparison as CSV
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Discount cash flows from mid-year
    #[arg(long)]
    mid_year: bool,
}

/// One comparison row: label, unit and how to read it from a run
struct Metric {
    label: &'static str,
    unit: Unit,
    read: fn(&ModelRun) -> Value,
}

fn metric(label: &'static str, unit: Unit, read: fn(&ModelRun) -> Value) -> Metric {
    Metric { label, unit, read }
}

fn metrics() -> Vec<Metric> {
    vec![
        metric("Exit revenue", Unit::Money, |r| r.exit_value(names::PL_REVENUE)),
        metric("Exit EBITDA", Unit::Money, |r| r.exit_value(names::PL_EBITDA)),
        metric("Exit EBIT margin", Unit::Percent, |r| {
            r.exit_value(names::RATIO_EBIT_MARGIN)
        }),
        metric("Exit net income", Unit::Money, |r| r.exit_value(names::PL_NET_INCOME)),
        metric("Exit net debt / EBITDA", Unit::Multiple, |r| {
            r.exit_value(names::RATIO_NET_DEBT_TO_EBITDA)
        }),
        metric("WACC", Unit::Percent, |r| r.scalar_value(names::DCF_WACC)),
        metric("Terminal growth", Unit::Percent, |r| {
            r.scalar_value(names::DCF_TERMINAL_GROWTH)
        }),
        metric("Enterprise value", Unit::Money, |r| r.enterprise_value()),
        metric("Equity value", Unit::Money, |r| r.scalar_value(names::DCF_EQUITY_VALUE)),
        metric("Value per share", Unit::PerShare, |r| r.value_per_share()),
        metric("Implied EV / EBITDA", Unit::Multiple, |r| {
            r.scalar_value(names::RATIO_IMPLIED_EV_EBITDA)
        }),
    ]
}

fn write_csv(path: &Path, runs: &[ModelRun], metrics: &[Metric]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["metric".to_string()];
    header.extend(runs.iter().map(|r| r.scenario().to_string()));
    writer.write_record(&header)?;

    for metric in metrics {
        let mut record = vec![metric.label.to_string()];
        record.extend(runs.iter().map(|r| metric.unit.format((metric.read)(r))));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ModelConfig {
        mid_year_convention: args.mid_year,
        ..ModelConfig::default()
    };
    let runner = match &args.assumptions {
        Some(dir) => ScenarioRunner::from_csv_path(dir, config)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => {
            let engine = ModelEngine::new(AssumptionTable::default_table(), config);
            ScenarioRunner::with_engine(engine)
        }
    };

    let start = Instant::now();
    let runs = runner.run_all()?;
    println!("Ran {} scenarios in {:?}\n", runs.len(), start.elapsed());

    let metrics = metrics();
    print!("{:<26}", "");
    for run in &runs {
        print!("{:>14}", run.scenario());
    }
    println!();
    println!("{}", "-".repeat(26 + 14 * runs.len()));
    for metric in &metrics {
        print!("{:<26}", metric.label);
        for run in &runs {
            print!("{:>14}", metric.unit.format((metric.read)(run)));
        }
        println!();
    }

    println!();
    for run in &runs {
        let failed: Vec<&str> = run.failed_checks().map(|c| c.name.as_str()).collect();
        if failed.is_empty() {
            println!("{}: all consistency checks passed", run.scenario());
        } else {
            println!("{}: FAILED {}", run.scenario(), failed.join(", "));
        }
    }

    if let Some(path) = &args.output {
        write_csv(path, &runs, &metrics)?;
        println!("\nComparison written to: {}", path.display());
    }

    std::io::stdout().flush()?;
    Ok(())
}
