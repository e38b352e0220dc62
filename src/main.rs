//! IB Model CLI
//!
//! Runs the model for one scenario, prints the headline figures and
//! optionally renders the full run to a file.
//!
//! Usage: ib_model --scenario bull --output out/bull.md

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use ib_model::model::{SensitivityConfig, Unit, DEFAULT_TOLERANCE};
use ib_model::render::{Renderer, RendererRegistry};
use ib_model::{AssumptionTable, ModelConfig, ModelEngine, ModelRun, Scenario};

/// Exit status when a consistency check fails under --strict
const CHECK_FAILURE_EXIT: u8 = 2;

/// Three-statement model with DCF valuation
#[derive(Parser, Debug)]
#[command(name = "ib_model")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario to run: base, bull or bear
    #[arg(short, long, default_value = "base")]
    scenario: String,

    /// Directory of assumption CSV files (built-in table when omitted)
    #[arg(short, long, value_name = "DIR")]
    assumptions: Option<PathBuf>,

    /// Write the rendered run to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format: md, csv or json (default: from the output extension)
    #[arg(short, long)]
    format: Option<String>,

    /// Largest deviation a consistency check accepts
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Discount cash flows from mid-year
    #[arg(long)]
    mid_year: bool,

    /// Sensitivity grid spacing for WACC and terminal growth
    #[arg(long, default_value_t = 0.005)]
    sensitivity_step: f64,

    /// Exit with status 2 when any consistency check fails
    #[arg(long)]
    strict: bool,
}

fn print_summary(run: &ModelRun) {
    let summary = run.summary();
    println!("{} scenario ({})", run.scenario(), run.unit_label());
    println!("{}", "=".repeat(40));
    println!("  Enterprise value:  {:>12}", Unit::Money.format(summary.enterprise_value));
    println!("  Equity value:      {:>12}", Unit::Money.format(summary.equity_value));
    println!("  Value per share:   {:>12}", Unit::PerShare.format(summary.value_per_share));
    println!("  WACC:              {:>12}", Unit::Percent.format(summary.wacc));
    println!("  Terminal growth:   {:>12}", Unit::Percent.format(summary.terminal_growth));
    println!("  Exit revenue:      {:>12}", Unit::Money.format(summary.exit_revenue));
    println!("  Exit EBIT margin:  {:>12}", Unit::Percent.format(summary.exit_ebit_margin));
    println!();
    println!("Consistency checks ({}/{} passed):", summary.checks_passed, summary.checks_total);
    for check in run.checks() {
        println!(
            "  [{}] {:<30} delta {:>12.6}",
            if check.passed { "PASS" } else { "FAIL" },
            check.name,
            check.delta
        );
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let scenario: Scenario = args.scenario.parse()?;
    let table = match &args.assumptions {
        Some(dir) => AssumptionTable::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => AssumptionTable::default_table(),
    };
    let config = ModelConfig {
        tolerance: args.tolerance,
        mid_year_convention: args.mid_year,
        sensitivity: SensitivityConfig {
            wacc_step: args.sensitivity_step,
            growth_step: args.sensitivity_step,
            ..SensitivityConfig::default()
        },
        ..ModelConfig::default()
    };

    let engine = ModelEngine::try_new(table, config)?;
    let run = engine
        .run_model(scenario)
        .with_context(|| format!("running {} scenario", scenario))?;
    print_summary(&run);

    let registry = RendererRegistry::default();
    let renderer: Option<&dyn Renderer> = match (&args.format, &args.output) {
        (Some(format), _) => Some(registry.find(format)?),
        (None, Some(path)) => Some(registry.find_for_path(path)?),
        (None, None) => None,
    };
    if let Some(renderer) = renderer {
        let rendered = renderer.render(&run)?;
        match &args.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                fs::write(path, &rendered.bytes)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("\n{} output written to: {}", rendered.format, path.display());
            }
            None => {
                println!();
                std::io::stdout().write_all(&rendered.bytes)?;
            }
        }
    }

    if args.strict && !run.all_checks_passed() {
        eprintln!("{} consistency check(s) failed", run.failed_checks().count());
        return Ok(ExitCode::from(CHECK_FAILURE_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}
