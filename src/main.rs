//! Rate-shock risk CLI
//!
//! Runs the collapse/REHI pipeline over an institution CSV and writes the
//! result tables

use anyhow::Context;
use clap::Parser;
use rate_shock_risk::{
    export::write_csv_path,
    institution::{load_institutions, load_sample, validate_all},
    JoinPolicy, PipelineConfig, PipelineOutput, RiskError, RiskPipeline,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "rate_shock_risk",
    version,
    about = "Collapse probability and REHI under interest-rate shocks"
)]
struct Cli {
    /// Institution CSV (defaults to the bundled sample)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// JSON config file, applied before environment overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Largest shock, in percentage points
    #[arg(long)]
    max_shock: Option<f64>,

    /// Grid spacing, in percentage points
    #[arg(long)]
    step: Option<f64>,

    /// Default attributes for unmatched institutions instead of failing
    #[arg(long)]
    left_join: bool,

    /// Evaluate institutions in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the aggregate collapse table here
    #[arg(long)]
    agg_out: Option<PathBuf>,

    /// Write per-institution REHI here
    #[arg(long)]
    rehi_out: Option<PathBuf>,

    /// Write regional REHI here
    #[arg(long)]
    regional_out: Option<PathBuf>,

    /// Print a per-institution snapshot at this shock
    #[arg(long)]
    snapshot_shock: Option<f64>,

    /// Snapshot flag threshold on collapse probability
    #[arg(long)]
    redline: Option<f64>,

    /// Print results as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    config: &'a PipelineConfig,
    institution_count: usize,
    #[serde(flatten)]
    output: &'a PipelineOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<Vec<rate_shock_risk::InstitutionSnapshot>>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let kind = err
            .downcast_ref::<RiskError>()
            .map(RiskError::kind)
            .unwrap_or("Error");
        eprintln!("{}: {:#}", kind, err);
        process::exit(1);
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    }
    .with_env()?;

    if let Some(v) = cli.max_shock {
        config.max_shock = v;
    }
    if let Some(v) = cli.step {
        config.step = v;
    }
    if let Some(v) = cli.redline {
        config.redline = v;
    }
    if cli.left_join {
        config.join_policy = JoinPolicy::Left;
    }
    if cli.parallel {
        config.parallel = true;
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let pipeline = RiskPipeline::new(config)?;

    let records = match &cli.input {
        Some(path) => load_institutions(path)
            .with_context(|| format!("loading institutions from {}", path.display()))?,
        None => {
            log::info!("no --input given, using bundled sample");
            load_sample()?
        }
    };
    let institutions = validate_all(&records)?;
    let output = pipeline.run_institutions(&institutions)?;

    let snapshot = match cli.snapshot_shock {
        Some(shock) => Some(pipeline.snapshot(&institutions, shock)?),
        None => None,
    };

    if let Some(path) = &cli.agg_out {
        write_csv_path(path, &output.aggregate)?;
    }
    if let Some(path) = &cli.rehi_out {
        write_csv_path(path, &output.rehi)?;
    }
    if let Some(path) = &cli.regional_out {
        write_csv_path(path, &output.regional)?;
    }

    if cli.json {
        let report = JsonReport {
            config: pipeline.config(),
            institution_count: institutions.len(),
            output: &output,
            snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Rate-shock risk v{}", env!("CARGO_PKG_VERSION"));
    println!("Institutions: {}  Shocks: {}\n", institutions.len(), output.shocks.len());

    println!("Aggregate collapse probability (holdings-weighted):");
    println!("{:>8} {:>10} {:>10}", "Shock%", "No TLI", "With TLI");
    println!("{}", "-".repeat(30));
    for row in &output.aggregate {
        println!(
            "{:>8.2} {:>10.4} {:>10.4}",
            row.rate_shock, row.no_tli_collapse_probability, row.with_tli_collapse_probability
        );
    }

    println!("\nREHI by region (asset-weighted):");
    println!("{:<16} {:>8} {:>8}", "Region", "Shock%", "REHI");
    println!("{}", "-".repeat(34));
    for row in &output.regional {
        println!("{:<16} {:>8.2} {:>8.2}", row.region, row.rate_shock, row.rehi_region);
    }

    if let Some(snapshot) = snapshot {
        println!("\nSnapshot (redline {:.2}):", pipeline.config().redline);
        println!("{:<20} {:<12} {:>8} {:>8} {:>6}", "Name", "Region", "P(TLI)", "REHI", "Flag");
        println!("{}", "-".repeat(58));
        for row in &snapshot {
            println!(
                "{:<20} {:<12} {:>8.3} {:>8.1} {:>6}",
                row.name,
                row.region,
                row.collapse_probability,
                row.rehi,
                if row.breaches_redline { "!!" } else { "" }
            );
        }
    }

    Ok(())
}
