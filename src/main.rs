use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::error;

use fluxbound::analysis::{analyze_csv, Analysis};
use fluxbound::chart::write_svg;
use fluxbound::config::AppConfig;
use fluxbound::logging::{self, LoggingError};
use fluxbound::regression::AnalysisParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Fit Ele.Flow against F.S.Flux and report the F.S.Flux range whose
/// prediction interval stays within the Ele.Flow limits.
#[derive(Debug, Parser)]
#[command(name = "fluxbound", version, about)]
struct Cli {
    /// CSV file with "F.S.Flux" and "Ele.Flow" columns
    input: PathBuf,

    /// Lower Ele.Flow limit
    #[arg(long, env = "FLUXBOUND_MIN_ELE_FLOW")]
    min_ele_flow: Option<f64>,

    /// Upper Ele.Flow limit
    #[arg(long, env = "FLUXBOUND_MAX_ELE_FLOW")]
    max_ele_flow: Option<f64>,

    /// Prediction interval in percent, exclusive (0, 100)
    #[arg(long = "interval")]
    prediction_interval_pct: Option<f64>,

    /// Write the chart as SVG to this path
    #[arg(long)]
    chart: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    match logging::init(&level) {
        Ok(()) | Err(LoggingError::AlreadyInitialized) => {}
        Err(e) => return Err(e).context("configuring logging"),
    }

    if let Some(pct) = cli.prediction_interval_pct {
        config.analysis.prediction_interval_pct = pct;
    }
    if let Some(min) = cli.min_ele_flow {
        config.analysis.min_ele_flow = Some(min);
    }
    if let Some(max) = cli.max_ele_flow {
        config.analysis.max_ele_flow = Some(max);
    }
    if cli.chart.is_some() {
        config.chart.output = cli.chart.clone();
    }

    let params: AnalysisParams = match config.analysis.params() {
        Some(params) => params,
        None => bail!("both --min-ele-flow and --max-ele-flow are required"),
    };

    let analysis = analyze_csv(&cli.input, &params)
        .with_context(|| format!("analyzing {}", cli.input.display()))?;

    match cli.format {
        OutputFormat::Text => print_text(&analysis),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis.report())?),
    }

    if let Some(path) = &config.chart.output {
        write_svg(&analysis, &config.chart, path)
            .with_context(|| format!("writing chart to {}", path.display()))?;
    }

    Ok(())
}

fn print_text(analysis: &Analysis) {
    let result = &analysis.result;
    println!("Regression: y = {:.3}x {:+.3}", result.slope, result.intercept);
    println!("R^2: {:.3}", result.r_squared);
    println!("min_intersection: {:.3}", result.min_intersection);
    println!("max_intersection: {:.3}", result.max_intersection);
    let outside = analysis.outside_interval_count();
    if outside > 0 {
        println!(
            "{} of {} observations lie outside the {}% prediction interval",
            outside,
            analysis.observations.len(),
            analysis.params.prediction_interval_pct
        );
    }
    if !result.intersection().is_finite() {
        println!("No valid F.S.Flux range for these bounds");
    }
}
