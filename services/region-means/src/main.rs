//! Region means command line service.
//!
//! Loads the scenario fields and region table named by a dataset config,
//! then answers mean queries and prints the results as JSON.

mod config_loader;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use region_stats::{ColumnKey, RegionMeanCache};
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config_loader::load_dataset_config;

#[derive(Parser, Debug)]
#[command(name = "region-means")]
#[command(about = "Per-region mean temperatures for climate scenarios")]
struct Args {
    /// Dataset configuration file path
    #[arg(short, long, env = "REGION_MEANS_CONFIG")]
    config: PathBuf,

    /// Worker threads for column batches (overrides the config file)
    #[arg(long)]
    workers: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mean of one region for one scenario and year
    Mean {
        #[arg(long)]
        region: String,
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        year: i32,
    },
    /// Means of every region for one scenario and year
    Column {
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        year: i32,
    },
    /// Several columns given as "<scenario>,<year>" references
    Columns {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Years available for a scenario
    Years {
        #[arg(long)]
        scenario: String,
    },
    /// Region codes, names, areas and centroids
    Regions,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(config = ?args.config, "Starting region means");

    let mut config = load_dataset_config(&args.config)?;
    if let Some(workers) = args.workers {
        config.stats.workers = workers;
    }
    info!(
        scenarios = ?config.scenarios.keys().collect::<Vec<_>>(),
        workers = config.stats.workers,
        diagnostics = config.stats.diagnostics.as_str(),
        "Loaded configuration"
    );

    let cache = RegionMeanCache::load(
        &config.field_source(),
        &config.region_source(),
        config.stats.clone(),
    )
    .context("Failed to load dataset")?;

    let output = execute(&cache, &args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    info!(stats = ?cache.stats(), "Done");
    Ok(())
}

/// Run one command against a loaded cache and build its JSON output.
fn execute(cache: &RegionMeanCache, command: &Command) -> Result<Value> {
    match command {
        Command::Mean {
            region,
            scenario,
            year,
        } => {
            let mean = cache
                .mean(region, scenario, *year)
                .with_context(|| format!("Mean of region {} for {},{}", region, scenario, year))?;
            Ok(json!({
                "region": region,
                "column": ColumnKey::new(scenario, *year).to_string(),
                "mean": mean,
            }))
        }
        Command::Column { scenario, year } => {
            let column = cache
                .compute_column(scenario, *year)
                .with_context(|| format!("Column {},{}", scenario, year))?;
            Ok(serde_json::to_value(&*column)?)
        }
        Command::Columns { keys } => {
            let mut out = BTreeMap::new();
            for raw in keys {
                let key: ColumnKey = raw.parse()?;
                let column = cache
                    .compute_column(key.scenario(), key.year())
                    .with_context(|| format!("Column {}", key))?;
                out.insert(key.to_string(), serde_json::to_value(&*column)?);
            }
            Ok(serde_json::to_value(out)?)
        }
        Command::Years { scenario } => Ok(json!(cache.years(scenario)?)),
        Command::Regions => Ok(serde_json::to_value(cache.regions())?),
    }
}
