//! Parcel delineation tool: reads a JSON scenario (cultivable mask, region
//! grid, study area, agent table), grows one parcel per agent region by
//! region, and writes the renumbered parcel grid plus the id remap as JSON.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use parcel_core::{CutPolicy, DelineationParams, RegionDriver, Scenario};
use tracing::info;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CutArg {
    Majority,
    AnyCell,
}

impl From<CutArg> for CutPolicy {
    fn from(c: CutArg) -> Self {
        match c {
            CutArg::Majority => CutPolicy::Majority,
            CutArg::AnyCell => CutPolicy::AnyCell,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "delineate", about = "Partition cultivable land into one parcel per farming agent")]
struct Args {
    /// Scenario JSON (cultivable, optional regions and study_area, agents).
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the delineation JSON.
    #[arg(short, long, default_value = "parcels.json")]
    output: PathBuf,

    /// Parameter JSON; fields left out keep their defaults.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Override the random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the study-area cut policy.
    #[arg(long, value_enum)]
    cut_policy: Option<CutArg>,

    /// Grow parcels in agent-table order instead of a random permutation.
    #[arg(long)]
    no_shuffle: bool,

    /// Log per-region progress.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_params(args: &Args) -> Result<DelineationParams> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_str(
            &fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        )
        .with_context(|| format!("parsing {}", path.display()))?,
        None => DelineationParams::default(),
    };
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(cut) = args.cut_policy {
        params.cut_policy = cut.into();
    }
    if args.no_shuffle {
        params.shuffle = false;
    }
    Ok(params)
}

// ── main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let params = load_params(&args)?;
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let scenario = Scenario::from_json(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    let inputs = scenario.into_inputs();
    info!(
        width = inputs.cultivable.width,
        height = inputs.cultivable.height,
        seed = params.seed,
        "loaded scenario"
    );

    let result = RegionDriver::new(params)
        .delineate(&inputs)
        .with_context(|| format!("delineating parcels for {}", args.input.display()))?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, serde_json::to_string(&result)?)
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "{} parcels written to {} ({} discarded outside the study area)",
        result.agents.len(),
        args.output.display(),
        result.discarded.len()
    );
    Ok(())
}
