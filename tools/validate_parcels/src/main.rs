//! Re-checks a delineation result against the scenario it was produced from:
//! exact parcel sizes, parcels only on cultivable land inside their own
//! region, dense ids, and a remap that accounts for every input agent.
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use parcel_core::agents::columns;
use parcel_core::validate::{check_dense, check_partition, Coverage};
use parcel_core::{AgentRecord, Delineation, RegionInputs, Scenario};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "validate_parcels", about = "Check a delineation result against its scenario")]
struct Args {
    /// Scenario JSON the result was produced from.
    #[arg(short, long)]
    input: PathBuf,

    /// Delineation JSON written by `delineate`.
    #[arg(short, long)]
    result: PathBuf,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Every input agent is either remapped (with its size intact) or discarded.
fn check_remap(inputs: &RegionInputs, result: &Delineation) -> Result<()> {
    let by_id: HashMap<i32, &AgentRecord> = inputs.agents.iter().map(|a| (a.id, a)).collect();
    ensure!(
        result.remap.len() == result.agents.len(),
        "{} remap entries for {} surviving agents",
        result.remap.len(),
        result.agents.len()
    );
    for (r, survivor) in result.remap.iter().zip(&result.agents) {
        let Some(original) = by_id.get(&r.original) else {
            bail!("remap refers to unknown agent {}", r.original);
        };
        ensure!(
            survivor.id == r.dense && survivor.size == original.size,
            "agent {} was renumbered to {} with size {}, expected size {}",
            r.original,
            survivor.id,
            survivor.size,
            original.size
        );
    }
    let accounted: BTreeSet<i32> = result
        .remap
        .iter()
        .map(|r| r.original)
        .chain(result.discarded.iter().copied())
        .collect();
    let expected: BTreeSet<i32> = by_id.keys().copied().collect();
    ensure!(
        accounted == expected,
        "remap and discard list cover {} agents, scenario has {}",
        accounted.len(),
        expected.len()
    );
    Ok(())
}

/// Surviving parcels lie inside the region of the agent that owns them.
fn check_regions(inputs: &RegionInputs, result: &Delineation) -> Result<()> {
    let region_of: HashMap<i32, i32> = inputs.agents.iter().map(|a| (a.id, a.region)).collect();
    for (i, &label) in result.parcels.data.iter().enumerate() {
        if label < 0 {
            continue;
        }
        let original = result.remap[label as usize].original;
        let region = inputs.regions.data[i];
        ensure!(
            region_of.get(&original) == Some(&region),
            "cell ({}, {}) of agent {} lies in region {}",
            i / result.parcels.width,
            i % result.parcels.width,
            original,
            region
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let scenario: Scenario = read_json(&args.input)?;
    let inputs = scenario.into_inputs();
    let result: Delineation = read_json(&args.result)?;

    inputs.validate().context("scenario is malformed")?;
    let (ids, sizes) = columns(&result.agents);
    let report = check_partition(&inputs.cultivable, &result.parcels, &ids, &sizes, Coverage::Partial)
        .context("parcel grid does not match the surviving agent table")?;
    check_dense(&result.parcels, result.agents.len()).context("parcel ids are not dense")?;
    check_remap(&inputs, &result)?;
    check_regions(&inputs, &result)?;

    info!(parcels = report.parcels, cells = report.cells, "result is consistent");
    eprintln!(
        "OK: {} parcels covering {} cells, {} discarded",
        report.parcels,
        report.cells,
        result.discarded.len()
    );
    Ok(())
}
