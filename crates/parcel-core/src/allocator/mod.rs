//! Farm parcel allocation: partition the cultivable cells of a mask into one
//! parcel per agent, each exactly as large as the agent's target size.

mod growth;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::agents::AgentId;
use crate::error::{ConfigurationError, InternalInvariantError, Result};
use crate::grid::Grid;
use crate::validate::{check_partition, Coverage};
use growth::ParcelGrowth;

/// Label of cells that belong to no parcel.
pub const NO_PARCEL: i32 = -1;

/// Label of cultivable cells not yet claimed. Never present in a returned grid.
pub(crate) const UNASSIGNED: i32 = -2;

/// Partition the cultivable cells of `mask` into one parcel per agent.
///
/// The agents are shuffled with `rng` before growing, so which part of the
/// grid an agent ends up in does not follow the order of `ids`. Every
/// cultivable cell of the result holds exactly one of `ids`, agent `ids[i]`
/// covers exactly `sizes[i]` cells, and every other cell holds [`NO_PARCEL`].
///
/// Inputs are validated before anything is allocated: `ids` and `sizes` must
/// have the same length, sizes must be positive, ids non-negative and unique,
/// and the sizes must sum to the number of cultivable cells.
pub fn allocate<R: Rng + ?Sized>(
    mask: &Grid<bool>,
    ids: &[AgentId],
    sizes: &[usize],
    rng: &mut R,
) -> Result<Grid<i32>> {
    validate_request(mask, ids, sizes)?;

    let mut order: Vec<usize> = (0..ids.len()).collect();
    order.shuffle(rng);
    let ids: Vec<AgentId> = order.iter().map(|&i| ids[i]).collect();
    let sizes: Vec<usize> = order.iter().map(|&i| sizes[i]).collect();

    grow_parcels(mask, &ids, &sizes, rng)
}

/// Like [`allocate`], but grows parcels in the order given.
pub fn allocate_in_order<R: Rng + ?Sized>(
    mask: &Grid<bool>,
    ids: &[AgentId],
    sizes: &[usize],
    rng: &mut R,
) -> Result<Grid<i32>> {
    validate_request(mask, ids, sizes)?;
    grow_parcels(mask, ids, sizes, rng)
}

fn validate_request(
    mask: &Grid<bool>,
    ids: &[AgentId],
    sizes: &[usize],
) -> std::result::Result<(), ConfigurationError> {
    mask.check_buffer()?;
    if ids.len() != sizes.len() {
        return Err(ConfigurationError::LengthMismatch {
            ids: ids.len(),
            sizes: sizes.len(),
        });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for (&id, &size) in ids.iter().zip(sizes) {
        if id < 0 {
            return Err(ConfigurationError::NegativeId { id });
        }
        if size == 0 {
            return Err(ConfigurationError::NonPositiveSize { id });
        }
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateId { id });
        }
    }

    let requested: usize = sizes.iter().sum();
    let cultivable = mask.count_true();
    if requested != cultivable {
        return Err(ConfigurationError::SizeSumMismatch { requested, cultivable });
    }
    Ok(())
}

/// Row-major seeding loop. `cursor` indexes the next agent to place.
fn grow_parcels<R: Rng + ?Sized>(
    mask: &Grid<bool>,
    ids: &[AgentId],
    sizes: &[usize],
    rng: &mut R,
) -> Result<Grid<i32>> {
    let mut labels = mask.map(|&c| if c { UNASSIGNED } else { NO_PARCEL });
    let mut cursor = 0;

    for idx in 0..labels.len() {
        if labels.data[idx] != UNASSIGNED {
            continue;
        }
        let (Some(&id), Some(&target)) = (ids.get(cursor), sizes.get(cursor)) else {
            let count = labels.count(|&v| v == UNASSIGNED);
            return Err(InternalInvariantError::UnassignedCellsRemain { count }.into());
        };
        let (row, col) = (idx / labels.width, idx % labels.width);
        ParcelGrowth::new(id, target, row, col).run(&mut labels, rng)?;
        cursor += 1;
    }

    if cursor != ids.len() {
        return Err(InternalInvariantError::AgentsNotPlaced {
            placed: cursor,
            expected: ids.len(),
        }
        .into());
    }

    let report = check_partition(mask, &labels, ids, sizes, Coverage::Complete)?;
    debug!(parcels = report.parcels, cells = report.cells, "allocated parcels");
    Ok(labels)
}
