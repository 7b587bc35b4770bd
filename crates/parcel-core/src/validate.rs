//! Invariant checks on parcel label grids.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::agents::AgentId;
use crate::allocator::{NO_PARCEL, UNASSIGNED};
use crate::error::{InternalInvariantError, Result};
use crate::grid::Grid;

/// How much of the cultivable area the labels are expected to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Every cultivable cell carries a parcel (fresh allocator output).
    Complete,
    /// Cultivable cells may be left without a parcel (after parcels were
    /// discarded).
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionReport {
    pub parcels: usize,
    pub cells: usize,
}

/// Verify that `labels` partitions `mask` into the requested parcels:
/// parcels only on cultivable cells, only requested ids, and agent `ids[i]`
/// covering exactly `sizes[i]` cells.
pub fn check_partition(
    mask: &Grid<bool>,
    labels: &Grid<i32>,
    ids: &[AgentId],
    sizes: &[usize],
    coverage: Coverage,
) -> Result<PartitionReport> {
    mask.ensure_same_shape(labels, "labels")?;

    let mut counts: HashMap<AgentId, usize> = ids.iter().map(|&id| (id, 0)).collect();
    let mut unassigned = 0;
    for (i, (&label, &cultivable)) in labels.data.iter().zip(&mask.data).enumerate() {
        let (row, col) = (i / labels.width, i % labels.width);
        match label {
            UNASSIGNED => unassigned += 1,
            NO_PARCEL => {
                if cultivable && coverage == Coverage::Complete {
                    return Err(InternalInvariantError::CultivableWithoutParcel { row, col }.into());
                }
            }
            _ => {
                let Some(n) = counts.get_mut(&label) else {
                    return Err(InternalInvariantError::UnexpectedLabel { row, col, label }.into());
                };
                if !cultivable {
                    return Err(InternalInvariantError::ParcelOnBareCell { row, col, label }.into());
                }
                *n += 1;
            }
        }
    }
    if unassigned > 0 {
        return Err(InternalInvariantError::UnassignedCellsRemain { count: unassigned }.into());
    }

    for (&id, &expected) in ids.iter().zip(sizes) {
        let actual = counts[&id];
        if actual != expected {
            return Err(InternalInvariantError::ParcelSizeMismatch { id, expected, actual }.into());
        }
    }

    Ok(PartitionReport {
        parcels: ids.len(),
        cells: sizes.iter().sum(),
    })
}

/// Check that the parcel ids in `labels` are exactly `0..expected`.
pub fn check_dense(labels: &Grid<i32>, expected: usize) -> std::result::Result<(), InternalInvariantError> {
    let distinct: BTreeSet<i32> = labels.data.iter().copied().filter(|&v| v >= 0).collect();
    if let Some(&max) = distinct.last() {
        if max as i64 + 1 != expected as i64 {
            return Err(InternalInvariantError::NonDenseIds { max, expected });
        }
    }
    if distinct.len() != expected {
        return Err(InternalInvariantError::SurvivorCountMismatch {
            distinct: distinct.len(),
            expected,
        });
    }
    Ok(())
}

/// Cell count of every parcel in `labels`.
pub fn parcel_sizes(labels: &Grid<i32>) -> BTreeMap<AgentId, usize> {
    let mut sizes = BTreeMap::new();
    for &v in labels.data.iter().filter(|&&v| v >= 0) {
        *sizes.entry(v).or_insert(0) += 1;
    }
    sizes
}
