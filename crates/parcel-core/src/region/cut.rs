//! Study-area cut and dense renumbering of the merged parcel grid.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::agents::{AgentId, AgentRecord};
use crate::allocator::NO_PARCEL;
use crate::error::InternalInvariantError;
use crate::grid::Grid;
use crate::params::CutPolicy;

/// Mapping from an agent's input id to its id in the renumbered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRemap {
    pub original: AgentId,
    pub dense: AgentId,
}

/// Clear every parcel that `policy` rejects given how many of its cells fall
/// inside and outside `study_area`. Returns the cleared ids, ascending.
pub(crate) fn cut_outside_study_area(
    parcels: &mut Grid<i32>,
    study_area: &Grid<bool>,
    policy: CutPolicy,
) -> Vec<AgentId> {
    let mut tally: BTreeMap<AgentId, (usize, usize)> = BTreeMap::new();
    for (&label, &inside) in parcels.data.iter().zip(&study_area.data) {
        if label >= 0 {
            let t = tally.entry(label).or_insert((0, 0));
            if inside {
                t.0 += 1;
            } else {
                t.1 += 1;
            }
        }
    }

    let discarded: BTreeSet<AgentId> = tally
        .into_iter()
        .filter(|&(_, (inside, outside))| policy.discards(inside, outside))
        .map(|(id, _)| id)
        .collect();

    if !discarded.is_empty() {
        for label in parcels.data.iter_mut() {
            if discarded.contains(label) {
                *label = NO_PARCEL;
            }
        }
    }
    discarded.into_iter().collect()
}

/// Renumber surviving agents to `0..K` in ascending order of their input id,
/// rewrite `parcels` accordingly, and return the remap together with the
/// reindexed agent table.
pub(crate) fn renumber(
    parcels: &mut Grid<i32>,
    agents: &[AgentRecord],
    discarded: &[AgentId],
) -> Result<(Vec<IdRemap>, Vec<AgentRecord>), InternalInvariantError> {
    let mut survivors: Vec<AgentRecord> = agents
        .iter()
        .filter(|a| discarded.binary_search(&a.id).is_err())
        .copied()
        .collect();
    survivors.sort_by_key(|a| a.id);

    let remap: Vec<IdRemap> = survivors
        .iter()
        .zip(0..)
        .map(|(a, dense)| IdRemap { original: a.id, dense })
        .collect();
    let lookup: HashMap<AgentId, AgentId> = remap.iter().map(|r| (r.original, r.dense)).collect();

    let width = parcels.width;
    for (i, label) in parcels.data.iter_mut().enumerate() {
        if *label < 0 {
            continue;
        }
        match lookup.get(label) {
            Some(&dense) => *label = dense,
            None => {
                return Err(InternalInvariantError::UnexpectedLabel {
                    row: i / width,
                    col: i % width,
                    label: *label,
                })
            }
        }
    }

    let agents = survivors
        .into_iter()
        .zip(&remap)
        .map(|(a, r)| AgentRecord { id: r.dense, ..a })
        .collect();
    Ok((remap, agents))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: AgentId, size: usize) -> AgentRecord {
        AgentRecord { id, region: 0, size }
    }

    #[test]
    fn majority_cut_drops_mostly_outside_parcels() {
        let mut parcels = Grid::from_vec(4, 1, vec![3, 3, 3, 8]).unwrap();
        let study = Grid::from_vec(4, 1, vec![true, false, false, true]).unwrap();
        let discarded = cut_outside_study_area(&mut parcels, &study, CutPolicy::Majority);
        assert_eq!(discarded, vec![3]);
        assert_eq!(parcels.data, vec![NO_PARCEL, NO_PARCEL, NO_PARCEL, 8]);
    }

    #[test]
    fn any_cell_cut_drops_touching_parcels() {
        let mut parcels = Grid::from_vec(4, 1, vec![3, 3, 3, 8]).unwrap();
        let study = Grid::from_vec(4, 1, vec![true, true, false, true]).unwrap();
        let mut majority = parcels.clone();
        assert!(cut_outside_study_area(&mut majority, &study, CutPolicy::Majority).is_empty());
        assert_eq!(cut_outside_study_area(&mut parcels, &study, CutPolicy::AnyCell), vec![3]);
    }

    #[test]
    fn renumber_is_dense_and_ordered() {
        let mut parcels = Grid::from_vec(5, 1, vec![40, 7, NO_PARCEL, 12, 40]).unwrap();
        let agents = [agent(40, 2), agent(7, 1), agent(99, 3), agent(12, 1)];
        let (remap, table) = renumber(&mut parcels, &agents, &[99]).unwrap();
        assert_eq!(parcels.data, vec![2, 0, NO_PARCEL, 1, 2]);
        assert_eq!(
            remap,
            vec![
                IdRemap { original: 7, dense: 0 },
                IdRemap { original: 12, dense: 1 },
                IdRemap { original: 40, dense: 2 },
            ]
        );
        assert_eq!(table, vec![agent(0, 1), agent(1, 1), agent(2, 2)]);
    }

    #[test]
    fn renumber_rejects_unknown_labels() {
        let mut parcels = Grid::from_vec(2, 1, vec![1, 5]).unwrap();
        let err = renumber(&mut parcels, &[agent(1, 1)], &[]).unwrap_err();
        assert_eq!(err, InternalInvariantError::UnexpectedLabel { row: 0, col: 1, label: 5 });
    }
}
