//! Region driver: allocate parcels region by region, merge them into one
//! grid, cut parcels that fall outside the study area and renumber the
//! survivors densely.

pub mod cut;

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agents::{columns, AgentId, AgentRecord, RegionId};
use crate::allocator::{allocate, allocate_in_order, NO_PARCEL};
use crate::error::{ConfigurationError, Error, Result};
use crate::grid::{Grid, Window};
use crate::par::*;
use crate::params::DelineationParams;
use crate::validate::check_dense;
use cut::{cut_outside_study_area, renumber, IdRemap};

/// Everything the driver needs for one delineation run. All grids share one
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionInputs {
    pub cultivable: Grid<bool>,
    /// Region id per cell; negative outside every region.
    pub regions: Grid<RegionId>,
    /// True inside the study area.
    pub study_area: Grid<bool>,
    pub agents: Vec<AgentRecord>,
}

impl RegionInputs {
    /// One region (id 0) spanning the whole grid, study area everywhere.
    pub fn single_region(cultivable: Grid<bool>, agents: Vec<AgentRecord>) -> Self {
        let regions = Grid::new(cultivable.width, cultivable.height, 0);
        let study_area = Grid::new(cultivable.width, cultivable.height, true);
        Self { cultivable, regions, study_area, agents }
    }

    /// Check buffer lengths, grid shapes and the agent table.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        self.cultivable.check_buffer()?;
        self.regions.check_buffer()?;
        self.study_area.check_buffer()?;
        self.cultivable.ensure_same_shape(&self.regions, "regions")?;
        self.cultivable.ensure_same_shape(&self.study_area, "study area")?;
        if let Some(a) = self.agents.iter().find(|a| a.region < 0) {
            return Err(ConfigurationError::NegativeRegion { id: a.id, region: a.region });
        }
        let mut seen = BTreeSet::new();
        if let Some(a) = self.agents.iter().find(|a| !seen.insert(a.id)) {
            return Err(ConfigurationError::DuplicateId { id: a.id });
        }
        Ok(())
    }

    /// Region ids present in the region grid or referenced by an agent.
    fn region_ids(&self) -> Vec<RegionId> {
        let mut ids: BTreeSet<RegionId> = self.regions.data.iter().copied().filter(|&r| r >= 0).collect();
        ids.extend(self.agents.iter().map(|a| a.region));
        ids.into_iter().collect()
    }
}

/// Output of a delineation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delineation {
    /// Parcel grid with dense ids `0..agents.len()`; [`NO_PARCEL`] elsewhere.
    pub parcels: Grid<i32>,
    /// Surviving agents, reindexed to their dense ids and sorted by them.
    pub agents: Vec<AgentRecord>,
    /// Input id → dense id for every survivor, sorted by input id.
    pub remap: Vec<IdRemap>,
    /// Input ids of agents whose parcels were cut, ascending.
    pub discarded: Vec<AgentId>,
}

impl Delineation {
    pub fn dense_id_of(&self, original: AgentId) -> Option<AgentId> {
        self.remap
            .binary_search_by_key(&original, |r| r.original)
            .ok()
            .map(|i| self.remap[i].dense)
    }
}

/// Labels of one region, in the coordinates of its bounding window.
struct RegionParcels {
    window: Window,
    labels: Grid<i32>,
    in_region: Grid<bool>,
}

/// Runs the allocator over every region and assembles the global result.
pub struct RegionDriver {
    params: DelineationParams,
}

impl RegionDriver {
    pub fn new(params: DelineationParams) -> Self {
        Self { params }
    }

    /// Run the full delineation pipeline.
    ///
    /// 1. Per-region allocation (in parallel with the `threading` feature)
    /// 2. Merge into the global grid
    /// 3. Study-area cut
    /// 4. Dense renumbering
    pub fn delineate(&self, inputs: &RegionInputs) -> Result<Delineation> {
        inputs.validate()?;
        let regions = inputs.region_ids();
        info!(
            regions = regions.len(),
            agents = inputs.agents.len(),
            cultivable = inputs.cultivable.count_true(),
            "delineating parcels"
        );

        // ── 1. Per-region allocation ────────────────────────────────────────
        let results: Vec<Result<Option<RegionParcels>>> = regions
            .into_par_iter()
            .map(|region| self.delineate_region(inputs, region).map_err(|e| e.in_region(region)))
            .collect();

        // ── 2. Merge ────────────────────────────────────────────────────────
        let (width, height) = (inputs.cultivable.width, inputs.cultivable.height);
        let mut parcels = Grid::new(width, height, NO_PARCEL);
        for res in results {
            if let Some(rp) = res? {
                parcels.paste(rp.window, &rp.labels, &rp.in_region);
            }
        }

        // ── 3. Study-area cut ───────────────────────────────────────────────
        let discarded = cut_outside_study_area(&mut parcels, &inputs.study_area, self.params.cut_policy);
        if !discarded.is_empty() {
            warn!(
                count = discarded.len(),
                policy = ?self.params.cut_policy,
                "discarded parcels outside the study area"
            );
        }

        // ── 4. Renumber ─────────────────────────────────────────────────────
        let (remap, agents) = renumber(&mut parcels, &inputs.agents, &discarded)?;
        check_dense(&parcels, agents.len())?;
        info!(surviving = agents.len(), discarded = discarded.len(), "delineation complete");

        Ok(Delineation { parcels, agents, remap, discarded })
    }

    fn delineate_region(&self, inputs: &RegionInputs, region: RegionId) -> Result<Option<RegionParcels>> {
        let (ids, sizes) = columns(inputs.agents.iter().filter(|a| a.region == region));

        let Some(window) = Window::bounding(&inputs.regions, |&r| r == region) else {
            if ids.is_empty() {
                return Ok(None);
            }
            return Err(Error::from(ConfigurationError::SizeSumMismatch {
                requested: sizes.iter().sum(),
                cultivable: 0,
            }));
        };

        let in_region = inputs.regions.crop(window).map(|&r| r == region);
        let cultivable = inputs.cultivable.crop(window);
        let mask = Grid {
            data: cultivable.data.iter().zip(&in_region.data).map(|(&c, &r)| c && r).collect(),
            width: window.width,
            height: window.height,
        };

        let mut rng = StdRng::seed_from_u64(self.params.region_seed(region));
        let labels = if self.params.shuffle {
            allocate(&mask, &ids, &sizes, &mut rng)?
        } else {
            allocate_in_order(&mask, &ids, &sizes, &mut rng)?
        };
        debug!(region, ?window, parcels = ids.len(), "allocated region");

        Ok(Some(RegionParcels { window, labels, in_region }))
    }
}

impl Default for RegionDriver {
    fn default() -> Self {
        Self::new(DelineationParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CutPolicy;
    use crate::validate::parcel_sizes;

    fn agent(id: AgentId, region: RegionId, size: usize) -> AgentRecord {
        AgentRecord { id, region, size }
    }

    /// 8×4 grid: region 0 on the left half, region 1 on the right half,
    /// study area everywhere but the rightmost column.
    fn two_regions() -> RegionInputs {
        let (w, h) = (8, 4);
        let mut regions = Grid::new(w, h, 0);
        let mut study_area = Grid::new(w, h, true);
        for r in 0..h {
            for c in 4..w {
                regions.set(r, c, 1);
            }
            study_area.set(r, w - 1, false);
        }
        let mut cultivable = Grid::new(w, h, true);
        cultivable.set(0, 0, false);
        cultivable.set(3, 6, false);
        RegionInputs {
            cultivable,
            regions,
            study_area,
            agents: vec![
                agent(10, 0, 9),
                agent(11, 0, 6),
                agent(20, 1, 11),
                agent(21, 1, 4),
            ],
        }
    }

    #[test]
    fn parcels_stay_inside_their_region() {
        let mut inputs = two_regions();
        inputs.study_area = Grid::new(8, 4, true);
        let result = RegionDriver::default().delineate(&inputs).unwrap();

        assert!(result.discarded.is_empty());
        assert_eq!(result.agents.len(), 4);
        for (i, &label) in result.parcels.data.iter().enumerate() {
            if label < 0 {
                assert!(!inputs.cultivable.data[i], "cultivable cell {i} left empty");
                continue;
            }
            let original = result.remap[label as usize].original;
            let agent = inputs.agents.iter().find(|a| a.id == original).unwrap();
            assert_eq!(inputs.regions.data[i], agent.region, "parcel {original} leaked out of its region");
        }
        let sizes = parcel_sizes(&result.parcels);
        for a in &result.agents {
            assert_eq!(sizes[&a.id], a.size);
        }
    }

    #[test]
    fn dense_ids_after_cut() {
        let inputs = two_regions();
        let params = DelineationParams { cut_policy: CutPolicy::AnyCell, ..Default::default() };
        let result = RegionDriver::new(params).delineate(&inputs).unwrap();

        // Region 1 spans columns 4..8, so at least one of its parcels touches
        // the excluded column.
        assert!(!result.discarded.is_empty());
        let k = result.agents.len();
        assert_eq!(k + result.discarded.len(), 4);
        check_dense(&result.parcels, k).unwrap();
        for (dense, r) in result.remap.iter().enumerate() {
            assert_eq!(r.dense as usize, dense);
            assert_eq!(result.dense_id_of(r.original), Some(r.dense));
        }
        for id in &result.discarded {
            assert_eq!(result.dense_id_of(*id), None);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let inputs = two_regions();
        let a = RegionDriver::default().delineate(&inputs).unwrap();
        let b = RegionDriver::default().delineate(&inputs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unbalanced_region_reports_region_id() {
        let mut inputs = two_regions();
        inputs.agents[3].size = 5;
        let err = RegionDriver::default().delineate(&inputs).unwrap_err();
        assert!(err.is_configuration());
        match err {
            Error::Region { region, source } => {
                assert_eq!(region, 1);
                assert_eq!(
                    *source,
                    Error::Configuration(ConfigurationError::SizeSumMismatch { requested: 16, cultivable: 15 })
                );
            }
            other => panic!("expected a region error, got {other:?}"),
        }
    }

    #[test]
    fn agents_in_missing_region_are_rejected() {
        let mut inputs = two_regions();
        inputs.agents.push(agent(30, 7, 2));
        let err = RegionDriver::default().delineate(&inputs).unwrap_err();
        assert!(matches!(err, Error::Region { region: 7, .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn shape_and_table_problems_fail_up_front() {
        let mut inputs = two_regions();
        inputs.study_area = Grid::new(3, 3, true);
        assert!(matches!(
            RegionDriver::default().delineate(&inputs),
            Err(Error::Configuration(ConfigurationError::ShapeMismatch { what: "study area", .. }))
        ));

        let mut inputs = two_regions();
        inputs.agents[1].region = -1;
        assert_eq!(
            RegionDriver::default().delineate(&inputs).unwrap_err(),
            Error::Configuration(ConfigurationError::NegativeRegion { id: 11, region: -1 })
        );
    }

    #[test]
    fn short_grid_buffers_fail_before_allocation() {
        let mut inputs = two_regions();
        inputs.regions.data.truncate(20);
        assert_eq!(
            RegionDriver::default().delineate(&inputs).unwrap_err(),
            Error::Configuration(ConfigurationError::BufferLength { len: 20, width: 8, height: 4 })
        );

        let mut inputs = two_regions();
        inputs.study_area.data.pop();
        assert!(matches!(
            RegionDriver::default().delineate(&inputs),
            Err(Error::Configuration(ConfigurationError::BufferLength { len: 31, .. }))
        ));

        let mut inputs = two_regions();
        inputs.cultivable.data.push(true);
        assert!(RegionDriver::default().delineate(&inputs).unwrap_err().is_configuration());
    }

    #[test]
    fn single_region_matches_plain_allocation_counts() {
        let cultivable = Grid::new(5, 5, true);
        let agents = vec![agent(3, 0, 5), agent(1, 0, 20)];
        let result = RegionDriver::default()
            .delineate(&RegionInputs::single_region(cultivable, agents))
            .unwrap();
        assert_eq!(result.remap.iter().map(|r| r.original).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(result.parcels.count(|&v| v == 0), 20);
        assert_eq!(result.parcels.count(|&v| v == 1), 5);
    }
}
