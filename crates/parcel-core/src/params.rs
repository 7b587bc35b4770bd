use serde::{Deserialize, Serialize};

use crate::agents::RegionId;

/// Rule deciding when a parcel straddling the study-area boundary is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutPolicy {
    /// Drop a parcel when more than half of its cells lie outside.
    Majority,
    /// Drop a parcel when any of its cells lies outside.
    AnyCell,
}

impl CutPolicy {
    pub fn discards(self, inside: usize, outside: usize) -> bool {
        match self {
            CutPolicy::Majority => outside > inside,
            CutPolicy::AnyCell => outside > 0,
        }
    }
}

/// User-facing delineation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelineationParams {
    pub seed: u64,
    pub cut_policy: CutPolicy,
    /// Randomly permute each region's agent table before growing parcels.
    pub shuffle: bool,
}

impl Default for DelineationParams {
    fn default() -> Self {
        Self {
            seed: 42,
            cut_policy: CutPolicy::Majority,
            shuffle: true,
        }
    }
}

impl DelineationParams {
    /// Seed of the random stream owned by one region. Independent of the order
    /// in which regions are processed.
    pub fn region_seed(&self, region: RegionId) -> u64 {
        (self.seed ^ 0x3C6E_F372_FE94_F82B)
            .wrapping_add((region as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}
