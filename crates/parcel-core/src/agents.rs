use serde::{Deserialize, Serialize};

/// Farming agent identifier. Valid ids are non-negative; negative values are
/// reserved for grid sentinels.
pub type AgentId = i32;

/// Administrative region identifier. Negative values mark cells outside every
/// region.
pub type RegionId = i32;

/// One row of the agent table: who the agent is, where it farms, and how many
/// cells its parcel must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    #[serde(default)]
    pub region: RegionId,
    /// Target parcel size in cells.
    pub size: usize,
}

/// Split an agent table into the parallel `(ids, sizes)` columns the
/// allocator consumes.
pub fn columns<'a>(agents: impl IntoIterator<Item = &'a AgentRecord>) -> (Vec<AgentId>, Vec<usize>) {
    agents.into_iter().map(|a| (a.id, a.size)).unzip()
}
