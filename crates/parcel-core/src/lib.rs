//! Farm parcel delineation.
//!
//! Partitions the cultivable cells of a grid into one parcel per farming
//! agent, each parcel exactly as large as the agent's target size, and
//! assembles per-region results into a single densely numbered parcel grid.

pub mod agents;
pub mod allocator;
pub mod error;
pub mod grid;
mod par;
pub mod params;
pub mod region;
pub mod scenario;
pub mod validate;

pub use agents::{AgentId, AgentRecord, RegionId};
pub use allocator::{allocate, allocate_in_order, NO_PARCEL};
pub use error::{ConfigurationError, Error, InternalInvariantError, Result};
pub use grid::{Grid, Window};
pub use params::{CutPolicy, DelineationParams};
pub use region::{cut::IdRemap, Delineation, RegionDriver, RegionInputs};
pub use scenario::Scenario;
