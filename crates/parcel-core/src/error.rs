//! Error types for parcel delineation.

use thiserror::Error;

use crate::agents::{AgentId, RegionId};

/// Invalid input, detected before any grid is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{ids} agent ids but {sizes} target sizes")]
    LengthMismatch { ids: usize, sizes: usize },

    #[error("agent {id} has a non-positive target size")]
    NonPositiveSize { id: AgentId },

    #[error("agent id {id} is negative; negative values are reserved sentinels")]
    NegativeId { id: AgentId },

    #[error("agent id {id} appears more than once")]
    DuplicateId { id: AgentId },

    #[error("target sizes sum to {requested} cells but the mask has {cultivable} cultivable cells")]
    SizeSumMismatch { requested: usize, cultivable: usize },

    #[error("{what} grid is {actual:?} (rows, cols), expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("buffer has {len} cells, expected {width}x{height}")]
    BufferLength { len: usize, width: usize, height: usize },

    #[error("agent {id} is assigned to negative region {region}")]
    NegativeRegion { id: AgentId, region: RegionId },
}

/// A consistency check failed after the algorithm ran. Indicates a defect,
/// never bad input that slipped through validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalInvariantError {
    #[error("{count} cultivable cells were never assigned to a parcel")]
    UnassignedCellsRemain { count: usize },

    #[error("only {placed} of {expected} agents received a parcel")]
    AgentsNotPlaced { placed: usize, expected: usize },

    #[error("parcel {id} has {actual} cells, expected {expected}")]
    ParcelSizeMismatch { id: AgentId, expected: usize, actual: usize },

    #[error("cell ({row}, {col}) holds label {label}, which is neither a requested id nor the no-parcel sentinel")]
    UnexpectedLabel { row: usize, col: usize, label: i32 },

    #[error("cell ({row}, {col}) is cultivable but carries no parcel")]
    CultivableWithoutParcel { row: usize, col: usize },

    #[error("cell ({row}, {col}) is not cultivable but carries parcel {label}")]
    ParcelOnBareCell { row: usize, col: usize, label: i32 },

    #[error("parcel {id} covers the whole grid with {placed} of {target} cells placed")]
    GrowthExhausted { id: AgentId, placed: usize, target: usize },

    #[error("highest parcel id is {max} but {expected} agents survive")]
    NonDenseIds { max: i32, expected: usize },

    #[error("{distinct} distinct parcel ids in the grid but {expected} agents survive")]
    SurvivorCountMismatch { distinct: usize, expected: usize },
}

/// Main error type for parcel delineation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("internal invariant violated: {0}")]
    Internal(#[from] InternalInvariantError),

    #[error("region {region}: {source}")]
    Region {
        region: RegionId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True if this error, or the error it wraps, was caused by invalid input.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Configuration(_) => true,
            Error::Internal(_) => false,
            Error::Region { source, .. } => source.is_configuration(),
        }
    }

    pub(crate) fn in_region(self, region: RegionId) -> Self {
        Error::Region { region, source: Box::new(self) }
    }
}

/// Result type alias for parcel delineation.
pub type Result<T> = std::result::Result<T, Error>;
