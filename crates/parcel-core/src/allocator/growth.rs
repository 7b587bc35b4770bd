//! Bounding-box growth of a single parcel.
//!
//! A parcel starts as its seed cell and claims unassigned cells inside a
//! rectangle that widens by one row and one column, in random directions,
//! each time it runs out of cells to claim.
//!
//! After a pass that ends short of the target every cell inside the rectangle
//! is claimed by someone, so the next pass only visits the strips the
//! expansion added. Visiting them row by row, left strip before right strip,
//! reproduces the exact claim order of a full rescan of the rectangle.

use rand::Rng;

use super::UNASSIGNED;
use crate::agents::AgentId;
use crate::error::InternalInvariantError;
use crate::grid::Grid;

/// Half-open rectangle `top..bottom` × `left..right`, always inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrowthBox {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl GrowthBox {
    pub fn seed(row: usize, col: usize) -> Self {
        Self {
            top: row,
            bottom: row + 1,
            left: col,
            right: col + 1,
        }
    }

    pub fn covers(&self, height: usize, width: usize) -> bool {
        self.top == 0 && self.left == 0 && self.bottom == height && self.right == width
    }

    /// Grow by one row (up or down) then one column (left or right), each
    /// direction chosen by a fair coin. A flip towards an edge the box already
    /// touches leaves that axis unchanged.
    pub fn expand<R: Rng + ?Sized>(&mut self, rng: &mut R, height: usize, width: usize) {
        if rng.gen_bool(0.5) {
            self.top = self.top.saturating_sub(1);
        } else {
            self.bottom = (self.bottom + 1).min(height);
        }
        if rng.gen_bool(0.5) {
            self.left = self.left.saturating_sub(1);
        } else {
            self.right = (self.right + 1).min(width);
        }
    }
}

/// Growth state of the parcel currently being built.
#[derive(Debug)]
pub(crate) struct ParcelGrowth {
    id: AgentId,
    target: usize,
    placed: usize,
    bbox: GrowthBox,
    /// Rectangle fully claimed by earlier passes.
    scanned: Option<GrowthBox>,
}

impl ParcelGrowth {
    pub fn new(id: AgentId, target: usize, row: usize, col: usize) -> Self {
        Self {
            id,
            target,
            placed: 0,
            bbox: GrowthBox::seed(row, col),
            scanned: None,
        }
    }

    /// Grow until the parcel reaches its target size.
    pub fn run<R: Rng + ?Sized>(
        mut self,
        labels: &mut Grid<i32>,
        rng: &mut R,
    ) -> Result<(), InternalInvariantError> {
        loop {
            if self.claim_new_cells(labels) {
                return Ok(());
            }
            if self.bbox.covers(labels.height, labels.width) {
                return Err(InternalInvariantError::GrowthExhausted {
                    id: self.id,
                    placed: self.placed,
                    target: self.target,
                });
            }
            self.scanned = Some(self.bbox);
            self.bbox.expand(rng, labels.height, labels.width);
        }
    }

    /// Claim unassigned cells of the box that earlier passes have not
    /// visited, in row-major order. Returns true once the target is reached.
    fn claim_new_cells(&mut self, labels: &mut Grid<i32>) -> bool {
        let b = self.bbox;
        for row in b.top..b.bottom {
            let done = match self.scanned.filter(|s| (s.top..s.bottom).contains(&row)) {
                Some(s) => {
                    self.claim_run(labels, row, b.left, s.left)
                        || self.claim_run(labels, row, s.right, b.right)
                }
                None => self.claim_run(labels, row, b.left, b.right),
            };
            if done {
                return true;
            }
        }
        false
    }

    fn claim_run(&mut self, labels: &mut Grid<i32>, row: usize, from: usize, to: usize) -> bool {
        let base = row * labels.width;
        for cell in &mut labels.data[base + from..base + to] {
            if *cell == UNASSIGNED {
                *cell = self.id;
                self.placed += 1;
                if self.placed == self.target {
                    return true;
                }
            }
        }
        false
    }
}
