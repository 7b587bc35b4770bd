use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A 2D grid of cells, row-major.
///
/// Deserialization goes through [`Grid::from_vec`], so a grid loaded from
/// JSON always has `width * height` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawGrid<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Grid<T> {
    /// Row-major cell values, `height * width` long.
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Unchecked on-disk form of [`Grid`].
#[derive(Deserialize)]
struct RawGrid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = ConfigurationError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        Grid::from_vec(raw.width, raw.height, raw.data)
    }
}

impl<T: Clone> Grid<T> {
    /// Create a new grid filled with the given value.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.index(row, col)].clone()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: T) {
        let i = self.index(row, col);
        self.data[i] = val;
    }

    /// Copy the cells covered by `window` into a new grid of the window's size.
    pub fn crop(&self, window: Window) -> Grid<T> {
        let mut data = Vec::with_capacity(window.len());
        for row in window.row..window.row + window.height {
            let start = row * self.width + window.col;
            data.extend_from_slice(&self.data[start..start + window.width]);
        }
        Grid {
            data,
            width: window.width,
            height: window.height,
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer, checking that it matches the shape.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, ConfigurationError> {
        if data.len() != width * height {
            return Err(ConfigurationError::BufferLength {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self { data, width, height })
    }

    /// Fail if the buffer length disagrees with `width * height`. Grids built
    /// by hand through the public fields can be inconsistent.
    pub fn check_buffer(&self) -> Result<(), ConfigurationError> {
        if self.data.len() != self.width * self.height {
            return Err(ConfigurationError::BufferLength {
                len: self.data.len(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Fail unless `other` has the same shape as `self`.
    pub fn ensure_same_shape<U>(&self, other: &Grid<U>, what: &'static str) -> Result<(), ConfigurationError> {
        if self.shape() != other.shape() {
            return Err(ConfigurationError::ShapeMismatch {
                what,
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Number of cells for which `pred` holds.
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.data.iter().filter(|v| pred(*v)).count()
    }

    /// Apply `f` to every cell, producing a grid of the same shape.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Write `values` back into the cells covered by `window`, but only where
    /// `keep` is set. `values` and `keep` must both be window-sized.
    pub fn paste(&mut self, window: Window, values: &Grid<T>, keep: &Grid<bool>)
    where
        T: Copy,
    {
        debug_assert_eq!(values.shape(), (window.height, window.width));
        debug_assert_eq!(keep.shape(), (window.height, window.width));
        for r in 0..window.height {
            for c in 0..window.width {
                let local = r * window.width + c;
                if keep.data[local] {
                    let global = self.index(window.row + r, window.col + c);
                    self.data[global] = values.data[local];
                }
            }
        }
    }
}

impl Grid<bool> {
    /// Number of `true` cells.
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// An axis-aligned sub-rectangle of a grid: rows `row..row + height`,
/// columns `col..col + width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub row: usize,
    pub col: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// The smallest window containing every cell for which `pred` holds, or
    /// `None` if there is no such cell.
    pub fn bounding<T>(grid: &Grid<T>, pred: impl Fn(&T) -> bool) -> Option<Window> {
        let mut min_row = usize::MAX;
        let mut max_row = 0;
        let mut min_col = usize::MAX;
        let mut max_col = 0;
        for (i, v) in grid.data.iter().enumerate() {
            if pred(v) {
                let (r, c) = (i / grid.width, i % grid.width);
                min_row = min_row.min(r);
                max_row = max_row.max(r);
                min_col = min_col.min(c);
                max_col = max_col.max(c);
            }
        }
        (min_row != usize::MAX).then(|| Window {
            row: min_row,
            col: min_col,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
