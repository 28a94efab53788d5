//! Board store
//!
//! Fixed-size grid of color indices. Cells are stored column-major
//! (`x * height + y`), one `AtomicU8` per cell:
//! - Writes come only from the paint pipeline worker (crate-private `set`)
//! - Reads are lock-free, so a full-board read racing a paint may mix old and
//!   new cells, but a single cell is never torn

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{BoardError, Result};
use crate::palette::{ColorIndex, PALETTE_SIZE};

/// Shared pixel grid
#[derive(Debug)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Box<[AtomicU8]>,
}

impl Board {
    /// Create a board filled with `default_color`
    ///
    /// # Errors
    /// - `ZeroDimension` if width or height is zero
    /// - `InvalidColor` if `default_color` is not a palette index
    /// - `TooLarge` if `width * height` overflows
    pub fn new(width: usize, height: usize, default_color: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroDimension { width, height });
        }

        let fill = ColorIndex::new(default_color as i64).ok_or(BoardError::InvalidColor {
            index: default_color,
            size: PALETTE_SIZE,
        })?;

        let len = width
            .checked_mul(height)
            .ok_or(BoardError::TooLarge { width, height })?;

        let cells = (0..len)
            .map(|_| AtomicU8::new(fill.get()))
            .collect();

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Map signed coordinates onto the grid, `None` if out of bounds
    pub fn position(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some((x, y))
    }

    /// Color of a single cell
    pub fn get(&self, x: usize, y: usize) -> Option<ColorIndex> {
        self.cell(x, y)
            .map(|cell| ColorIndex::from_stored(cell.load(Ordering::Relaxed)))
    }

    /// Iterate the colors of column `x`, top to bottom
    pub fn column(&self, x: usize) -> impl Iterator<Item = ColorIndex> + '_ {
        let start = x.min(self.width) * self.height;
        let end = if x < self.width { start + self.height } else { start };
        self.cells[start..end]
            .iter()
            .map(|cell| ColorIndex::from_stored(cell.load(Ordering::Relaxed)))
    }

    /// Overwrite a single cell
    ///
    /// Only the paint pipeline calls this. Returns false if out of bounds.
    pub(crate) fn set(&self, x: usize, y: usize, color: ColorIndex) -> bool {
        match self.cell(x, y) {
            Some(cell) => {
                cell.store(color.get(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    fn cell(&self, x: usize, y: usize) -> Option<&AtomicU8> {
        if x < self.width && y < self.height {
            self.cells.get(x * self.height + y)
        } else {
            None
        }
    }
}
