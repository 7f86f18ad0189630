use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::RowCol;

/// A rectangular region of cells, inclusive on both ends and normalized so
/// that `first_row <= last_row` and `first_col <= last_col`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl Region {
    /// Construct a region from two corner cells, normalizing coordinates.
    pub const fn new(a: RowCol, b: RowCol) -> Self {
        let (first_row, last_row) = if a.row <= b.row {
            (a.row, b.row)
        } else {
            (b.row, a.row)
        };
        let (first_col, last_col) = if a.col <= b.col {
            (a.col, b.col)
        } else {
            (b.col, a.col)
        };
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    /// Construct a region from explicit bounds, normalizing if needed.
    pub const fn of(first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        Self::new(
            RowCol::new(first_row, first_col),
            RowCol::new(last_row, last_col),
        )
    }

    /// The top-left cell; the anchor when the region is merged.
    pub const fn top_left(&self) -> RowCol {
        RowCol::new(self.first_row, self.first_col)
    }

    /// Number of columns covered.
    pub const fn width(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    /// Number of rows covered.
    pub const fn height(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    /// Returns true if the region is exactly one cell.
    pub const fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    /// Returns true if `cell` lies within this region.
    pub const fn contains(&self, cell: RowCol) -> bool {
        cell.row >= self.first_row
            && cell.row <= self.last_row
            && cell.col >= self.first_col
            && cell.col <= self.last_col
    }

    /// Returns true if the two regions share at least one cell.
    pub const fn intersects(&self, other: &Region) -> bool {
        self.first_row <= other.last_row
            && self.last_row >= other.first_row
            && self.first_col <= other.last_col
            && self.last_col >= other.first_col
    }

    /// Iterate over all cells in the region, row-major.
    pub fn cells(&self) -> impl Iterator<Item = RowCol> + '_ {
        let cols = self.first_col..=self.last_col;
        (self.first_row..=self.last_row)
            .flat_map(move |row| cols.clone().map(move |col| RowCol::new(row, col)))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.top_left())
        } else {
            write!(
                f,
                "{}:{}",
                self.top_left(),
                RowCol::new(self.last_row, self.last_col)
            )
        }
    }
}

/// Errors raised by merged-region operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("merged region {region} overlaps existing region {existing}")]
    Overlap { region: Region, existing: Region },
    #[error("merged region {region} exceeds the maximum span")]
    SpanTooLarge { region: Region },
    #[error("merged region {region} lies beyond the maximum column")]
    ColumnOutOfRange { region: Region },
    #[error("cell {0} is not the anchor of a merged region")]
    NotAnchor(RowCol),
}
