use crate::RasterSize;

/// Represents a point in the raster using row, col coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn from_row_col(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0
    }

    /// Row-major index of the cell, `None` when the cell lies outside a raster of the given size
    pub fn index_in(&self, size: RasterSize) -> Option<usize> {
        if self.is_valid() && (self.row as usize) < size.rows && (self.col as usize) < size.cols {
            Some(self.row as usize * size.cols + self.col as usize)
        } else {
            None
        }
    }
}
