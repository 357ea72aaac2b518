//! Coordinate types for grid cells.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::ids::ChunkId;

/// Cell coordinate in the chunk grid.
///
/// `column` runs along world X, `row` along world Z. Coordinates are signed so
/// that window offsets around an edge cell can step outside the grid before
/// being filtered by [`GridShape::id_of`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable,
)]
#[repr(C)]
pub struct CellCoord {
    /// Column index (X axis)
    pub column: i32,
    /// Row index (Z axis)
    pub row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns the coordinate shifted by the given column/row delta.
    #[must_use]
    pub const fn offset(self, d_column: i32, d_row: i32) -> Self {
        Self {
            column: self.column + d_column,
            row: self.row + d_row,
        }
    }

    /// Chebyshev distance between two cells (the window metric).
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dc = (self.column - other.column).unsigned_abs();
        let dr = (self.row - other.row).unsigned_abs();
        if dc > dr {
            dc
        } else {
            dr
        }
    }
}

/// Dimensions of a chunk grid in cells.
///
/// Cells sharing a column are stored contiguously, so the id of a cell is
/// `column * rows + row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of columns (cells along X)
    pub columns: u32,
    /// Number of rows (cells along Z)
    pub rows: u32,
}

impl GridShape {
    /// Creates a grid shape.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Derives the shape covering a `dim_x × dim_z` field with square cells.
    #[must_use]
    pub const fn covering(dim_x: u32, dim_z: u32, chunk_size: u32) -> Self {
        Self {
            columns: dim_x.div_ceil(chunk_size),
            rows: dim_z.div_ceil(chunk_size),
        }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        (self.columns as usize) * (self.rows as usize)
    }

    /// Checks whether a coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(self, coord: CellCoord) -> bool {
        coord.column >= 0
            && coord.row >= 0
            && (coord.column as u32) < self.columns
            && (coord.row as u32) < self.rows
    }

    /// Converts a coordinate to its chunk id, or `None` when out of bounds.
    #[must_use]
    pub const fn id_of(self, coord: CellCoord) -> Option<ChunkId> {
        if self.contains(coord) {
            Some(ChunkId::new(
                coord.column as u32 * self.rows + coord.row as u32,
            ))
        } else {
            None
        }
    }

    /// Converts a chunk id back to its cell coordinate.
    #[must_use]
    pub const fn coord_of(self, id: ChunkId) -> CellCoord {
        let raw = id.raw();
        CellCoord {
            column: (raw / self.rows) as i32,
            row: (raw % self.rows) as i32,
        }
    }

    /// Returns the coordinate of the grid's central cell.
    #[must_use]
    pub const fn center(self) -> CellCoord {
        CellCoord {
            column: (self.columns / 2) as i32,
            row: (self.rows / 2) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_covering_rounds_up() {
        let shape = GridShape::covering(200, 200, 32);
        assert_eq!(shape, GridShape::new(7, 7));
        assert_eq!(shape.cell_count(), 49);

        let shape = GridShape::covering(64, 65, 32);
        assert_eq!(shape, GridShape::new(2, 3));
    }

    #[test]
    fn test_id_of_out_of_bounds() {
        let shape = GridShape::new(4, 3);
        assert_eq!(shape.id_of(CellCoord::new(-1, 0)), None);
        assert_eq!(shape.id_of(CellCoord::new(0, 3)), None);
        assert_eq!(shape.id_of(CellCoord::new(4, 0)), None);
        assert_eq!(shape.id_of(CellCoord::new(1, 2)), Some(ChunkId::new(5)));
    }

    #[test]
    fn test_columns_are_contiguous() {
        let shape = GridShape::new(3, 5);
        let first = shape.id_of(CellCoord::new(2, 0)).map(ChunkId::raw);
        let last = shape.id_of(CellCoord::new(2, 4)).map(ChunkId::raw);
        assert_eq!(first, Some(10));
        assert_eq!(last, Some(14));
    }

    #[test]
    fn test_chebyshev() {
        let a = CellCoord::new(2, 2);
        assert_eq!(a.chebyshev(CellCoord::new(3, 1)), 1);
        assert_eq!(a.chebyshev(CellCoord::new(-1, 4)), 3);
        assert_eq!(a.chebyshev(a), 0);
    }

    proptest! {
        #[test]
        fn prop_id_coord_roundtrip(columns in 1u32..40, rows in 1u32..40, seed in 0u32..1600) {
            let shape = GridShape::new(columns, rows);
            let id = ChunkId::new(seed % (columns * rows));
            let coord = shape.coord_of(id);
            prop_assert!(shape.contains(coord));
            prop_assert_eq!(shape.id_of(coord), Some(id));
        }
    }
}
