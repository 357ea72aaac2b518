//! Per-cell bounds of the chunk grid.

use glam::{Vec2, Vec3};
use tessera_common::{CellCoord, ChunkId};

use crate::frustum::Aabb;
use crate::heightfield::HeightField;

/// Padding added to every side of a cell's horizontal box.
///
/// Containment tests are inclusive; the padding keeps seams between cells
/// from falling into a gap.
pub const CELL_PADDING: f32 = 1.0;

/// Immutable description of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkInfo {
    /// Cell id (index into the grid)
    pub id: ChunkId,
    /// Cell coordinate
    pub coord: CellCoord,
    /// Cell origin X in height-field samples
    pub start_x: u32,
    /// Cell origin Z in height-field samples
    pub start_z: u32,
    /// Lowest sampled height
    pub min_height: i32,
    /// Highest sampled height, never below `sea_level + 1`
    pub max_height: i32,
    /// Padded horizontal minimum (world X, world Z)
    pub min_xz: Vec2,
    /// Padded horizontal maximum (world X, world Z)
    pub max_xz: Vec2,
}

impl ChunkInfo {
    /// Computes the bounds of the cell at `coord`.
    ///
    /// World space is centred on the field midpoint. Height sampling is
    /// clipped to the field for cells overhanging its edge.
    #[must_use]
    pub fn compute(
        id: ChunkId,
        coord: CellCoord,
        chunk_size: u32,
        field: &HeightField,
        sea_level: f32,
    ) -> Self {
        let start_x = coord.column as u32 * chunk_size;
        let start_z = coord.row as u32 * chunk_size;

        let half_x = (field.dim_x() / 2) as f32;
        let half_z = (field.dim_z() / 2) as f32;
        let size = chunk_size as f32;
        let min_xz = Vec2::new(start_x as f32 - half_x, start_z as f32 - half_z);
        let max_xz = min_xz + Vec2::splat(size);

        let (min_height, max_height) = field
            .height_range(start_x, start_z, chunk_size)
            .unwrap_or((0, 0));
        let water_top = (sea_level + 1.0).ceil() as i32;

        Self {
            id,
            coord,
            start_x,
            start_z,
            min_height,
            max_height: max_height.max(water_top),
            min_xz: min_xz - Vec2::splat(CELL_PADDING),
            max_xz: max_xz + Vec2::splat(CELL_PADDING),
        }
    }

    /// Checks whether a world-space horizontal position lies in the padded box.
    #[must_use]
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        self.min_xz.x <= x && self.min_xz.y <= z && self.max_xz.x >= x && self.max_xz.y >= z
    }

    /// Horizontal centre of the padded box.
    #[must_use]
    pub fn center_xz(&self) -> Vec2 {
        (self.min_xz + self.max_xz) * 0.5
    }

    /// World-space box spanning the padded footprint and the height range.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            Vec3::new(self.min_xz.x, self.min_height as f32, self.min_xz.y),
            Vec3::new(self.max_xz.x, self.max_height as f32, self.max_xz.y),
        )
    }
}
