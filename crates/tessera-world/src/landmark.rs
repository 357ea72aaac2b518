//! Decorative landmark stamped into the grid's centre cell.
//!
//! The landmark sits on a flattened plateau carved into the height-field
//! before any geometry is built. It is optional: when no loader is supplied
//! or the field is too small, the grid is built without it.

use glam::{Mat4, Vec3};
use tessera_common::{CellCoord, ChunkId, WorldError, WorldResult};
use tracing::{debug, info};

use crate::batch::{MeshPart, SubBatch};
use crate::chunk::ChunkInfo;
use crate::heightfield::HeightField;

/// Landmark footprint along X in samples.
pub const LANDMARK_WIDTH: u32 = 64;

/// Landmark footprint along Z in samples.
pub const LANDMARK_DEPTH: u32 = 32;

/// Height of the landmark model after rescaling.
pub const LANDMARK_HEIGHT: f32 = 16.0;

/// Height the plateau is flattened to.
pub const PLATEAU_HEIGHT: i32 = 50;

/// Gap between the plateau top and the model base.
const PLATEAU_CLEARANCE: f32 = 0.5;

/// A loaded landmark model.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkScene {
    /// Meshes making up the model
    pub meshes: Vec<MeshPart>,
    /// Model-space bounding box minimum
    pub bounds_min: Vec3,
    /// Model-space bounding box maximum
    pub bounds_max: Vec3,
}

/// Loads the landmark asset.
pub trait LandmarkLoader {
    /// Loads the model for the given cell. Failures abort grid construction.
    fn load(&mut self, chunk_id: ChunkId) -> WorldResult<LandmarkScene>;
}

/// Where the landmark goes in a particular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkSite {
    /// Centre cell coordinate
    pub coord: CellCoord,
    /// Centre cell origin X in samples
    pub start_x: u32,
    /// Centre cell origin Z in samples
    pub start_z: u32,
}

impl LandmarkSite {
    /// Picks the site for a field, or `None` when the field is too small.
    #[must_use]
    pub fn plan(coord: CellCoord, chunk_size: u32, dim_x: u32, dim_z: u32) -> Option<Self> {
        if dim_x <= 2 * LANDMARK_WIDTH || dim_z <= 2 * LANDMARK_DEPTH {
            debug!(
                "Field {}x{} too small for landmark, skipping",
                dim_x, dim_z
            );
            return None;
        }
        Some(Self {
            coord,
            start_x: coord.column as u32 * chunk_size,
            start_z: coord.row as u32 * chunk_size,
        })
    }

    /// Flattens the plateau around the site.
    ///
    /// The plateau spans `[-w/2, 1.5w) × [-d/2, 1.5d)` around the cell origin,
    /// clipped to the field. Returns the number of samples written.
    pub fn stamp_plateau(&self, field: &mut HeightField) -> usize {
        let x0 = i64::from(self.start_x) - i64::from(LANDMARK_WIDTH / 2);
        let z0 = i64::from(self.start_z) - i64::from(LANDMARK_DEPTH / 2);
        let x1 = i64::from(self.start_x) + i64::from(LANDMARK_WIDTH * 3 / 2);
        let z1 = i64::from(self.start_z) + i64::from(LANDMARK_DEPTH * 3 / 2);
        field.fill_rect(x0, z0, x1, z1, PLATEAU_HEIGHT)
    }

    /// Highest point reached by the placed model.
    #[must_use]
    pub fn top(&self) -> i32 {
        (PLATEAU_HEIGHT as f32 + PLATEAU_CLEARANCE + LANDMARK_HEIGHT).ceil() as i32
    }
}

/// Rescales a loaded model to the plateau footprint and places it on the
/// plateau, anchored at the cell's padded minimum corner.
pub fn place_landmark(scene: &LandmarkScene, cell: &ChunkInfo) -> WorldResult<Vec<MeshPart>> {
    let size = scene.bounds_max - scene.bounds_min;
    for (axis, extent) in [('x', size.x), ('y', size.y), ('z', size.z)] {
        if extent.abs() <= f32::EPSILON {
            return Err(WorldError::DegenerateLandmark { axis });
        }
    }

    let scale = Vec3::new(
        LANDMARK_WIDTH as f32 / size.x,
        LANDMARK_HEIGHT / size.y,
        LANDMARK_DEPTH as f32 / size.z,
    );
    let scaled_min = scene.bounds_min * scale;
    let translation = Vec3::new(
        cell.min_xz.x - scaled_min.x,
        PLATEAU_HEIGHT as f32 + PLATEAU_CLEARANCE - scaled_min.y,
        cell.min_xz.y - scaled_min.z,
    );
    let placement = Mat4::from_translation(translation) * Mat4::from_scale(scale);

    info!(
        "Placing landmark in {} at ({:.1}, {:.1}, {:.1})",
        cell.id, translation.x, translation.y, translation.z
    );

    Ok(scene
        .meshes
        .iter()
        .map(|part| MeshPart {
            local: placement * part.local,
            ..*part
        })
        .collect())
}

/// Appends placed landmark meshes to a land sub-batch.
pub(crate) fn fold_into(land: &mut SubBatch, parts: Vec<MeshPart>) {
    for part in parts {
        land.push(part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tessera_common::MeshHandle;

    fn centre_cell() -> ChunkInfo {
        ChunkInfo {
            id: ChunkId::new(12),
            coord: CellCoord::new(2, 2),
            start_x: 64,
            start_z: 64,
            min_height: 0,
            max_height: 60,
            min_xz: Vec2::new(-1.0, -1.0),
            max_xz: Vec2::new(33.0, 33.0),
        }
    }

    #[test]
    fn test_plan_requires_large_field() {
        assert!(LandmarkSite::plan(CellCoord::new(2, 2), 32, 128, 200).is_none());
        assert!(LandmarkSite::plan(CellCoord::new(2, 2), 32, 200, 64).is_none());
        let site = LandmarkSite::plan(CellCoord::new(2, 2), 32, 129, 65).expect("site");
        assert_eq!((site.start_x, site.start_z), (64, 64));
    }

    #[test]
    fn test_stamp_plateau_extent() {
        let mut field = HeightField::flat(200, 200, 3).expect("field");
        let site = LandmarkSite::plan(CellCoord::new(3, 3), 32, 200, 200).expect("site");
        let written = site.stamp_plateau(&mut field);
        assert_eq!(written, 128 * 64);
        // x in [64, 192), z in [80, 144)
        assert_eq!(field.get(64, 80), Some(PLATEAU_HEIGHT));
        assert_eq!(field.get(191, 143), Some(PLATEAU_HEIGHT));
        assert_eq!(field.get(63, 100), Some(3));
        assert_eq!(field.get(100, 144), Some(3));
    }

    #[test]
    fn test_stamp_plateau_clips_at_edge() {
        let mut field = HeightField::flat(150, 80, 0).expect("field");
        let site = LandmarkSite::plan(CellCoord::new(2, 1), 32, 150, 80).expect("site");
        // x in [32, 160) clipped to 150, z in [16, 80)
        assert_eq!(site.stamp_plateau(&mut field), 118 * 64);
    }

    #[test]
    fn test_place_landmark_fits_footprint() {
        let scene = LandmarkScene {
            meshes: vec![MeshPart::new(MeshHandle::new(7), 12)],
            bounds_min: Vec3::new(-5.0, 0.0, -2.0),
            bounds_max: Vec3::new(5.0, 4.0, 2.0),
        };
        let parts = place_landmark(&scene, &centre_cell()).expect("placed");
        assert_eq!(parts.len(), 1);
        let m = parts[0].local;
        let lo = m.transform_point3(scene.bounds_min);
        let hi = m.transform_point3(scene.bounds_max);
        assert!((lo - Vec3::new(-1.0, 50.5, -1.0)).length() < 1e-4);
        assert!((hi - Vec3::new(63.0, 66.5, 31.0)).length() < 1e-4);
    }

    #[test]
    fn test_place_landmark_rejects_flat_bounds() {
        let scene = LandmarkScene {
            meshes: Vec::new(),
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::new(1.0, 0.0, 1.0),
        };
        assert!(matches!(
            place_landmark(&scene, &centre_cell()),
            Err(WorldError::DegenerateLandmark { axis: 'y' })
        ));
    }
}
