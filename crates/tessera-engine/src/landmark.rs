//! Procedural stand-in for the landmark model.

use glam::Vec3;
use tessera_common::{ChunkId, WorldError, WorldResult};
use tessera_world::{LandmarkLoader, LandmarkScene, MeshPart};
use tracing::debug;

use crate::mesh::{CpuMesh, MeshStore};

/// Mesh namespace for landmark meshes.
const LANDMARK_NAMESPACE: u16 = 1;

/// Builds a small keep: a wide base with a tower on top.
///
/// Boxes are in model units; the grid rescales the model to its footprint.
#[derive(Debug)]
pub struct KeepLandmark {
    store: MeshStore,
    boxes: Vec<(Vec3, Vec3)>,
}

impl Default for KeepLandmark {
    fn default() -> Self {
        Self {
            store: MeshStore::with_namespace(LANDMARK_NAMESPACE),
            boxes: vec![
                (Vec3::new(-4.0, 0.0, -2.0), Vec3::new(4.0, 1.0, 2.0)),
                (Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 5.0, 1.0)),
                (Vec3::new(-3.5, 1.0, -1.5), Vec3::new(-2.5, 2.5, -0.5)),
                (Vec3::new(2.5, 1.0, 0.5), Vec3::new(3.5, 2.5, 1.5)),
            ],
        }
    }
}

impl KeepLandmark {
    /// Creates the default keep.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes created by loads.
    #[must_use]
    pub const fn store(&self) -> &MeshStore {
        &self.store
    }
}

impl LandmarkLoader for KeepLandmark {
    fn load(&mut self, chunk_id: ChunkId) -> WorldResult<LandmarkScene> {
        let Some(&(first_min, first_max)) = self.boxes.first() else {
            return Err(WorldError::LandmarkFailed("model has no parts".to_string()));
        };

        let mut bounds_min = first_min;
        let mut bounds_max = first_max;
        let mut meshes = Vec::with_capacity(self.boxes.len());
        for &(min, max) in &self.boxes {
            bounds_min = bounds_min.min(min);
            bounds_max = bounds_max.max(max);
            let mut mesh = CpuMesh::default();
            mesh.push_box(min, max, 0.9);
            let triangles = mesh.triangles();
            meshes.push(MeshPart::new(self.store.insert(mesh), triangles));
        }

        debug!("Loaded landmark for {} ({} parts)", chunk_id, meshes.len());
        Ok(LandmarkScene {
            meshes,
            bounds_min,
            bounds_max,
        })
    }
}
