//! Geometry batches and the builder interface that produces them.
//!
//! A batch is the drawable unit for one grid cell: a land sub-batch and an
//! optional water sub-batch. Mesh construction itself lives behind the
//! [`BatchBuilder`] trait; the grid only tags, owns and accounts for the
//! result.

use glam::{Mat4, Vec3};
use tessera_common::{ChunkId, MeshHandle, WorldResult};

use crate::heightfield::HeightField;

/// Which sub-batch a draw pass or animation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pass {
    /// Terrain surface
    #[default]
    Land,
    /// Water plane
    Water,
}

/// Selects the geometry builder variant used for every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderKind {
    /// One quad per exposed face.
    Columns,
    /// Coplanar faces merged, using a shared done-marker grid.
    #[default]
    FaceMerged,
}

/// One mesh inside a sub-batch with its local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPart {
    /// Renderer-side mesh
    pub mesh: MeshHandle,
    /// Transform applied before the batch placement
    pub local: Mat4,
    /// Triangle count of the mesh
    pub triangles: u32,
}

impl MeshPart {
    /// Creates a part with an identity local transform.
    #[must_use]
    pub const fn new(mesh: MeshHandle, triangles: u32) -> Self {
        Self {
            mesh,
            local: Mat4::IDENTITY,
            triangles,
        }
    }
}

/// Meshes drawn together in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubBatch {
    parts: Vec<MeshPart>,
    triangles: u32,
}

impl SubBatch {
    /// Creates a sub-batch from its parts.
    #[must_use]
    pub fn new(parts: Vec<MeshPart>) -> Self {
        let triangles = parts.iter().map(|p| p.triangles).sum();
        Self { parts, triangles }
    }

    /// Adds a mesh to the sub-batch.
    pub fn push(&mut self, part: MeshPart) {
        self.triangles += part.triangles;
        self.parts.push(part);
    }

    /// Meshes in draw order.
    #[must_use]
    pub fn parts(&self) -> &[MeshPart] {
        &self.parts
    }

    /// Total triangle count.
    #[must_use]
    pub const fn triangles(&self) -> u32 {
        self.triangles
    }
}

/// Builder output for one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGeometry {
    /// Land surface
    pub land: SubBatch,
    /// Water surface, absent when the cell is entirely above sea level
    pub water: Option<SubBatch>,
}

/// Renderable geometry of one grid cell, owned by the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBatch {
    chunk_id: ChunkId,
    land: SubBatch,
    water: Option<SubBatch>,
}

impl GeometryBatch {
    /// Tags builder output with its cell.
    #[must_use]
    pub fn new(chunk_id: ChunkId, geometry: BatchGeometry) -> Self {
        Self {
            chunk_id,
            land: geometry.land,
            water: geometry.water,
        }
    }

    /// Owning cell.
    #[must_use]
    pub const fn chunk_id(&self) -> ChunkId {
        self.chunk_id
    }

    /// Land sub-batch.
    #[must_use]
    pub const fn land(&self) -> &SubBatch {
        &self.land
    }

    /// Water sub-batch, if any.
    #[must_use]
    pub const fn water(&self) -> Option<&SubBatch> {
        self.water.as_ref()
    }

    /// Returns the sub-batch drawn by `pass`.
    #[must_use]
    pub const fn sub_batch(&self, pass: Pass) -> Option<&SubBatch> {
        match pass {
            Pass::Land => Some(&self.land),
            Pass::Water => self.water.as_ref(),
        }
    }

    /// Whether the batch has a water surface.
    #[must_use]
    pub const fn has_water(&self) -> bool {
        self.water.is_some()
    }

    /// Land plus water triangles.
    #[must_use]
    pub fn triangles(&self) -> u64 {
        u64::from(self.land.triangles()) + self.water.as_ref().map_or(0, |w| u64::from(w.triangles()))
    }

    pub(crate) fn land_mut(&mut self) -> &mut SubBatch {
        &mut self.land
    }
}

/// Parameters of a single builder call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchRequest {
    /// Cell being built
    pub chunk_id: ChunkId,
    /// Cell origin X in samples
    pub start_x: u32,
    /// Cell origin Z in samples
    pub start_z: u32,
    /// Cell width in samples (the region may overhang the field)
    pub size_x: u32,
    /// Cell depth in samples
    pub size_z: u32,
    /// Sea level in height units
    pub sea_level: f32,
    /// Light direction for builders that bake lighting
    pub light_dir: Vec3,
    /// Set on the first call of a grid build only, for one-time shared setup
    pub first: bool,
}

/// Scratch grid of "already emitted" markers shared by face-merged builds.
///
/// The grid build allocates one mask sized to a cell and clears it once;
/// builders must leave it clear when they return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneMask {
    size: u32,
    marks: Vec<bool>,
}

impl DoneMask {
    /// Allocates a cleared `size × size` mask.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            size,
            marks: vec![false; (size as usize) * (size as usize)],
        }
    }

    /// Side length in samples.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn index(&self, x: u32, z: u32) -> Option<usize> {
        (x < self.size && z < self.size).then(|| (x as usize) * (self.size as usize) + z as usize)
    }

    /// Whether `(x, z)` (cell-local) has been marked.
    #[must_use]
    pub fn is_done(&self, x: u32, z: u32) -> bool {
        self.index(x, z).is_some_and(|i| self.marks[i])
    }

    /// Marks `(x, z)`; out-of-range positions are ignored.
    pub fn mark(&mut self, x: u32, z: u32) {
        if let Some(i) = self.index(x, z) {
            self.marks[i] = true;
        }
    }

    /// Clears every marker.
    pub fn clear(&mut self) {
        self.marks.fill(false);
    }

    /// Whether no marker is set.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        !self.marks.contains(&true)
    }
}

/// Produces geometry for grid cells.
///
/// Implementations own the created meshes' GPU/CPU resources; the grid keeps
/// only handles and triangle counts.
pub trait BatchBuilder {
    /// Builds land (and water) geometry with one quad per exposed face.
    fn build_land(&mut self, field: &HeightField, request: &BatchRequest) -> WorldResult<BatchGeometry>;

    /// Builds geometry with coplanar faces merged.
    ///
    /// The default ignores the mask and falls back to [`Self::build_land`].
    fn build_face_merged(
        &mut self,
        field: &HeightField,
        request: &BatchRequest,
        done: &mut DoneMask,
    ) -> WorldResult<BatchGeometry> {
        let _ = done;
        self.build_land(field, request)
    }

    /// Drops builder-side staging buffers that drawing does not need.
    fn release_staging(&mut self, batch: &GeometryBatch) {
        let _ = batch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_batch_counts_triangles() {
        let mut sub = SubBatch::new(vec![MeshPart::new(MeshHandle::new(1), 10)]);
        sub.push(MeshPart::new(MeshHandle::new(2), 4));
        assert_eq!(sub.triangles(), 14);
        assert_eq!(sub.parts().len(), 2);
    }

    #[test]
    fn test_batch_pass_selection() {
        let batch = GeometryBatch::new(
            ChunkId::new(3),
            BatchGeometry {
                land: SubBatch::new(vec![MeshPart::new(MeshHandle::new(1), 8)]),
                water: None,
            },
        );
        assert_eq!(batch.chunk_id(), ChunkId::new(3));
        assert!(batch.sub_batch(Pass::Land).is_some());
        assert!(batch.sub_batch(Pass::Water).is_none());
        assert_eq!(batch.triangles(), 8);
    }

    #[test]
    fn test_done_mask() {
        let mut mask = DoneMask::new(4);
        assert!(mask.is_clear());
        mask.mark(3, 1);
        mask.mark(9, 9);
        assert!(mask.is_done(3, 1));
        assert!(!mask.is_done(1, 3));
        assert!(!mask.is_done(9, 9));
        mask.clear();
        assert!(mask.is_clear());
    }
}
