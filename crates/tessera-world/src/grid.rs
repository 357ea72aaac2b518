//! Chunk grid construction.
//!
//! The grid partitions a height-field into square cells, precomputes each
//! cell's bounds and builds one [`GeometryBatch`] per cell, eagerly and once.
//! Construction is O(field area) and never runs on the per-frame path.

use glam::Vec3;
use tessera_common::{CellCoord, ChunkId, GridShape, WorldError, WorldResult};
use tracing::{debug, info};

use crate::batch::{BatchBuilder, BatchRequest, BuilderKind, DoneMask, GeometryBatch};
use crate::chunk::ChunkInfo;
use crate::heightfield::HeightField;
use crate::landmark::{self, LandmarkLoader, LandmarkSite};

/// Parameters for building a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Cell side length in samples
    pub chunk_size: u32,
    /// Sea level in height units
    pub sea_level: f32,
    /// Builder variant
    pub builder: BuilderKind,
    /// Light direction forwarded to the builder
    pub light_dir: Vec3,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            sea_level: 25.2,
            builder: BuilderKind::FaceMerged,
            light_dir: Vec3::new(0.3, -1.0, 0.2),
        }
    }
}

/// All cells of a terrain with their geometry.
#[derive(Debug)]
pub struct ChunkGrid {
    chunk_size: u32,
    dim_x: u32,
    dim_z: u32,
    shape: GridShape,
    infos: Vec<ChunkInfo>,
    batches: Vec<GeometryBatch>,
    landmark: Option<ChunkId>,
    world_triangles: u64,
}

impl ChunkGrid {
    /// Builds the grid for a height-field.
    ///
    /// When a landmark loader is given and the field is large enough, the
    /// plateau is stamped into `field` before any geometry is built and the
    /// model is folded into the centre cell's land batch.
    pub fn build(
        field: &mut HeightField,
        options: &GridOptions,
        builder: &mut dyn BatchBuilder,
        mut landmark_loader: Option<&mut dyn LandmarkLoader>,
    ) -> WorldResult<Self> {
        let chunk_size = options.chunk_size;
        if chunk_size == 0 {
            return Err(WorldError::InvalidChunkSize(chunk_size));
        }
        let (dim_x, dim_z) = (field.dim_x(), field.dim_z());
        let shape = GridShape::covering(dim_x, dim_z, chunk_size);

        info!(
            "Building chunk grid: field {}x{}, chunk_size={}, {}x{} cells",
            dim_x, dim_z, chunk_size, shape.columns, shape.rows
        );

        let site = landmark_loader
            .as_ref()
            .and_then(|_| LandmarkSite::plan(shape.center(), chunk_size, dim_x, dim_z));
        if let Some(site) = &site {
            let written = site.stamp_plateau(field);
            debug!("Stamped landmark plateau ({} samples)", written);
        }
        let landmark_id = site.and_then(|s| shape.id_of(s.coord));

        let mut infos = Vec::with_capacity(shape.cell_count());
        for column in 0..shape.columns as i32 {
            for row in 0..shape.rows as i32 {
                let coord = CellCoord::new(column, row);
                let id = ChunkId::new(infos.len() as u32);
                let mut info = ChunkInfo::compute(id, coord, chunk_size, field, options.sea_level);
                if Some(id) == landmark_id {
                    if let Some(site) = &site {
                        info.max_height = info.max_height.max(site.top());
                    }
                }
                infos.push(info);
            }
        }

        let mut done = DoneMask::new(chunk_size);
        let mut batches = Vec::with_capacity(infos.len());
        let mut world_triangles = 0u64;

        for info in &infos {
            let request = BatchRequest {
                chunk_id: info.id,
                start_x: info.start_x,
                start_z: info.start_z,
                size_x: chunk_size,
                size_z: chunk_size,
                sea_level: options.sea_level,
                light_dir: options.light_dir,
                first: info.id.raw() == 0,
            };
            let geometry = match options.builder {
                BuilderKind::Columns => builder.build_land(field, &request)?,
                BuilderKind::FaceMerged => builder.build_face_merged(field, &request, &mut done)?,
            };
            let mut batch = GeometryBatch::new(info.id, geometry);

            if Some(info.id) == landmark_id {
                if let Some(loader) = landmark_loader.as_deref_mut() {
                    let scene = loader.load(info.id)?;
                    let parts = landmark::place_landmark(&scene, info)?;
                    landmark::fold_into(batch.land_mut(), parts);
                }
            }

            world_triangles += batch.triangles();
            builder.release_staging(&batch);
            batches.push(batch);
        }

        info!(
            "Chunk grid ready: {} cells, {} triangles{}",
            batches.len(),
            world_triangles,
            if landmark_id.is_some() {
                ", landmark placed"
            } else {
                ""
            }
        );

        Ok(Self {
            chunk_size,
            dim_x,
            dim_z,
            shape,
            infos,
            batches,
            landmark: landmark_id,
            world_triangles,
        })
    }

    /// Cell side length in samples.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Field dimensions `(x, z)` the grid was built for.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.dim_x, self.dim_z)
    }

    /// Grid shape in cells.
    #[must_use]
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// All cell descriptions, indexed by chunk id.
    #[must_use]
    pub fn infos(&self) -> &[ChunkInfo] {
        &self.infos
    }

    /// Description of one cell.
    #[must_use]
    pub fn info(&self, id: ChunkId) -> Option<&ChunkInfo> {
        self.infos.get(id.index())
    }

    /// Geometry of one cell.
    #[must_use]
    pub fn batch(&self, id: ChunkId) -> Option<&GeometryBatch> {
        self.batches.get(id.index())
    }

    /// All batches, indexed by chunk id.
    #[must_use]
    pub fn batches(&self) -> &[GeometryBatch] {
        &self.batches
    }

    /// Cell holding the landmark, if one was placed.
    #[must_use]
    pub const fn landmark(&self) -> Option<ChunkId> {
        self.landmark
    }

    /// Sum of land and water triangles over every batch.
    #[must_use]
    pub const fn world_triangles(&self) -> u64 {
        self.world_triangles
    }

    /// Finds the cell containing a world-space horizontal position.
    ///
    /// Searches columns first, testing only each column's first and last cell
    /// since a column's cells are contiguous, then scans the matching column.
    /// Positions on a padded seam resolve to the lower column/row.
    #[must_use]
    pub fn locate(&self, x: f32, z: f32) -> Option<ChunkId> {
        let rows = self.shape.rows as usize;
        if rows == 0 {
            return None;
        }
        let column = self.infos.chunks_exact(rows).position(|cells| {
            let (first, last) = (&cells[0], &cells[rows - 1]);
            first.min_xz.x <= x && first.min_xz.y <= z && last.max_xz.x >= x && last.max_xz.y >= z
        })?;
        self.infos[column * rows..(column + 1) * rows]
            .iter()
            .find(|info| info.contains_xz(x, z))
            .map(|info| info.id)
    }
}
