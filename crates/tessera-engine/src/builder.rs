//! Reference CPU terrain builder.
//!
//! Each height sample is a unit column. `build_land` emits one quad per top
//! face and per exposed side face; `build_face_merged` greedily merges
//! equal-height top faces into rectangles using the shared done-mask. Cells
//! with any sample below sea level get a water plane.

use glam::{Mat4, Vec3};
use tessera_common::{MeshHandle, WorldError, WorldResult};
use tessera_world::{
    BatchBuilder, BatchGeometry, BatchRequest, DoneMask, GeometryBatch, HeightField, MeshPart,
    SubBatch,
};
use tracing::debug;

use crate::mesh::{CpuMesh, MeshStore};

/// Minimum baked light on faces turned away from the light.
const AMBIENT: f32 = 0.25;

/// Builds column terrain into a [`MeshStore`].
#[derive(Debug, Default)]
pub struct ColumnBuilder {
    store: MeshStore,
    water_plane: Option<MeshHandle>,
    cells_built: usize,
}

/// Sample region of a cell clipped to the field.
#[derive(Debug, Clone, Copy)]
struct Region {
    x0: u32,
    z0: u32,
    x1: u32,
    z1: u32,
    half_x: f32,
    half_z: f32,
}

impl Region {
    fn clip(field: &HeightField, request: &BatchRequest) -> WorldResult<Self> {
        if request.start_x >= field.dim_x() || request.start_z >= field.dim_z() {
            return Err(WorldError::BuilderFailed {
                x: request.start_x,
                z: request.start_z,
                reason: "cell origin outside height-field".to_string(),
            });
        }
        Ok(Self {
            x0: request.start_x,
            z0: request.start_z,
            x1: (request.start_x + request.size_x).min(field.dim_x()),
            z1: (request.start_z + request.size_z).min(field.dim_z()),
            half_x: (field.dim_x() / 2) as f32,
            half_z: (field.dim_z() / 2) as f32,
        })
    }

    /// World-space corner of sample `(x, z)` at height `y`.
    fn world(&self, x: u32, z: u32, y: f32) -> Vec3 {
        Vec3::new(x as f32 - self.half_x, y, z as f32 - self.half_z)
    }
}

fn shade(normal: Vec3, light_dir: Vec3) -> f32 {
    AMBIENT + (1.0 - AMBIENT) * normal.dot(-light_dir).max(0.0)
}

impl ColumnBuilder {
    /// Creates a builder with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes built so far.
    #[must_use]
    pub const fn store(&self) -> &MeshStore {
        &self.store
    }

    /// Number of cells built.
    #[must_use]
    pub const fn cells_built(&self) -> usize {
        self.cells_built
    }

    /// One-time setup on the first cell of a grid build.
    fn prepare(&mut self, request: &BatchRequest) {
        if !request.first && self.water_plane.is_some() {
            return;
        }
        let mut plane = CpuMesh::default();
        plane.push_quad(
            [Vec3::ZERO, Vec3::Z, Vec3::new(1.0, 0.0, 1.0), Vec3::X],
            Vec3::Y,
            shade(Vec3::Y, request.light_dir),
        );
        self.water_plane = Some(self.store.insert(plane));
        self.cells_built = 0;
        debug!("Column builder ready, shared water plane created");
    }

    /// Emits side faces where a neighbour inside the field is lower.
    fn push_sides(mesh: &mut CpuMesh, field: &HeightField, region: &Region, x: u32, z: u32, light_dir: Vec3) {
        let Some(h) = field.get(x, z) else {
            return;
        };
        let top = h as f32;
        let neighbours = [
            (x.checked_add(1), Some(z), Vec3::X),
            (x.checked_sub(1), Some(z), Vec3::NEG_X),
            (Some(x), z.checked_add(1), Vec3::Z),
            (Some(x), z.checked_sub(1), Vec3::NEG_Z),
        ];
        for (nx, nz, normal) in neighbours {
            let (Some(nx), Some(nz)) = (nx, nz) else {
                continue;
            };
            let Some(nh) = field.get(nx, nz) else {
                continue;
            };
            if nh >= h {
                continue;
            }
            let bottom = nh as f32;
            let (ax, az, bx, bz) = if normal == Vec3::X {
                (x + 1, z, x + 1, z + 1)
            } else if normal == Vec3::NEG_X {
                (x, z + 1, x, z)
            } else if normal == Vec3::Z {
                (x + 1, z + 1, x, z + 1)
            } else {
                (x, z, x + 1, z)
            };
            mesh.push_quad(
                [
                    region.world(ax, az, bottom),
                    region.world(ax, az, top),
                    region.world(bx, bz, top),
                    region.world(bx, bz, bottom),
                ],
                normal,
                shade(normal, light_dir),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_top(mesh: &mut CpuMesh, region: &Region, x0: u32, z0: u32, x1: u32, z1: u32, h: i32, light: f32) {
        let y = h as f32;
        mesh.push_quad(
            [
                region.world(x0, z0, y),
                region.world(x0, z1, y),
                region.world(x1, z1, y),
                region.world(x1, z0, y),
            ],
            Vec3::Y,
            light,
        );
    }

    fn finish(
        &mut self,
        field: &HeightField,
        request: &BatchRequest,
        region: &Region,
        land: CpuMesh,
    ) -> BatchGeometry {
        let triangles = land.triangles();
        let land = SubBatch::new(vec![MeshPart::new(self.store.insert(land), triangles)]);

        let below_sea = (region.x0..region.x1)
            .flat_map(|x| (region.z0..region.z1).map(move |z| (x, z)))
            .any(|(x, z)| field.get(x, z).is_some_and(|h| (h as f32) < request.sea_level));

        let water = match (below_sea, self.water_plane) {
            (true, Some(plane)) => {
                let origin = region.world(region.x0, region.z0, request.sea_level);
                let extent = Vec3::new((region.x1 - region.x0) as f32, 1.0, (region.z1 - region.z0) as f32);
                Some(SubBatch::new(vec![MeshPart {
                    mesh: plane,
                    local: Mat4::from_translation(origin) * Mat4::from_scale(extent),
                    triangles: self.store.triangles(plane).unwrap_or(0),
                }]))
            },
            _ => None,
        };

        self.cells_built += 1;
        BatchGeometry { land, water }
    }
}

impl BatchBuilder for ColumnBuilder {
    fn build_land(&mut self, field: &HeightField, request: &BatchRequest) -> WorldResult<BatchGeometry> {
        self.prepare(request);
        let region = Region::clip(field, request)?;
        let top_light = shade(Vec3::Y, request.light_dir);

        let mut mesh = CpuMesh::default();
        for x in region.x0..region.x1 {
            for z in region.z0..region.z1 {
                if let Some(h) = field.get(x, z) {
                    Self::push_top(&mut mesh, &region, x, z, x + 1, z + 1, h, top_light);
                }
                Self::push_sides(&mut mesh, field, &region, x, z, request.light_dir);
            }
        }

        Ok(self.finish(field, request, &region, mesh))
    }

    fn build_face_merged(
        &mut self,
        field: &HeightField,
        request: &BatchRequest,
        done: &mut DoneMask,
    ) -> WorldResult<BatchGeometry> {
        self.prepare(request);
        let region = Region::clip(field, request)?;
        let top_light = shade(Vec3::Y, request.light_dir);
        let local = |x: u32, z: u32| (x - region.x0, z - region.z0);

        let mut mesh = CpuMesh::default();
        for x in region.x0..region.x1 {
            for z in region.z0..region.z1 {
                let (lx, lz) = local(x, z);
                if done.is_done(lx, lz) {
                    continue;
                }
                let Some(h) = field.get(x, z) else {
                    continue;
                };

                // Grow along Z, then along X while the whole strip matches.
                let mut z_end = z + 1;
                while z_end < region.z1 {
                    let (lx, lz) = local(x, z_end);
                    if done.is_done(lx, lz) || field.get(x, z_end) != Some(h) {
                        break;
                    }
                    z_end += 1;
                }
                let mut x_end = x + 1;
                while x_end < region.x1
                    && (z..z_end).all(|zz| {
                        let (lx, lz) = local(x_end, zz);
                        !done.is_done(lx, lz) && field.get(x_end, zz) == Some(h)
                    })
                {
                    x_end += 1;
                }

                for mx in x..x_end {
                    for mz in z..z_end {
                        let (lx, lz) = local(mx, mz);
                        done.mark(lx, lz);
                    }
                }
                Self::push_top(&mut mesh, &region, x, z, x_end, z_end, h, top_light);
            }
        }

        for x in region.x0..region.x1 {
            for z in region.z0..region.z1 {
                Self::push_sides(&mut mesh, field, &region, x, z, request.light_dir);
            }
        }
        done.clear();

        Ok(self.finish(field, request, &region, mesh))
    }

    fn release_staging(&mut self, batch: &GeometryBatch) {
        for part in batch.land().parts() {
            self.store.release(part.mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::ChunkId;

    fn request(start_x: u32, start_z: u32, size: u32, sea_level: f32, first: bool) -> BatchRequest {
        BatchRequest {
            chunk_id: ChunkId::new(0),
            start_x,
            start_z,
            size_x: size,
            size_z: size,
            sea_level,
            light_dir: Vec3::new(0.3, -1.0, 0.2).normalize(),
            first,
        }
    }

    #[test]
    fn test_flat_cell_per_face_and_merged() {
        let field = HeightField::flat(8, 8, 5).expect("field");
        let mut builder = ColumnBuilder::new();

        let land = builder.build_land(&field, &request(0, 0, 4, 0.0, true)).expect("land");
        assert_eq!(land.land.triangles(), 16 * 2);
        assert!(land.water.is_none());

        let mut done = DoneMask::new(4);
        let merged = builder
            .build_face_merged(&field, &request(4, 4, 4, 0.0, false), &mut done)
            .expect("merged");
        assert_eq!(merged.land.triangles(), 2);
        assert!(done.is_clear());
    }

    #[test]
    fn test_step_emits_side_faces() {
        // Columns x >= 2 are one higher than x < 2.
        let field = HeightField::from_fn(4, 4, |x, _| if x >= 2 { 6 } else { 5 }).expect("field");
        let mut builder = ColumnBuilder::new();
        let mut done = DoneMask::new(4);
        let geometry = builder
            .build_face_merged(&field, &request(0, 0, 4, 0.0, true), &mut done)
            .expect("geometry");
        // Two merged tops plus four side quads facing -X.
        assert_eq!(geometry.land.triangles(), 2 * 2 + 4 * 2);
    }

    #[test]
    fn test_water_below_sea_level() {
        let field = HeightField::from_fn(8, 8, |x, z| (x + z) as i32).expect("field");
        let mut builder = ColumnBuilder::new();
        let wet = builder.build_land(&field, &request(0, 0, 4, 3.0, true)).expect("wet");
        let water = wet.water.expect("water");
        assert_eq!(water.triangles(), 2);
        let origin = water.parts()[0].local.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(-4.0, 3.0, -4.0));

        let dry = builder.build_land(&field, &request(4, 4, 4, 3.0, false)).expect("dry");
        assert!(dry.water.is_none());
    }

    #[test]
    fn test_edge_cell_is_clipped() {
        let field = HeightField::flat(6, 6, 1).expect("field");
        let mut builder = ColumnBuilder::new();
        let geometry = builder.build_land(&field, &request(4, 4, 4, 0.0, true)).expect("edge");
        assert_eq!(geometry.land.triangles(), 4 * 2);
        assert!(builder.build_land(&field, &request(8, 0, 4, 0.0, false)).is_err());
    }

    #[test]
    fn test_release_staging_drops_cpu_data() {
        let field = HeightField::flat(4, 4, 1).expect("field");
        let mut builder = ColumnBuilder::new();
        let geometry = builder.build_land(&field, &request(0, 0, 4, 0.0, true)).expect("land");
        let batch = GeometryBatch::new(ChunkId::new(0), geometry);
        let land = batch.land().parts()[0].mesh;
        assert!(builder.store().staging(land).is_some());

        builder.release_staging(&batch);
        assert!(builder.store().staging(land).is_none());
        assert_eq!(builder.store().triangles(land), Some(32));
        assert_eq!(builder.cells_built(), 1);
    }
}
