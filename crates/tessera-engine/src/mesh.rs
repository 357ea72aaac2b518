//! CPU-side meshes and the handle store shared by builders and loaders.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use tessera_common::MeshHandle;

/// Terrain vertex with baked lighting.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// World-space position
    pub position: [f32; 3],
    /// Face normal
    pub normal: [f32; 3],
    /// Baked light factor (0-1)
    pub shade: f32,
}

/// Indexed triangle mesh held in CPU memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuMesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl CpuMesh {
    /// Appends a quad given counter-clockwise corners.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, shade: f32) {
        let base = self.vertices.len() as u32;
        for corner in corners {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                shade,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Appends an axis-aligned box.
    pub fn push_box(&mut self, min: Vec3, max: Vec3, shade: f32) {
        let (a, b) = (min, max);
        // +Y, -Y
        self.push_quad(
            [
                Vec3::new(a.x, b.y, a.z),
                Vec3::new(a.x, b.y, b.z),
                Vec3::new(b.x, b.y, b.z),
                Vec3::new(b.x, b.y, a.z),
            ],
            Vec3::Y,
            shade,
        );
        self.push_quad(
            [
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(b.x, a.y, a.z),
                Vec3::new(b.x, a.y, b.z),
                Vec3::new(a.x, a.y, b.z),
            ],
            Vec3::NEG_Y,
            shade,
        );
        // +X, -X
        self.push_quad(
            [
                Vec3::new(b.x, a.y, a.z),
                Vec3::new(b.x, b.y, a.z),
                Vec3::new(b.x, b.y, b.z),
                Vec3::new(b.x, a.y, b.z),
            ],
            Vec3::X,
            shade,
        );
        self.push_quad(
            [
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(a.x, a.y, b.z),
                Vec3::new(a.x, b.y, b.z),
                Vec3::new(a.x, b.y, a.z),
            ],
            Vec3::NEG_X,
            shade,
        );
        // +Z, -Z
        self.push_quad(
            [
                Vec3::new(a.x, a.y, b.z),
                Vec3::new(b.x, a.y, b.z),
                Vec3::new(b.x, b.y, b.z),
                Vec3::new(a.x, b.y, b.z),
            ],
            Vec3::Z,
            shade,
        );
        self.push_quad(
            [
                Vec3::new(a.x, a.y, a.z),
                Vec3::new(a.x, b.y, a.z),
                Vec3::new(b.x, b.y, a.z),
                Vec3::new(b.x, a.y, a.z),
            ],
            Vec3::NEG_Z,
            shade,
        );
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangles(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Bytes of vertex and index data.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        bytemuck::cast_slice::<Vertex, u8>(&self.vertices).len()
            + bytemuck::cast_slice::<u32, u8>(&self.indices).len()
    }

    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug)]
struct MeshRecord {
    triangles: u32,
    staging: Option<CpuMesh>,
}

/// Owns meshes and hands out handles for them.
///
/// Handles carry the store's namespace in their top 16 bits so several
/// stores can feed one renderer without clashing.
#[derive(Debug, Default)]
pub struct MeshStore {
    namespace: u16,
    records: Vec<MeshRecord>,
}

impl MeshStore {
    /// Creates an empty store in namespace 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store in the given namespace.
    #[must_use]
    pub fn with_namespace(namespace: u16) -> Self {
        Self {
            namespace,
            records: Vec::new(),
        }
    }

    /// Takes ownership of a mesh.
    pub fn insert(&mut self, mesh: CpuMesh) -> MeshHandle {
        let index = self.records.len() as u64;
        self.records.push(MeshRecord {
            triangles: mesh.triangles(),
            staging: Some(mesh),
        });
        MeshHandle::new((u64::from(self.namespace) << 48) | index)
    }

    fn record(&self, handle: MeshHandle) -> Option<&MeshRecord> {
        let raw = handle.raw();
        if (raw >> 48) as u16 != self.namespace {
            return None;
        }
        self.records.get((raw & 0xFFFF_FFFF_FFFF) as usize)
    }

    /// Triangle count of a stored mesh.
    #[must_use]
    pub fn triangles(&self, handle: MeshHandle) -> Option<u32> {
        self.record(handle).map(|r| r.triangles)
    }

    /// CPU data of a mesh, until released.
    #[must_use]
    pub fn staging(&self, handle: MeshHandle) -> Option<&CpuMesh> {
        self.record(handle).and_then(|r| r.staging.as_ref())
    }

    /// Drops the CPU data of a mesh, keeping its triangle count.
    pub fn release(&mut self, handle: MeshHandle) {
        let raw = handle.raw();
        if (raw >> 48) as u16 != self.namespace {
            return;
        }
        if let Some(record) = self.records.get_mut((raw & 0xFFFF_FFFF_FFFF) as usize) {
            record.staging = None;
        }
    }

    /// Bytes of CPU data still held.
    #[must_use]
    pub fn staging_bytes(&self) -> usize {
        self.records
            .iter()
            .filter_map(|r| r.staging.as_ref())
            .map(CpuMesh::byte_size)
            .sum()
    }

    /// Number of stored meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
