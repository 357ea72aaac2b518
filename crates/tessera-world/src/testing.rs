//! Test doubles for the builder, landmark, animator and renderer seams.

use std::cell::Cell;

use glam::{Mat4, Vec3};
use tessera_common::{ChunkId, MeshHandle, ProgramId, WorldError, WorldResult};

use crate::animator::{AnimationTarget, SlideAnimator, TransitionAnimator};
use crate::batch::{
    BatchBuilder, BatchGeometry, BatchRequest, DoneMask, GeometryBatch, MeshPart, SubBatch,
};
use crate::draw::Renderer;
use crate::heightfield::HeightField;
use crate::landmark::{LandmarkLoader, LandmarkScene};

/// Builder producing one land mesh (and optionally one water mesh) per cell.
#[derive(Debug)]
pub struct StubBuilder {
    pub water: bool,
    pub first_flags: Vec<bool>,
    pub land_calls: usize,
    pub merged_calls: usize,
    pub mask_was_clear: bool,
    pub released: usize,
    pub fail_on: Option<ChunkId>,
}

impl Default for StubBuilder {
    fn default() -> Self {
        Self {
            water: false,
            first_flags: Vec::new(),
            land_calls: 0,
            merged_calls: 0,
            mask_was_clear: true,
            released: 0,
            fail_on: None,
        }
    }
}

impl StubBuilder {
    pub const LAND_TRIANGLES: u32 = 24;
    pub const WATER_TRIANGLES: u32 = 2;

    pub fn with_water() -> Self {
        Self {
            water: true,
            ..Self::default()
        }
    }

    pub fn land_mesh(id: ChunkId) -> MeshHandle {
        MeshHandle::new(u64::from(id.raw()) * 2)
    }

    pub fn water_mesh(id: ChunkId) -> MeshHandle {
        MeshHandle::new(u64::from(id.raw()) * 2 + 1)
    }

    fn geometry(&mut self, request: &BatchRequest) -> WorldResult<BatchGeometry> {
        self.first_flags.push(request.first);
        if self.fail_on == Some(request.chunk_id) {
            return Err(WorldError::BuilderFailed {
                x: request.start_x,
                z: request.start_z,
                reason: "stub failure".to_string(),
            });
        }
        Ok(BatchGeometry {
            land: SubBatch::new(vec![MeshPart::new(
                Self::land_mesh(request.chunk_id),
                Self::LAND_TRIANGLES,
            )]),
            water: self.water.then(|| {
                SubBatch::new(vec![MeshPart::new(
                    Self::water_mesh(request.chunk_id),
                    Self::WATER_TRIANGLES,
                )])
            }),
        })
    }
}

impl BatchBuilder for StubBuilder {
    fn build_land(&mut self, _field: &HeightField, request: &BatchRequest) -> WorldResult<BatchGeometry> {
        self.land_calls += 1;
        self.geometry(request)
    }

    fn build_face_merged(
        &mut self,
        _field: &HeightField,
        request: &BatchRequest,
        done: &mut DoneMask,
    ) -> WorldResult<BatchGeometry> {
        self.merged_calls += 1;
        self.mask_was_clear &= done.is_clear() && done.size() == request.size_x;
        done.mark(0, 0);
        done.clear();
        self.geometry(request)
    }

    fn release_staging(&mut self, _batch: &GeometryBatch) {
        self.released += 1;
    }
}

/// Loader returning a unit box model.
#[derive(Debug, Default)]
pub struct StubLandmark {
    pub loads: Vec<ChunkId>,
    pub fail: bool,
}

impl StubLandmark {
    pub const TRIANGLES: u32 = 12;
}

impl LandmarkLoader for StubLandmark {
    fn load(&mut self, chunk_id: ChunkId) -> WorldResult<LandmarkScene> {
        self.loads.push(chunk_id);
        if self.fail {
            return Err(WorldError::LandmarkFailed("missing asset".to_string()));
        }
        Ok(LandmarkScene {
            meshes: vec![MeshPart::new(MeshHandle::new(u64::MAX), Self::TRIANGLES)],
            bounds_min: Vec3::new(-1.0, 0.0, -1.0),
            bounds_max: Vec3::new(1.0, 1.0, 1.0),
        })
    }
}

/// Slide animator that counts registrations and completion polls.
#[derive(Debug, Default)]
pub struct CountingAnimator {
    pub inner: SlideAnimator,
    pub registrations: usize,
    pub polls: Cell<usize>,
}

impl TransitionAnimator for CountingAnimator {
    fn reset_transform(&mut self, target: AnimationTarget) {
        self.inner.reset_transform(target);
    }

    fn displace(&mut self, target: AnimationTarget, offset: Vec3) {
        self.inner.displace(target, offset);
    }

    fn animate_translate(&mut self, target: AnimationTarget, offset: Vec3, duration: f32) {
        self.registrations += 1;
        self.inner.animate_translate(target, offset, duration);
    }

    fn has_animation(&self, target: AnimationTarget) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.inner.has_animation(target)
    }

    fn remove_animation(&mut self, target: AnimationTarget) {
        self.inner.remove_animation(target);
    }

    fn transform(&self, target: AnimationTarget) -> Mat4 {
        self.inner.transform(target)
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub mesh: MeshHandle,
    pub model: Mat4,
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl Renderer for RecordingRenderer {
    fn draw_mesh(&mut self, program: ProgramId, mesh: MeshHandle, model: Mat4) {
        self.calls.push(DrawCall {
            program,
            mesh,
            model,
        });
    }
}
