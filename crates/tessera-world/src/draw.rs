//! Per-pass culling and draw submission for the active batch set.

use glam::{Mat4, Vec2};
use tessera_common::{ChunkId, MeshHandle, ProgramId};
use tracing::trace;

use crate::animator::{AnimationTarget, TransitionAnimator};
use crate::batch::Pass;
use crate::camera::Camera;
use crate::grid::ChunkGrid;

/// Horizontal distance under which a cell is drawn regardless of the frustum.
///
/// Keeps cells under and around the camera drawn when only their corners
/// poke into the view (shadow passes, steep pitch).
pub const NEAR_FIELD_RADIUS: f32 = 64.0;

/// Sink for mesh draw calls.
pub trait Renderer {
    /// Draws one mesh with `program` and the given model matrix.
    fn draw_mesh(&mut self, program: ProgramId, mesh: MeshHandle, model: Mat4);
}

/// World and per-frame drawn triangle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriangleStats {
    world: u64,
    drawn: u64,
}

impl TriangleStats {
    /// Creates counters for a world of `world` triangles.
    #[must_use]
    pub const fn new(world: u64) -> Self {
        Self { world, drawn: 0 }
    }

    /// Resets the drawn counter for a new frame.
    pub fn begin_frame(&mut self) {
        self.drawn = 0;
    }

    /// Adds drawn triangles.
    pub fn add_drawn(&mut self, triangles: u64) {
        self.drawn += triangles;
    }

    /// Triangles in the whole world.
    #[must_use]
    pub const fn world(&self) -> u64 {
        self.world
    }

    /// Triangles drawn since the last [`Self::begin_frame`].
    #[must_use]
    pub const fn drawn(&self) -> u64 {
        self.drawn
    }
}

/// Frustum-culls active batches and submits the survivors.
#[derive(Debug, Clone, Copy)]
pub struct DrawSelector {
    near_field_radius: f32,
}

impl Default for DrawSelector {
    fn default() -> Self {
        Self {
            near_field_radius: NEAR_FIELD_RADIUS,
        }
    }
}

impl DrawSelector {
    /// Creates a selector with the default near-field radius.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selector with a custom near-field radius.
    #[must_use]
    pub const fn with_near_field(radius: f32) -> Self {
        Self {
            near_field_radius: radius,
        }
    }

    /// Near-field radius in world units.
    #[must_use]
    pub const fn near_field_radius(&self) -> f32 {
        self.near_field_radius
    }

    /// Draws the `pass` sub-batch of every visible active cell.
    ///
    /// Returns the number of sub-batches submitted; their triangles are
    /// added to `stats`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        grid: &ChunkGrid,
        active: &[ChunkId],
        animator: &dyn TransitionAnimator,
        camera: &Camera,
        program: ProgramId,
        pass: Pass,
        renderer: &mut dyn Renderer,
        stats: &mut TriangleStats,
    ) -> usize {
        let frustum = camera.frustum();
        let eye = Vec2::new(camera.position.x, camera.position.z);
        let mut submitted = 0;

        for &id in active {
            let (Some(info), Some(batch)) = (grid.info(id), grid.batch(id)) else {
                continue;
            };
            let Some(sub) = batch.sub_batch(pass) else {
                continue;
            };

            let visible = frustum.intersects_aabb(&info.aabb())
                || eye.distance(info.center_xz()) <= self.near_field_radius;
            if !visible {
                continue;
            }

            let placement = animator.transform(AnimationTarget { chunk: id, pass });
            for part in sub.parts() {
                renderer.draw_mesh(program, part.mesh, placement * part.local);
            }
            stats.add_drawn(u64::from(sub.triangles()));
            submitted += 1;
        }

        trace!(
            "{:?} pass: {}/{} batches drawn",
            pass,
            submitted,
            active.len()
        );
        submitted
    }
}
