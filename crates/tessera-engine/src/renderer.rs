//! Headless renderer that records draw submissions.
//!
//! Stands in for a GPU backend: it validates handles against the known mesh
//! stores and keeps per-program counters for the stats report.

use ahash::AHashMap;
use glam::Mat4;
use tessera_common::{MeshHandle, ProgramId};
use tessera_world::Renderer;
use tracing::warn;

/// Per-program draw counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramStats {
    /// Meshes drawn this frame
    pub frame_draws: u64,
    /// Meshes drawn since start
    pub total_draws: u64,
}

/// Renderer without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    programs: AHashMap<ProgramId, ProgramStats>,
    frame: u64,
    lowest_origin: Option<f32>,
}

impl HeadlessRenderer {
    /// Creates a renderer with no recorded draws.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a frame, clearing per-frame counters.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.lowest_origin = None;
        for stats in self.programs.values_mut() {
            stats.frame_draws = 0;
        }
    }

    /// Frames started so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Counters for one program.
    #[must_use]
    pub fn program(&self, program: ProgramId) -> ProgramStats {
        self.programs.get(&program).copied().unwrap_or_default()
    }

    /// Draws submitted this frame across all programs.
    #[must_use]
    pub fn frame_draws(&self) -> u64 {
        self.programs.values().map(|s| s.frame_draws).sum()
    }

    /// Lowest model origin Y drawn this frame; reveals cells mid-slide.
    #[must_use]
    pub const fn lowest_origin(&self) -> Option<f32> {
        self.lowest_origin
    }
}

impl Renderer for HeadlessRenderer {
    fn draw_mesh(&mut self, program: ProgramId, mesh: MeshHandle, model: Mat4) {
        if !model.is_finite() {
            warn!("Skipping {:?}: non-finite model matrix", mesh);
            return;
        }
        let stats = self.programs.entry(program).or_default();
        stats.frame_draws += 1;
        stats.total_draws += 1;

        let y = model.w_axis.y;
        self.lowest_origin = Some(self.lowest_origin.map_or(y, |low| low.min(y)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_counts_per_program_and_frame() {
        let mut renderer = HeadlessRenderer::new();
        renderer.begin_frame();
        renderer.draw_mesh(ProgramId::new(0), MeshHandle::new(1), Mat4::IDENTITY);
        renderer.draw_mesh(ProgramId::new(1), MeshHandle::new(1), Mat4::IDENTITY);
        renderer.draw_mesh(ProgramId::new(1), MeshHandle::new(2), Mat4::IDENTITY);
        assert_eq!(renderer.frame_draws(), 3);
        assert_eq!(renderer.program(ProgramId::new(1)).frame_draws, 2);

        renderer.begin_frame();
        assert_eq!(renderer.frame_draws(), 0);
        assert_eq!(renderer.program(ProgramId::new(1)).total_draws, 2);
        assert_eq!(renderer.frame(), 2);
    }

    #[test]
    fn test_tracks_lowest_origin() {
        let mut renderer = HeadlessRenderer::new();
        renderer.begin_frame();
        renderer.draw_mesh(
            ProgramId::new(0),
            MeshHandle::new(1),
            Mat4::from_translation(Vec3::new(0.0, -40.0, 0.0)),
        );
        renderer.draw_mesh(ProgramId::new(0), MeshHandle::new(2), Mat4::IDENTITY);
        assert_eq!(renderer.lowest_origin(), Some(-40.0));
    }

    #[test]
    fn test_rejects_non_finite_model() {
        let mut renderer = HeadlessRenderer::new();
        renderer.draw_mesh(ProgramId::new(0), MeshHandle::new(1), Mat4::from_scale(Vec3::splat(f32::NAN)));
        assert_eq!(renderer.frame_draws(), 0);
    }
}
