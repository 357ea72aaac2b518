//! Terrain streaming: grid, visibility window and draw selection together.

use tessera_common::{ProgramId, WorldResult};
use tracing::info;

use crate::animator::TransitionAnimator;
use crate::batch::{BatchBuilder, Pass};
use crate::camera::Camera;
use crate::config::StreamingConfig;
use crate::draw::{DrawSelector, Renderer, TriangleStats};
use crate::grid::ChunkGrid;
use crate::heightfield::HeightField;
use crate::landmark::LandmarkLoader;
use crate::visibility::{self, VisibilityTracker, VisibilityUpdate};

/// Streams a prebuilt chunk grid around a moving camera.
///
/// Call [`Self::update_visibility`] once per frame, then [`Self::draw`] once
/// per pass. The drawn triangle counter covers every pass since the last
/// update.
#[derive(Debug)]
pub struct TerrainStreamer {
    grid: ChunkGrid,
    tracker: VisibilityTracker,
    selector: DrawSelector,
    stats: TriangleStats,
    animate: bool,
}

impl TerrainStreamer {
    /// Builds the grid for `field` and an empty visibility window.
    ///
    /// The landmark loader is ignored when the config disables the landmark.
    pub fn build(
        field: &mut HeightField,
        config: &StreamingConfig,
        builder: &mut dyn BatchBuilder,
        landmark: Option<&mut dyn LandmarkLoader>,
    ) -> WorldResult<Self> {
        let landmark = if config.landmark { landmark } else { None };
        let grid = ChunkGrid::build(field, &config.grid_options(), builder, landmark)?;
        Ok(Self::from_grid(grid, config.chunk_range, config.animate))
    }

    /// Wraps an existing grid.
    #[must_use]
    pub fn from_grid(grid: ChunkGrid, chunk_range: u32, animate: bool) -> Self {
        let stats = TriangleStats::new(grid.world_triangles());
        Self {
            grid,
            tracker: VisibilityTracker::new(chunk_range),
            selector: DrawSelector::new(),
            stats,
            animate,
        }
    }

    /// Replaces the draw selector.
    #[must_use]
    pub fn with_selector(mut self, selector: DrawSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Enables or disables enter/exit slides for later updates.
    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    /// Whether window changes slide cells in and out.
    #[must_use]
    pub const fn animate(&self) -> bool {
        self.animate
    }

    /// Starts a frame: resets the drawn counter and moves the window to the
    /// camera.
    pub fn update_visibility(
        &mut self,
        camera: &Camera,
        animator: &mut dyn TransitionAnimator,
    ) -> VisibilityUpdate {
        self.stats.begin_frame();
        self.tracker
            .update(&self.grid, camera.position, self.animate, animator)
    }

    /// Draws one pass of the active set. Returns the number of sub-batches
    /// submitted.
    pub fn draw(
        &mut self,
        program: ProgramId,
        camera: &Camera,
        pass: Pass,
        renderer: &mut dyn Renderer,
        animator: &dyn TransitionAnimator,
    ) -> usize {
        self.selector.draw(
            &self.grid,
            self.tracker.active(),
            animator,
            camera,
            program,
            pass,
            renderer,
            &mut self.stats,
        )
    }

    /// Triangles in every batch of the world.
    #[must_use]
    pub const fn world_triangle_count(&self) -> u64 {
        self.stats.world()
    }

    /// Triangles drawn since the last visibility update.
    #[must_use]
    pub const fn drawn_triangle_count(&self) -> u64 {
        self.stats.drawn()
    }

    /// Underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Visibility window state.
    #[must_use]
    pub const fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    /// Tears down the streamer, dropping in-flight slides of active batches.
    pub fn destroy(mut self, animator: &mut dyn TransitionAnimator) {
        let active = self.tracker.clear();
        for &id in &active {
            for target in visibility::targets(&self.grid, id) {
                animator.remove_animation(target);
            }
        }
        info!(
            "Terrain streamer destroyed: {} cells, {} were active",
            self.grid.len(),
            active.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{AnimationTarget, SlideAnimator, SLIDE_DURATION};
    use crate::testing::{RecordingRenderer, StubBuilder, StubLandmark};
    use glam::Vec3;
    use tessera_common::CellCoord;

    fn example_config() -> StreamingConfig {
        StreamingConfig {
            world_size_x: 200,
            world_size_z: 200,
            ..StreamingConfig::default()
        }
    }

    fn example_streamer() -> TerrainStreamer {
        let mut field = HeightField::flat(200, 200, 10).expect("field");
        TerrainStreamer::build(&mut field, &example_config(), &mut StubBuilder::with_water(), None)
            .expect("streamer")
    }

    fn camera_at(x: f32, z: f32) -> Camera {
        let mut camera = Camera::new(800, 600, 32.0);
        camera.position = Vec3::new(x, 40.0, z);
        camera
    }

    #[test]
    fn test_example_world() {
        let mut streamer = example_streamer();
        let mut animator = SlideAnimator::new();
        assert_eq!(streamer.grid().len(), 49);
        let per_cell = u64::from(StubBuilder::LAND_TRIANGLES + StubBuilder::WATER_TRIANGLES);
        assert_eq!(streamer.world_triangle_count(), 49 * per_cell);

        streamer.update_visibility(&camera_at(0.0, 0.0), &mut animator);
        assert_eq!(streamer.tracker().active().len(), 9);
    }

    #[test]
    fn test_drawn_counter_spans_passes_and_resets() {
        let mut streamer = example_streamer();
        let mut animator = SlideAnimator::new();
        let camera = camera_at(0.0, 0.0);
        let mut renderer = RecordingRenderer::default();

        streamer.update_visibility(&camera, &mut animator);
        let land = streamer.draw(ProgramId::new(1), &camera, Pass::Land, &mut renderer, &animator);
        let after_land = streamer.drawn_triangle_count();
        let water = streamer.draw(ProgramId::new(1), &camera, Pass::Water, &mut renderer, &animator);

        assert!(land > 0);
        assert_eq!(after_land, land as u64 * u64::from(StubBuilder::LAND_TRIANGLES));
        assert_eq!(
            streamer.drawn_triangle_count(),
            after_land + water as u64 * u64::from(StubBuilder::WATER_TRIANGLES)
        );
        assert!(streamer.drawn_triangle_count() <= streamer.world_triangle_count());

        streamer.update_visibility(&camera, &mut animator);
        assert_eq!(streamer.drawn_triangle_count(), 0);
    }

    #[test]
    fn test_landmark_follows_config() {
        let mut field = HeightField::flat(200, 200, 10).expect("field");
        let mut loader = StubLandmark::default();
        let config = StreamingConfig {
            landmark: false,
            ..example_config()
        };
        let streamer =
            TerrainStreamer::build(&mut field, &config, &mut StubBuilder::default(), Some(&mut loader))
                .expect("streamer");
        assert!(streamer.grid().landmark().is_none());
        assert!(loader.loads.is_empty());

        let streamer = TerrainStreamer::build(
            &mut field,
            &example_config(),
            &mut StubBuilder::default(),
            Some(&mut loader),
        )
        .expect("streamer");
        assert!(streamer.grid().landmark().is_some());
    }

    #[test]
    fn test_destroy_drops_active_animations() {
        let mut streamer = example_streamer();
        let mut animator = SlideAnimator::new();
        streamer.update_visibility(&camera_at(0.0, 0.0), &mut animator);
        streamer.update_visibility(&camera_at(32.0, 0.0), &mut animator);
        assert!(animator.active_count() > 0);

        streamer.destroy(&mut animator);
        assert_eq!(animator.active_count(), 0);
    }

    #[test]
    fn test_animation_toggle() {
        let mut streamer = example_streamer();
        let mut animator = SlideAnimator::new();
        streamer.set_animate(false);
        assert!(!streamer.animate());
        streamer.update_visibility(&camera_at(0.0, 0.0), &mut animator);
        streamer.update_visibility(&camera_at(32.0, 0.0), &mut animator);
        assert_eq!(animator.active_count(), 0);
        assert_eq!(streamer.tracker().active().len(), 9);
    }

    #[test]
    fn test_cell_sunk_while_animating_returns_at_rest() {
        let mut streamer = example_streamer();
        let mut animator = SlideAnimator::new();
        let shape = streamer.grid().shape();
        let back = shape.id_of(CellCoord::new(2, 3)).expect("in grid");

        streamer.update_visibility(&camera_at(0.0, 0.0), &mut animator);
        streamer.update_visibility(&camera_at(32.0, 0.0), &mut animator);
        animator.tick(2.0 * SLIDE_DURATION);
        assert!(animator.translation(AnimationTarget::land(back)).y < 0.0);

        streamer.set_animate(false);
        streamer.update_visibility(&camera_at(0.0, 0.0), &mut animator);
        assert!(streamer.tracker().is_active(back));
        assert_eq!(animator.translation(AnimationTarget::land(back)), Vec3::ZERO);
        assert_eq!(animator.translation(AnimationTarget::water(back)), Vec3::ZERO);
    }
}
