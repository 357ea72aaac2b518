//! Application lifecycle management.
//!
//! Headless demo loop: builds the terrain once, then flies a camera across it
//! with a fixed timestep, streaming the visible window and submitting a shadow
//! pass and a main pass every frame.

use anyhow::{Context, Result};
use glam::Vec3;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use tessera_common::ProgramId;
use tessera_world::{
    Camera, HeightMapGenerator, LandmarkLoader, Pass, SlideAnimator, StreamingConfig,
    TerrainStreamer, VisibilityUpdate,
};

use crate::builder::ColumnBuilder;
use crate::landmark::KeepLandmark;
use crate::renderer::HeadlessRenderer;
use crate::timing::FrameTiming;

/// Program used for the shadow-map pass.
pub const SHADOW_PROGRAM: ProgramId = ProgramId::new(0);
/// Program used for lit land.
pub const LAND_PROGRAM: ProgramId = ProgramId::new(1);
/// Program used for water.
pub const WATER_PROGRAM: ProgramId = ProgramId::new(2);

/// Camera height above the highest generated terrain.
const FLIGHT_CLEARANCE: f32 = 20.0;

/// Demo loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct DemoSettings {
    /// Simulated run length in seconds
    pub seconds: f32,
    /// Fixed simulation rate
    pub fps: u32,
    /// Camera speed in world units per second
    pub speed: f32,
    /// Frames between stats reports
    pub stats_every: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            seconds: 30.0,
            fps: 60,
            speed: 40.0,
            stats_every: 120,
        }
    }
}

/// Scripted fly-through that bounces off the field edges.
#[derive(Debug)]
struct FlightPath {
    half_x: f32,
    half_z: f32,
    speed: f32,
    rng: fastrand::Rng,
}

impl FlightPath {
    fn new(config: &StreamingConfig, speed: f32) -> Self {
        Self {
            half_x: (config.world_size_x / 2) as f32 - 1.0,
            half_z: (config.world_size_z / 2) as f32 - 1.0,
            speed,
            rng: fastrand::Rng::with_seed(u64::from(config.terrain.seed)),
        }
    }

    fn step(&mut self, camera: &mut Camera, dt: f32) {
        let forward = camera.forward();
        let heading = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let next = camera.position + heading * self.speed * dt;

        if next.x.abs() > self.half_x || next.z.abs() > self.half_z {
            // Turn back with a little jitter so the path does not repeat.
            let jitter = self.rng.f32() - 0.5;
            camera.rotate(std::f32::consts::PI + jitter, 0.0);
            return;
        }
        camera.position = next;
    }
}

/// Demo application state.
struct TesseraApp {
    /// Streaming configuration
    config: StreamingConfig,
    /// Demo parameters
    settings: DemoSettings,
    /// Terrain streamer (grid + visibility window)
    streamer: TerrainStreamer,
    /// Geometry builder, kept for its mesh store
    builder: ColumnBuilder,
    /// Enter/exit slides
    animator: SlideAnimator,
    /// Draw sink
    renderer: HeadlessRenderer,
    /// Viewer
    camera: Camera,
    /// Scripted camera motion
    flight: FlightPath,
    /// Frame timing
    timing: FrameTiming,
    /// Window changes seen
    window_moves: u64,
}

impl TesseraApp {
    fn new(config: StreamingConfig, settings: DemoSettings) -> Result<Self> {
        let generator = HeightMapGenerator::new(config.terrain);
        let mut field = generator
            .generate(config.world_size_x, config.world_size_z)
            .context("Failed to generate height-field")?;
        let peak = field.samples().iter().copied().max().unwrap_or(0);

        let mut builder = ColumnBuilder::new();
        let mut landmark = KeepLandmark::new();
        let build_start = Instant::now();
        let streamer = TerrainStreamer::build(
            &mut field,
            &config,
            &mut builder,
            Some(&mut landmark as &mut dyn LandmarkLoader),
        )
        .context("Failed to build terrain grid")?;
        info!(
            "Terrain built in {:.1} ms, {} meshes, {} bytes staging left",
            build_start.elapsed().as_secs_f64() * 1000.0,
            builder.store().len(),
            builder.store().staging_bytes()
        );

        let mut camera = Camera::new(
            config.viewport_width,
            config.viewport_height,
            config.render_distance(),
        );
        camera.position = Vec3::new(0.0, peak as f32 + FLIGHT_CLEARANCE, 0.0);
        camera.rotate(std::f32::consts::FRAC_PI_2, (-15f32).to_radians());

        Ok(Self {
            flight: FlightPath::new(&config, settings.speed),
            timing: FrameTiming::new(settings.fps),
            config,
            settings,
            streamer,
            builder,
            animator: SlideAnimator::new(),
            renderer: HeadlessRenderer::new(),
            camera,
            window_moves: 0,
        })
    }

    /// Runs one frame: fixed-step simulation, visibility, two passes.
    fn frame(&mut self) {
        let start = Instant::now();
        let dt = self.timing.fixed_dt();
        for _ in 0..self.timing.accumulate(dt) {
            self.flight.step(&mut self.camera, dt);
            self.animator.tick(dt);
        }

        self.renderer.begin_frame();
        match self
            .streamer
            .update_visibility(&self.camera, &mut self.animator)
        {
            VisibilityUpdate::Moved { .. } => self.window_moves += 1,
            VisibilityUpdate::OutsideField => {
                debug!("Camera left the field at {:?}", self.camera.position);
            },
            VisibilityUpdate::Unchanged => {},
        }

        // Shadow pass, then the lit pass for land and water.
        self.streamer.draw(
            SHADOW_PROGRAM,
            &self.camera,
            Pass::Land,
            &mut self.renderer,
            &self.animator,
        );
        self.streamer.draw(
            LAND_PROGRAM,
            &self.camera,
            Pass::Land,
            &mut self.renderer,
            &self.animator,
        );
        self.streamer.draw(
            WATER_PROGRAM,
            &self.camera,
            Pass::Water,
            &mut self.renderer,
            &self.animator,
        );

        self.timing.record_frame(start.elapsed());
        if self.timing.frames() % self.settings.stats_every.max(1) == 0 {
            self.report();
        }
    }

    fn report(&self) {
        let tracker = self.streamer.tracker();
        info!(
            "t={:.1}s drawn {} / {} triangles, {} active ({} sliding out), {} draws, {:.3} ms/frame",
            self.timing.elapsed(),
            format_count(self.streamer.drawn_triangle_count()),
            format_count(self.streamer.world_triangle_count()),
            tracker.active().len(),
            tracker.pending_removal().len(),
            self.renderer.frame_draws(),
            self.timing.average_frame_time_ms()
        );
    }

    fn run(&mut self) {
        let frames = (self.settings.seconds * self.settings.fps as f32).ceil() as u64;
        info!(
            "Flying for {:.0}s ({} frames), chunk range {}, render distance {}",
            self.settings.seconds,
            frames,
            self.config.chunk_range,
            self.config.render_distance()
        );
        for _ in 0..frames {
            self.frame();
        }
    }

    fn shutdown(self) {
        info!(
            "Demo finished: {} frames, {} window moves, {} cells built",
            self.timing.frames(),
            self.window_moves,
            self.builder.cells_built()
        );
        let mut animator = self.animator;
        self.streamer.destroy(&mut animator);
    }
}

/// Run the demo with the config at `config_path` (defaults if missing).
pub fn run(config_path: &Path, settings: DemoSettings) -> Result<()> {
    let mut config = StreamingConfig::load_from(config_path);
    config.validate();

    info!("Configuration loaded:");
    info!("  World: {}x{}", config.world_size_x, config.world_size_z);
    info!("  Chunk size: {}, range: {}", config.chunk_size, config.chunk_range);
    info!("  Face merging: {}, animation: {}", config.face_merged, config.animate);

    let mut app = TesseraApp::new(config, settings)?;
    app.run();
    app.shutdown();
    Ok(())
}

/// Formats a count with commas for readability.
fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
