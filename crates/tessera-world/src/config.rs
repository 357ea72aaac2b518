//! Streaming configuration.
//!
//! Terrain, grid and visibility parameters. Configuration can be loaded from
//! and saved to a TOML file; missing or broken files fall back to defaults.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::batch::BuilderKind;
use crate::generation::TerrainParams;
use crate::grid::GridOptions;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "tessera.toml";

/// Terrain streaming parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    // === World ===
    /// Height-field samples along X
    pub world_size_x: u32,
    /// Height-field samples along Z
    pub world_size_z: u32,
    /// Sea level in height units
    pub sea_level: f32,
    /// Place the landmark on the centre cell
    pub landmark: bool,

    // === Grid ===
    /// Cell side length in samples
    pub chunk_size: u32,
    /// Merge coplanar faces when building geometry
    pub face_merged: bool,
    /// Light direction handed to the geometry builder
    pub light_dir: [f32; 3],

    // === Visibility ===
    /// Window radius in cells around the camera
    pub chunk_range: u32,
    /// Slide cells in and out of view
    pub animate: bool,

    // === View ===
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,

    /// Height-field generator parameters
    pub terrain: TerrainParams,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            // World
            world_size_x: 1000,
            world_size_z: 1000,
            sea_level: 25.2,
            landmark: true,

            // Grid
            chunk_size: 32,
            face_merged: true,
            light_dir: [0.3, -1.0, 0.2],

            // Visibility
            chunk_range: 1,
            animate: true,

            // View
            viewport_width: 1280,
            viewport_height: 720,

            terrain: TerrainParams::default(),
        }
    }
}

impl StreamingConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Grid
        self.chunk_size = self.chunk_size.clamp(4, 256);
        self.chunk_range = self.chunk_range.clamp(0, 16);

        // World must hold at least one full cell
        self.world_size_x = self.world_size_x.clamp(self.chunk_size, 16_384);
        self.world_size_z = self.world_size_z.clamp(self.chunk_size, 16_384);
        if !self.sea_level.is_finite() {
            self.sea_level = Self::default().sea_level;
        }

        let light = Vec3::from(self.light_dir);
        if !light.is_finite() || light.length_squared() <= f32::EPSILON {
            self.light_dir = Self::default().light_dir;
        }

        self.viewport_width = self.viewport_width.clamp(1, 7680);
        self.viewport_height = self.viewport_height.clamp(1, 4320);

        self.terrain.validate();
    }

    /// Visible distance in world units: `chunk_size * chunk_range`.
    ///
    /// Used as the camera far plane.
    #[must_use]
    pub fn render_distance(&self) -> f32 {
        (self.chunk_size * self.chunk_range) as f32
    }

    /// Geometry builder variant.
    #[must_use]
    pub const fn builder_kind(&self) -> BuilderKind {
        if self.face_merged {
            BuilderKind::FaceMerged
        } else {
            BuilderKind::Columns
        }
    }

    /// Grid construction options.
    #[must_use]
    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            chunk_size: self.chunk_size,
            sea_level: self.sea_level,
            builder: self.builder_kind(),
            light_dir: Vec3::from(self.light_dir).normalize_or_zero(),
        }
    }
}
