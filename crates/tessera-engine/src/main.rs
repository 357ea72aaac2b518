//! # Tessera
//!
//! Headless terrain streaming demo.
//!
//! Builds a procedural height-field, partitions it into a chunk grid and flies
//! a camera across it, streaming the visible window of cells:
//! - World: grid construction, visibility window, culling
//! - Builder: reference CPU column meshes
//! - Renderer: headless draw sink with per-program counters
//!
//! Usage: `tessera [CONFIG] [--write-config]`. Without a config path,
//! `tessera.toml` in the working directory is used if present.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod builder;
mod landmark;
mod mesh;
mod renderer;
mod timing;

use anyhow::Result;
use std::path::PathBuf;
use tessera_world::{StreamingConfig, CONFIG_FILE};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("tessera=info".parse()?))
        .init();

    info!("Tessera starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config_path = PathBuf::from(CONFIG_FILE);
    let mut write_config = false;
    for arg in std::env::args().skip(1) {
        if arg == "--write-config" {
            write_config = true;
        } else {
            config_path = PathBuf::from(arg);
        }
    }

    if write_config {
        let mut config = StreamingConfig::load_from(&config_path);
        config.validate();
        config.save_to(&config_path)?;
        return Ok(());
    }

    app::run(&config_path, app::DemoSettings::default())?;

    info!("Tessera shutdown complete");
    Ok(())
}
