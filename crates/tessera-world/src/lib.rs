//! # Tessera World
//!
//! Chunked terrain streaming around a moving camera.
//!
//! This crate handles:
//! - Partitioning a height-field into a grid of cells with precomputed bounds
//! - Building one geometry batch per cell through a pluggable builder
//! - Tracking the camera-centred window of drawable cells
//! - Frustum culling and draw submission per pass
//! - Streaming configuration and procedural height-fields
//!
//! Mesh construction, asset loading, animation playback and rendering sit
//! behind traits ([`BatchBuilder`], [`LandmarkLoader`],
//! [`TransitionAnimator`], [`Renderer`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animator;
pub mod batch;
pub mod camera;
pub mod chunk;
pub mod config;
pub mod draw;
pub mod frustum;
pub mod generation;
pub mod grid;
pub mod heightfield;
pub mod landmark;
pub mod streaming;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animator::*;
    pub use crate::batch::*;
    pub use crate::camera::*;
    pub use crate::chunk::*;
    pub use crate::config::*;
    pub use crate::draw::*;
    pub use crate::frustum::*;
    pub use crate::generation::*;
    pub use crate::grid::*;
    pub use crate::heightfield::*;
    pub use crate::landmark::*;
    pub use crate::streaming::*;
    pub use crate::visibility::*;
}

pub use prelude::*;
