//! Error types for Tessera.

use thiserror::Error;

/// Top-level error type for Tessera operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// World/grid errors
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Grid construction errors.
///
/// Optional features whose preconditions are unmet (such as the landmark on a
/// field that is too small) are skipped and never produce an error.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Height-field dimensions are zero or do not match the sample count
    #[error("Invalid height-field dimensions {x}x{z}")]
    InvalidDimensions {
        /// Samples along X
        x: u32,
        /// Samples along Z
        z: u32,
    },

    /// Chunk size must be non-zero
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(u32),

    /// Geometry builder reported a failure
    #[error("Geometry builder failed for cell ({x}, {z}): {reason}")]
    BuilderFailed {
        /// Cell origin X in height-field samples
        x: u32,
        /// Cell origin Z in height-field samples
        z: u32,
        /// Builder-supplied reason
        reason: String,
    },

    /// Landmark asset could not be loaded
    #[error("Failed to load landmark: {0}")]
    LandmarkFailed(String),

    /// Landmark asset has a degenerate bounding box
    #[error("Landmark bounds are degenerate on axis {axis}")]
    DegenerateLandmark {
        /// Axis name (x, y or z)
        axis: char,
    },
}

/// Result type alias for Tessera operations.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Result type alias for grid operations.
pub type WorldResult<T> = Result<T, WorldError>;
