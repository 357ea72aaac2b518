//! ID types for grid cells and render resources.

use serde::{Deserialize, Serialize};

/// Index of a cell in a chunk grid.
///
/// Ids are dense: a grid with `n` cells uses ids `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(u32);

impl ChunkId {
    /// Creates a chunk id from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as a slice index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk#{}", self.0)
    }
}

/// Handle to a mesh owned by a geometry builder or asset loader.
///
/// The core never looks inside a mesh; it only passes handles back to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// Creates a mesh handle from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identifier of a shader program selected by the caller for a draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(u32);

impl ProgramId {
    /// Creates a program id from a raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
