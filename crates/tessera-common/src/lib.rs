//! # Tessera Common
//!
//! Common types shared by the Tessera terrain streaming crates.
//!
//! This crate provides:
//! - Cell coordinates and grid shape arithmetic
//! - ID types (ChunkId, MeshHandle, ProgramId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_cell_id() {
        let shape = GridShape::covering(200, 200, 32);
        let center = shape.center();
        assert_eq!(center, CellCoord::new(3, 3));
        assert_eq!(shape.id_of(center), Some(ChunkId::new(24)));
    }

    #[test]
    fn test_chunk_id_display() {
        assert_eq!(ChunkId::new(7).to_string(), "chunk#7");
    }
}
