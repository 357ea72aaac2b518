//! Procedural height-field generation.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tessera_common::WorldResult;
use tracing::info;

use crate::heightfield::HeightField;

/// Height-field generator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// World seed
    pub seed: u32,
    /// Terrain scale in samples (larger = smoother)
    pub terrain_scale: f64,
    /// Highest generated height
    pub max_height: i32,
    /// Weight of the fine detail octave (0-1)
    pub detail: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 1453,
            terrain_scale: 175.0,
            max_height: 100,
            detail: 0.1,
        }
    }
}

impl TerrainParams {
    /// Clamps parameters to usable ranges.
    pub fn validate(&mut self) {
        self.terrain_scale = self.terrain_scale.clamp(1.0, 10_000.0);
        self.max_height = self.max_height.clamp(1, 1024);
        self.detail = self.detail.clamp(0.0, 1.0);
    }
}

/// Perlin height-field generator.
pub struct HeightMapGenerator {
    params: TerrainParams,
    terrain_noise: Perlin,
    detail_noise: Perlin,
}

impl HeightMapGenerator {
    /// Creates a generator with the given parameters.
    #[must_use]
    pub fn new(params: TerrainParams) -> Self {
        Self {
            params,
            terrain_noise: Perlin::new(params.seed),
            detail_noise: Perlin::new(params.seed.wrapping_add(1)),
        }
    }

    /// Creates a generator with default parameters and the given seed.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self::new(TerrainParams {
            seed,
            ..Default::default()
        })
    }

    /// Height at a sample position, in `0..=max_height`.
    #[must_use]
    pub fn sample(&self, x: u32, z: u32) -> i32 {
        let wx = f64::from(x) / self.params.terrain_scale;
        let wz = f64::from(z) / self.params.terrain_scale;

        let height = self.terrain_noise.get([wx, wz]);
        let detail = self.detail_noise.get([wx * 4.0, wz * 4.0]) * self.params.detail;
        let combined = ((height + detail + 1.0) / 2.0).clamp(0.0, 1.0); // Normalize to 0-1

        (combined * f64::from(self.params.max_height)).round() as i32
    }

    /// Generates a `dim_x × dim_z` height-field.
    pub fn generate(&self, dim_x: u32, dim_z: u32) -> WorldResult<HeightField> {
        let field = HeightField::from_fn(dim_x, dim_z, |x, z| self.sample(x, z))?;
        info!(
            "Generated {}x{} height-field (seed {})",
            dim_x, dim_z, self.params.seed
        );
        Ok(field)
    }

    /// Returns the generator parameters.
    #[must_use]
    pub const fn params(&self) -> &TerrainParams {
        &self.params
    }
}

impl std::fmt::Debug for HeightMapGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeightMapGenerator")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_deterministic() {
        let a = HeightMapGenerator::with_seed(42).generate(64, 48).expect("field");
        let b = HeightMapGenerator::with_seed(42).generate(64, 48).expect("field");
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let a = HeightMapGenerator::with_seed(42).generate(64, 64).expect("field");
        let b = HeightMapGenerator::with_seed(999).generate(64, 64).expect("field");
        assert_ne!(a.samples(), b.samples());
    }

    #[test]
    fn test_heights_within_range() {
        let generator = HeightMapGenerator::new(TerrainParams {
            max_height: 40,
            detail: 1.0,
            ..TerrainParams::default()
        });
        let field = generator.generate(100, 100).expect("field");
        assert!(field.samples().iter().all(|h| (0..=40).contains(h)));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(HeightMapGenerator::with_seed(1).generate(0, 10).is_err());
    }

    #[test]
    fn test_params_validation() {
        let mut params = TerrainParams {
            terrain_scale: 0.0,
            max_height: -5,
            detail: 3.0,
            ..TerrainParams::default()
        };
        params.validate();
        assert_eq!(params.terrain_scale, 1.0);
        assert_eq!(params.max_height, 1);
        assert_eq!(params.detail, 1.0);
    }
}
