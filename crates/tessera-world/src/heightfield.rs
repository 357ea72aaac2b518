//! Height-field storage.
//!
//! Samples are integer heights addressed by `(x, z)` in sample space. Storage
//! keeps each X column contiguous, mirroring how cells are laid out in the
//! chunk grid.

use tessera_common::{WorldError, WorldResult};

/// A rectangular grid of integer height samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightField {
    /// Samples along X
    dim_x: u32,
    /// Samples along Z
    dim_z: u32,
    /// Sample data, `dim_x * dim_z` entries, index `x * dim_z + z`
    samples: Vec<i32>,
}

impl HeightField {
    /// Wraps existing sample data.
    ///
    /// Fails when either dimension is zero or the sample count does not match.
    pub fn new(dim_x: u32, dim_z: u32, samples: Vec<i32>) -> WorldResult<Self> {
        if dim_x == 0 || dim_z == 0 || samples.len() != (dim_x as usize) * (dim_z as usize) {
            return Err(WorldError::InvalidDimensions { x: dim_x, z: dim_z });
        }
        Ok(Self {
            dim_x,
            dim_z,
            samples,
        })
    }

    /// Creates a field where every sample has the same height.
    pub fn flat(dim_x: u32, dim_z: u32, height: i32) -> WorldResult<Self> {
        Self::new(dim_x, dim_z, vec![height; (dim_x as usize) * (dim_z as usize)])
    }

    /// Creates a field by evaluating `f(x, z)` for every sample.
    pub fn from_fn(dim_x: u32, dim_z: u32, mut f: impl FnMut(u32, u32) -> i32) -> WorldResult<Self> {
        let mut samples = Vec::with_capacity((dim_x as usize) * (dim_z as usize));
        for x in 0..dim_x {
            for z in 0..dim_z {
                samples.push(f(x, z));
            }
        }
        Self::new(dim_x, dim_z, samples)
    }

    /// Samples along X.
    #[must_use]
    pub const fn dim_x(&self) -> u32 {
        self.dim_x
    }

    /// Samples along Z.
    #[must_use]
    pub const fn dim_z(&self) -> u32 {
        self.dim_z
    }

    #[inline]
    fn index(&self, x: u32, z: u32) -> usize {
        (x as usize) * (self.dim_z as usize) + (z as usize)
    }

    /// Gets the height at `(x, z)`, or `None` outside the field.
    #[must_use]
    pub fn get(&self, x: u32, z: u32) -> Option<i32> {
        if x >= self.dim_x || z >= self.dim_z {
            return None;
        }
        self.samples.get(self.index(x, z)).copied()
    }

    /// Sets the height at `(x, z)`. Returns `false` outside the field.
    pub fn set(&mut self, x: u32, z: u32, height: i32) -> bool {
        if x >= self.dim_x || z >= self.dim_z {
            return false;
        }
        let index = self.index(x, z);
        if let Some(slot) = self.samples.get_mut(index) {
            *slot = height;
            return true;
        }
        false
    }

    /// Returns the min and max height inside a square region.
    ///
    /// The region is clipped to the field; `None` when nothing remains after
    /// clipping.
    #[must_use]
    pub fn height_range(&self, start_x: u32, start_z: u32, size: u32) -> Option<(i32, i32)> {
        if start_x >= self.dim_x || start_z >= self.dim_z {
            return None;
        }
        let end_x = start_x.saturating_add(size).min(self.dim_x);
        let end_z = start_z.saturating_add(size).min(self.dim_z);
        let mut range: Option<(i32, i32)> = None;
        for x in start_x..end_x {
            let column = self.index(x, 0);
            for &h in &self.samples[column + start_z as usize..column + end_z as usize] {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(h), hi.max(h)),
                    None => (h, h),
                });
            }
        }
        range
    }

    /// Sets every sample in `[x0, x1) × [z0, z1)` to `height`.
    ///
    /// Bounds are signed and clipped to the field. Returns the number of
    /// samples written.
    pub fn fill_rect(&mut self, x0: i64, z0: i64, x1: i64, z1: i64, height: i32) -> usize {
        let x0 = x0.clamp(0, i64::from(self.dim_x)) as u32;
        let x1 = x1.clamp(0, i64::from(self.dim_x)) as u32;
        let z0 = z0.clamp(0, i64::from(self.dim_z)) as u32;
        let z1 = z1.clamp(0, i64::from(self.dim_z)) as u32;
        if z0 >= z1 {
            return 0;
        }
        let mut written = 0;
        for x in x0..x1 {
            let column = self.index(x, 0);
            for slot in &mut self.samples[column + z0 as usize..column + z1 as usize] {
                *slot = height;
                written += 1;
            }
        }
        written
    }

    /// Returns the raw samples.
    #[must_use]
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }
}
