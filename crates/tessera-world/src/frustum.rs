//! View frustum and axis-aligned boxes for visibility culling.

use glam::{Mat4, Vec3, Vec4};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size of the box along each axis.
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Checks whether the box contains a point (inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Plane in Hessian normal form; points with `normal·p + d >= 0` are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal pointing into the frustum.
    pub normal: Vec3,
    /// Signed offset.
    pub d: f32,
}

impl Plane {
    fn from_row(row: Vec4) -> Self {
        let normal = row.truncate();
        let len = normal.length();
        if len <= f32::EPSILON {
            return Self {
                normal: Vec3::ZERO,
                d: 0.0,
            };
        }
        Self {
            normal: normal / len,
            d: row.w / len,
        }
    }

    /// Signed distance from the plane to a point.
    #[must_use]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Six-plane view frustum.
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Planes: left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes of a view-projection matrix with a `[0, 1]` depth
    /// range (glam's `perspective_rh`).
    #[must_use]
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let m = view_proj.transpose();
        let (r0, r1, r2, r3) = (m.x_axis, m.y_axis, m.z_axis, m.w_axis);

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// Tests whether a point lies inside every plane.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance(point) >= 0.0)
    }

    /// Tests whether a box is at least partially inside the frustum.
    ///
    /// Conservative: a box straddling two planes outside a frustum corner may
    /// be reported visible.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let extents = aabb.extents();
        self.planes.iter().all(|p| {
            let radius = extents.dot(p.normal.abs());
            p.distance(center) + radius >= 0.0
        })
    }
}
