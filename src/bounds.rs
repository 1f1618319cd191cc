//! Axis-aligned bounding boxes for cheap overlap tests.
//!
//! Boxes are built from an object's raw, local-space vertex positions. The
//! scene compares them as if they were already in world space, which is exact
//! only for objects that sit at the origin with no rotation or scale. Objects
//! can opt into [`BoundingBox::transformed`] through
//! [`BoundsSpace::World`](crate::BoundsSpace::World).

use glam::{Mat4, Vec3};

/// Sentinel used as "infinity" while accumulating min/max corners.
pub const PRACTICAL_INFINITY: f32 = 1e38;

/// An axis-aligned box stored as center and half-extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Midpoint of the min and max corners.
    pub center: Vec3,
    /// Half the size on each axis. Never negative.
    pub extents: Vec3,
}

impl BoundingBox {
    /// Create a box directly from center and half-extents.
    ///
    /// Negative extents are folded to their absolute value.
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self {
            center,
            extents: extents.abs(),
        }
    }

    /// Create a box spanning two opposite corners, in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Build the smallest box enclosing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut min = Vec3::splat(PRACTICAL_INFINITY);
        let mut max = Vec3::splat(-PRACTICAL_INFINITY);
        let mut any = false;

        for p in points {
            min = min.min(p);
            max = max.max(p);
            any = true;
        }

        any.then(|| Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        })
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// True when the boxes overlap on all three axes.
    ///
    /// Boxes that only touch along a face, edge or corner count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());

        a_min.x <= b_max.x
            && a_max.x >= b_min.x
            && a_min.y <= b_max.y
            && a_max.y >= b_min.y
            && a_min.z <= b_max.z
            && a_max.z >= b_min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        point.cmpge(min).all() && point.cmple(max).all()
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min(), self.max());
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    /// Axis-aligned box enclosing this box after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        // Eight corners, never empty.
        Self::from_points(corners).unwrap_or(*self)
    }
}
