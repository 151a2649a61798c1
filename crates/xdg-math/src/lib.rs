#![warn(missing_docs)]

//! Linear-algebra primitives shared across the xdg crates.
//!
//! Thin wrappers around `nalgebra` providing the point/vector/direction
//! types, an axis-aligned bounding box, and the numerical-tolerance
//! constants the intersection kernels and acceleration structures are
//! built against.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Tolerance below which a Plücker permuted-product is treated as exactly
/// zero (coplanar edge case in the ray-triangle test).
pub const PLUCKER_ZERO_TOL: f64 = 1e-10;

/// General numerical-precision floor used for bounding-box dilation and
/// other places where an exact zero would be too strict. Roughly matches
/// the coarse tolerance DAGMC-style mesh geometry libraries use for
/// acceleration-structure slack.
pub const NUMERICAL_PRECISION: f64 = 1e-3;

/// Hard limit on BVH recursion depth; a tree deeper than this indicates a
/// degenerate partition (e.g. many coincident primitives) rather than a
/// legitimately large model.
pub const MAX_BVH_DEPTH: usize = 64;

/// Returns true if `x` is within `tol` of zero.
#[inline]
pub fn nearly_zero(x: f64, tol: f64) -> bool {
    x.abs() < tol
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for incremental expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand this AABB in place to include a point.
    pub fn update(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest AABB containing both `self` and `other`.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        let mut out = *self;
        out.update(&other.min);
        out.update(&other.max);
        out
    }

    /// Test whether `p` lies within this box (inclusive of the boundary).
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Expand the AABB by `tol` in every direction.
    pub fn dilate(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Length of the box's diagonal.
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Geometric center of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Surface area of the box, used by SAH bucket costing during BVH build.
    pub fn surface_area(&self) -> f64 {
        let d = self.max - self.min;
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            return 0.0;
        }
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_then_update_matches_points() {
        let mut b = Aabb3::empty();
        b.update(&Point3::new(1.0, -2.0, 3.0));
        b.update(&Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(u.max, Point3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn contains_respects_boundary() {
        let b = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(b.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(b.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!b.contains(&Point3::new(1.0001, 0.0, 0.0)));
    }

    #[test]
    fn overlaps_detects_touching_boxes() {
        let a = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        let c = Aabb3::new(Point3::new(1.1, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn diagonal_of_unit_cube_is_sqrt3() {
        let b = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        approx::assert_relative_eq!(b.diagonal(), 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn nearly_zero_respects_tolerance() {
        assert!(nearly_zero(1e-12, PLUCKER_ZERO_TOL));
        assert!(!nearly_zero(1e-3, PLUCKER_ZERO_TOL));
    }

    /// Tiny deterministic LCG so property loops below are reproducible
    /// without pulling in a random-number crate.
    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    #[test]
    fn diagonal_matches_pythagorean_sum_over_sampled_boxes() {
        let mut seed = 0x5EED_u64;
        for _ in 0..200 {
            let dx = lcg(&mut seed) * 100.0 - 50.0;
            let dy = lcg(&mut seed) * 100.0 - 50.0;
            let dz = lcg(&mut seed) * 100.0 - 50.0;
            let min = Point3::new(0.0, 0.0, 0.0);
            let max = Point3::new(dx, dy, dz);
            let b = Aabb3::new(min, max);
            let expected = (dx * dx + dy * dy + dz * dz).sqrt();
            approx::assert_relative_eq!(b.diagonal(), expected, epsilon = 1e-9);
        }
    }
}
