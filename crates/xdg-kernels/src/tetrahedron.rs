//! Tetrahedron point-containment via barycentric inversion.

use nalgebra::Matrix3;
use xdg_math::{Point3, PLUCKER_ZERO_TOL};

/// Barycentric coordinates of `p` with respect to tetrahedron
/// `(v0, v1, v2, v3)`, or `None` if the tetrahedron is degenerate
/// (zero volume, singular coefficient matrix).
///
/// `lambda[0]` is the weight of `v0` (`1 - lambda[1] - lambda[2] - lambda[3]`);
/// the rest solve `T * lambda[1..] = p - v0` where `T`'s columns are the
/// tet's three edges from `v0`.
pub fn barycentric(p: Point3, verts: [Point3; 4]) -> Option<[f64; 4]> {
    let [v0, v1, v2, v3] = verts;
    let t = Matrix3::from_columns(&[v1 - v0, v2 - v0, v3 - v0]);
    let inv = t.try_inverse()?;
    let rhs = p - v0;
    let lambda = inv * rhs;
    let l0 = 1.0 - lambda.x - lambda.y - lambda.z;
    Some([l0, lambda.x, lambda.y, lambda.z])
}

/// True if `p` lies inside (or on the boundary of) the tetrahedron
/// `(v0, v1, v2, v3)`, within `PLUCKER_ZERO_TOL` of each face.
pub fn contains(p: Point3, verts: [Point3; 4]) -> bool {
    match barycentric(p, verts) {
        Some(lambda) => lambda
            .iter()
            .all(|&l| l >= -PLUCKER_ZERO_TOL && l <= 1.0 + PLUCKER_ZERO_TOL),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> [Point3; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn centroid_is_inside() {
        let tet = unit_tet();
        let centroid = Point3::new(0.25, 0.25, 0.25);
        assert!(contains(centroid, tet));
    }

    #[test]
    fn vertex_is_inside() {
        let tet = unit_tet();
        assert!(contains(tet[1], tet));
    }

    #[test]
    fn far_point_is_outside() {
        let tet = unit_tet();
        assert!(!contains(Point3::new(5.0, 5.0, 5.0), tet));
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let tet = unit_tet();
        let lambda = barycentric(Point3::new(0.2, 0.2, 0.2), tet).unwrap();
        let sum: f64 = lambda.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    /// Barycentric weights of a point built as a convex combination of the
    /// tet's own vertices must sum to one and classify as contained,
    /// regardless of which combination is sampled.
    #[test]
    fn barycentric_combinations_of_the_vertices_are_always_contained() {
        let tet = unit_tet();
        let mut seed = 0x7E7_u64;
        for _ in 0..200 {
            let mut w = [lcg(&mut seed), lcg(&mut seed), lcg(&mut seed), lcg(&mut seed)];
            let total: f64 = w.iter().sum();
            for wi in &mut w {
                *wi /= total;
            }
            let p = Point3::from(
                w[0] * tet[0].coords + w[1] * tet[1].coords + w[2] * tet[2].coords + w[3] * tet[3].coords,
            );
            let lambda = barycentric(p, tet).expect("non-degenerate tet always invertible");
            approx::assert_relative_eq!(lambda.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            assert!(contains(p, tet));
        }
    }

    #[test]
    fn degenerate_tetrahedron_reports_no_containment() {
        let flat = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        assert!(!contains(Point3::new(1.5, 0.0, 0.0), flat));
    }
}
