//! Plücker-coordinate ray/triangle intersection.

use xdg_math::{nearly_zero, Point3, Vec3, PLUCKER_ZERO_TOL};

/// Result of a successful ray/triangle intersection.
#[derive(Debug, Clone, Copy)]
pub struct RayTriangleHit {
    /// Ray parameter at the intersection point.
    pub t: f64,
    /// The intersection point.
    pub point: Point3,
    /// Barycentric weights `(w0, w1, w2)` for `triangle[0..3]`.
    pub barycentric: [f64; 3],
}

/// True if `a` sorts before `b` in a fixed, total lexicographic order over
/// `(x, y, z)`. Used in place of a stable vertex-id comparison (which this
/// kernel doesn't have access to, operating on raw positions) to pick a
/// canonical direction for each triangle edge, so two triangles sharing an
/// edge test that edge identically regardless of winding.
fn lex_less(a: &Point3, b: &Point3) -> bool {
    if a.x != b.x {
        return a.x < b.x;
    }
    if a.y != b.y {
        return a.y < b.y;
    }
    a.z < b.z
}

/// Plücker permuted inner product of the ray `(raya, rayb)` against the
/// canonical edge `(edge_dir, edge_origin)`.
fn side(raya: Vec3, rayb: Vec3, edge_dir: Vec3, edge_origin: Point3) -> f64 {
    raya.dot(&edge_dir.cross(&edge_origin.coords)) + rayb.dot(&edge_dir)
}

/// Intersect a ray with a triangle using the Plücker-coordinate test.
///
/// `orientation`, when given, is the signed direction the triangle must be
/// crossed in (`> 0.0` or `< 0.0`); when absent, either crossing direction
/// is accepted as long as all three edge tests agree in sign. `near` bounds
/// the ray parameter from below (default: `t > 0`, i.e. in front of the
/// ray's origin — pass a negative `near` to allow a controlled amount of
/// travel behind the origin); `far` bounds it from above.
pub fn ray_triangle(
    origin: Point3,
    direction: Vec3,
    triangle: [Point3; 3],
    orientation: Option<f64>,
    near: Option<f64>,
    far: f64,
) -> Option<RayTriangleHit> {
    let raya = direction;
    let rayb = direction.cross(&origin.coords);

    let edges = [
        (triangle[0], triangle[1]),
        (triangle[1], triangle[2]),
        (triangle[2], triangle[0]),
    ];

    let mut pip = [0.0_f64; 3];
    for (i, &(va, vb)) in edges.iter().enumerate() {
        let (lower, upper, flipped) = if lex_less(&va, &vb) {
            (va, vb, false)
        } else {
            (vb, va, true)
        };
        let edge_dir = upper - lower;
        let mut p = side(raya, rayb, edge_dir, lower);
        if flipped {
            p = -p;
        }
        if nearly_zero(p, PLUCKER_ZERO_TOL) {
            p = 0.0;
        }
        pip[i] = p;
    }

    if pip[0] == 0.0 && pip[1] == 0.0 && pip[2] == 0.0 {
        // Coplanar (ray lies in the triangle's plane): not an intersection.
        return None;
    }

    match orientation {
        Some(o) => {
            if pip.iter().any(|&p| o * p > 0.0) {
                return None;
            }
        }
        None => {
            let positive = pip.iter().any(|&p| p > 0.0);
            let negative = pip.iter().any(|&p| p < 0.0);
            if positive && negative {
                return None;
            }
        }
    }

    let sum: f64 = pip.iter().sum();
    if nearly_zero(sum, PLUCKER_ZERO_TOL) {
        return None;
    }

    let barycentric = [pip[0] / sum, pip[1] / sum, pip[2] / sum];
    // pip[i] weights the vertex opposite edge i: edge0=(v0,v1) -> v2, etc.
    let point = Point3::from(
        barycentric[0] * triangle[2].coords
            + barycentric[1] * triangle[0].coords
            + barycentric[2] * triangle[1].coords,
    );

    // Project onto the axis of direction's largest component to recover t,
    // avoiding division by a near-zero direction component.
    let axis = {
        let d = direction;
        if d.x.abs() >= d.y.abs() && d.x.abs() >= d.z.abs() {
            0
        } else if d.y.abs() >= d.z.abs() {
            1
        } else {
            2
        }
    };
    let delta = point - origin;
    let (num, den) = match axis {
        0 => (delta.x, direction.x),
        1 => (delta.y, direction.y),
        _ => (delta.z, direction.z),
    };
    if den == 0.0 {
        return None;
    }
    let t = num / den;

    if t > far {
        return None;
    }
    match near {
        Some(n) if n < 0.0 => {
            if t <= n {
                return None;
            }
        }
        _ => {
            if t <= 0.0 {
                return None;
            }
        }
    }

    Some(RayTriangleHit {
        t,
        point,
        barycentric: [barycentric[1], barycentric[2], barycentric[0]],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn perpendicular_hit_from_above() {
        let tri = unit_triangle();
        let hit = ray_triangle(
            Point3::new(0.2, 0.2, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            None,
            None,
            f64::INFINITY,
        );
        let hit = hit.expect("ray through triangle interior should hit");
        assert!((hit.t - 5.0).abs() < 1e-9);
        assert!((hit.point.x - 0.2).abs() < 1e-9);
        assert!((hit.point.y - 0.2).abs() < 1e-9);
    }

    #[test]
    fn miss_outside_triangle() {
        let tri = unit_triangle();
        let hit = ray_triangle(
            Point3::new(5.0, 5.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            None,
            None,
            f64::INFINITY,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn far_limit_rejects_distant_hit() {
        let tri = unit_triangle();
        let hit = ray_triangle(
            Point3::new(0.2, 0.2, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            None,
            None,
            1.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn orientation_filters_crossing_direction() {
        let tri = unit_triangle();
        // normal of this CCW triangle (viewed from +z) is +z.
        // a ray traveling in -z direction is "entering" from the +z side.
        let entering = ray_triangle(
            Point3::new(0.2, 0.2, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            Some(-1.0),
            None,
            f64::INFINITY,
        );
        assert!(entering.is_some());
        let wrong_way = ray_triangle(
            Point3::new(0.2, 0.2, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            Some(1.0),
            None,
            f64::INFINITY,
        );
        assert!(wrong_way.is_none());
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let tri = unit_triangle();
        let hit = ray_triangle(
            Point3::new(0.2, 0.3, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            tri,
            None,
            None,
            f64::INFINITY,
        )
        .unwrap();
        let sum: f64 = hit.barycentric.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    /// Pick a point inside the triangle by barycentric combination, fire a
    /// perpendicular ray at it from above, and check the reported
    /// intersection point matches the point that was aimed at.
    #[test]
    fn ray_triangle_round_trips_sampled_interior_points() {
        let tri = unit_triangle();
        let mut seed = 0xB0A7_u64;
        for _ in 0..200 {
            let mut w0 = lcg(&mut seed);
            let mut w1 = lcg(&mut seed);
            if w0 + w1 > 1.0 {
                w0 = 1.0 - w0;
                w1 = 1.0 - w1;
            }
            let w2 = 1.0 - w0 - w1;
            let target = Point3::from(w0 * tri[0].coords + w1 * tri[1].coords + w2 * tri[2].coords);
            let origin = Point3::new(target.x, target.y, target.z + 5.0);
            let hit = ray_triangle(origin, Vec3::new(0.0, 0.0, -1.0), tri, None, None, f64::INFINITY)
                .expect("perpendicular ray through an interior point must hit");
            approx::assert_relative_eq!(hit.t, 5.0, epsilon = 1e-9);
            approx::assert_relative_eq!(hit.point.x, target.x, epsilon = 1e-9);
            approx::assert_relative_eq!(hit.point.y, target.y, epsilon = 1e-9);
            approx::assert_relative_eq!(hit.point.z, target.z, epsilon = 1e-9);
        }
    }
}
