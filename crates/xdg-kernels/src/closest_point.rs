//! Closest-point-on-triangle via the classic 7-region classification
//! (Eberly/MOAB-style: one interior region, three edge-opposite strips,
//! three vertex corners).

use xdg_math::Point3;

/// The closest point on triangle `(a, b, c)` to `p`, and the squared
/// distance to it.
pub fn closest_point_on_triangle(p: Point3, a: Point3, b: Point3, c: Point3) -> (Point3, f64) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        // region 1: vertex a
        return (a, (p - a).norm_squared());
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        // region 2: vertex b
        return (b, (p - b).norm_squared());
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        // region 6: edge ab
        let t = d1 / (d1 - d3);
        let q = a + ab * t;
        return (q, (p - q).norm_squared());
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        // region 5: vertex c
        return (c, (p - c).norm_squared());
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        // region 5: edge ac
        let t = d2 / (d2 - d6);
        let q = a + ac * t;
        return (q, (p - q).norm_squared());
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        // region 4: edge bc
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let q = b + (c - b) * t;
        return (q, (p - q).norm_squared());
    }

    // region 0: interior
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let q = a + ab * v + ac * w;
    (q, (p - q).norm_squared())
}
