//! Fixture meshes used across the workspace's test suites.
//!
//! Gated behind the `testing` feature so non-test builds don't pay for it.

use xdg_math::Point3;

use crate::{Sense, SimpleMeshAdapter};

/// Build the box fixture used throughout the query-engine test scenarios: a
/// single volume with bounding box `{-2,-3,-4} .. {5,6,7}` (dimensions
/// `7x9x11`), six surfaces (one per box face, two triangles each), and a
/// tetrahedral volume mesh formed by fanning each of the twelve surface
/// triangles to the box's centroid.
///
/// Returns the adapter and the id of the single, non-complement volume.
pub fn box_with_tets() -> (SimpleMeshAdapter, crate::MeshID) {
    let mut m = SimpleMeshAdapter::new();

    let c0 = m.add_vertex(Point3::new(-2.0, -3.0, -4.0));
    let c1 = m.add_vertex(Point3::new(5.0, -3.0, -4.0));
    let c2 = m.add_vertex(Point3::new(5.0, 6.0, -4.0));
    let c3 = m.add_vertex(Point3::new(-2.0, 6.0, -4.0));
    let c4 = m.add_vertex(Point3::new(-2.0, -3.0, 7.0));
    let c5 = m.add_vertex(Point3::new(5.0, -3.0, 7.0));
    let c6 = m.add_vertex(Point3::new(5.0, 6.0, 7.0));
    let c7 = m.add_vertex(Point3::new(-2.0, 6.0, 7.0));
    let centroid = m.add_vertex(Point3::new(1.5, 1.5, 1.5));

    // Each face's vertices are wound so the cross product of its edges
    // points out of the box, giving the outward CCW-from-the-normal-side
    // winding `SimpleMeshAdapter::triangle_normal` expects (unnormalized).
    let bottom = [[c0, c2, c1], [c0, c3, c2]];
    let top = [[c4, c5, c6], [c4, c6, c7]];
    let x_neg = [[c0, c7, c3], [c0, c4, c7]];
    let x_pos = [[c1, c2, c6], [c1, c6, c5]];
    let y_neg = [[c0, c1, c5], [c0, c5, c4]];
    let y_pos = [[c3, c6, c2], [c3, c7, c6]];

    let groups = [bottom, top, x_neg, x_pos, y_neg, y_pos];

    let mut volume_surfaces = Vec::new();
    let mut all_triangles = Vec::new();
    for group in &groups {
        let faces: Vec<_> = group.iter().map(|&tri| m.add_face(tri)).collect();
        all_triangles.extend(group.iter().copied());
        volume_surfaces.push(m.add_surface(faces));
    }

    let volume = m.create_volume();
    for s in volume_surfaces {
        m.add_surface_to_volume(volume, s, Sense::Forward, false)
            .expect("fresh volume and surface");
    }

    let elements: Vec<_> = all_triangles
        .iter()
        .map(|&[a, b, c]| m.add_element([centroid, a, b, c]))
        .collect();
    m.add_elements_to_volume(volume, elements)
        .expect("fresh volume");

    (m, volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshAdapter;

    #[test]
    fn box_fixture_has_expected_shape() {
        let (m, vol) = box_with_tets();
        assert_eq!(m.get_volume_surfaces(vol).unwrap().len(), 6);
        assert_eq!(m.num_volume_faces(vol).unwrap(), 12);
        assert_eq!(m.num_volume_elements(vol).unwrap(), 12);
    }

    #[test]
    fn box_fixture_bounding_box_matches_fixture_dimensions() {
        let (m, vol) = box_with_tets();
        let bb = m.volume_bounding_box(vol).unwrap();
        assert!((bb.min.x - (-2.0)).abs() < 1e-9);
        assert!((bb.max.x - 5.0).abs() < 1e-9);
        assert!((bb.min.y - (-3.0)).abs() < 1e-9);
        assert!((bb.max.y - 6.0).abs() < 1e-9);
        assert!((bb.min.z - (-4.0)).abs() < 1e-9);
        assert!((bb.max.z - 7.0).abs() < 1e-9);
    }
}
