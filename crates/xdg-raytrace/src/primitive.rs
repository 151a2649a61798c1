//! Primitive references indexed by the acceleration structures.

use xdg_math::{Aabb3, Point3};
use xdg_mesh::MeshID;

/// A primitive entered into a bounding-volume hierarchy: either a surface
/// triangle (for ray-fire / closest-point queries) or a volume element
/// (for element-walking).
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    /// A triangular face belonging to a surface.
    Triangle {
        /// The face this triangle was built from.
        face: MeshID,
        /// The surface that face belongs to.
        surface: MeshID,
        /// The three vertex positions, wound for the owning volume's sense.
        verts: [Point3; 3],
    },
    /// A tetrahedral element belonging to a volume.
    Tetrahedron {
        /// The element this tetrahedron was built from.
        element: MeshID,
        /// The four vertex positions.
        verts: [Point3; 4],
    },
}

impl Primitive {
    /// The tight axis-aligned bounding box of this primitive.
    pub fn aabb(&self) -> Aabb3 {
        match self {
            Primitive::Triangle { verts, .. } => {
                let mut b = Aabb3::empty();
                for v in verts {
                    b.update(v);
                }
                b
            }
            Primitive::Tetrahedron { verts, .. } => {
                let mut b = Aabb3::empty();
                for v in verts {
                    b.update(v);
                }
                b
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_aabb_covers_all_vertices() {
        let tri = Primitive::Triangle {
            face: MeshID::from(0usize),
            surface: MeshID::from(0usize),
            verts: [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(-1.0, 0.0, 3.0),
            ],
        };
        let aabb = tri.aabb();
        assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains(&Point3::new(1.0, 2.0, 0.0)));
        assert!(aabb.contains(&Point3::new(-1.0, 0.0, 3.0)));
    }
}
