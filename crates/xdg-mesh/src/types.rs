//! Entity types that make up the mesh data model.

use xdg_math::Point3;

use crate::MeshID;

/// Which side of a surface a volume sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// The volume is on the side the face normal points toward.
    Forward,
    /// The volume is on the side the face normal points away from.
    Reverse,
    /// No sense has been recorded yet.
    Unset,
}

/// A point in space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// Position in model coordinates.
    pub point: Point3,
}

/// A triangular surface facet, wound CCW when viewed from its normal side.
#[derive(Debug, Clone)]
pub struct Face {
    /// The three bounding vertices, in winding order.
    pub vertices: [MeshID; 3],
    /// The surface this face belongs to.
    pub surface: MeshID,
}

/// A tetrahedral volume element.
#[derive(Debug, Clone)]
pub struct Element {
    /// The four bounding vertices.
    pub vertices: [MeshID; 4],
    /// The volume this element belongs to.
    pub volume: MeshID,
}

/// An oriented two-manifold patch: an ordered list of faces plus the
/// volume(s) on either side.
#[derive(Debug, Clone)]
pub struct Surface {
    /// This surface's own id.
    pub id: MeshID,
    /// Faces belonging to this surface, in a stable order (acceleration
    /// structures rely on this order to build primitive-reference slices).
    pub faces: Vec<MeshID>,
    /// Volume on the side the face normals point toward, or `MeshID::NONE`.
    pub forward_volume: MeshID,
    /// Volume on the side the face normals point away from, or
    /// `MeshID::NONE`.
    pub reverse_volume: MeshID,
}

impl Surface {
    /// A surface is non-manifold if the same volume bounds both sides.
    pub fn is_non_manifold(&self) -> bool {
        self.forward_volume.is_some() && self.forward_volume == self.reverse_volume
    }
}

/// A region of space bounded by surfaces, optionally backed by a tet mesh.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    /// This volume's own id.
    pub id: MeshID,
    /// Bounding surfaces and this volume's sense on each, in the order they
    /// were registered.
    pub surfaces: Vec<(MeshID, Sense)>,
    /// Tetrahedral elements filling this volume, empty if the volume has no
    /// backing tet mesh.
    pub elements: Vec<MeshID>,
}
