//! The mesh-adapter contract: the trait every mesh source implements so
//! the rest of the workspace can query it uniformly.
//!
//! A `MeshAdapter` is a pure data interface: it answers topology and
//! geometry queries about an already-loaded mesh. It must not perform ray
//! tracing and must not own an acceleration structure — that is the
//! responsibility of `xdg-raytrace`, which is built *against* an adapter.

use xdg_math::{Aabb3, Dir3, Point3, Vec3};

use crate::{MeshError, MeshID, Sense};

/// Read/write access to a triangle-surface (+ optional tetrahedral-volume)
/// mesh, addressed entirely through [`MeshID`].
///
/// Implementors back the model with whatever storage fits the source
/// format; `xdg-mesh` ships [`crate::SimpleMeshAdapter`], an in-memory
/// reference implementation used by the rest of the workspace's tests.
pub trait MeshAdapter {
    /// Total number of volumes in the model (including the implicit
    /// complement, once created).
    fn num_volumes(&self) -> usize;

    /// Total number of surfaces in the model.
    fn num_surfaces(&self) -> usize;

    /// Number of triangular faces across all surfaces bounding `volume`.
    fn num_volume_faces(&self, volume: MeshID) -> Result<usize, MeshError>;

    /// Number of tetrahedral elements filling `volume`.
    fn num_volume_elements(&self, volume: MeshID) -> Result<usize, MeshError>;

    /// Number of faces belonging to `surface`.
    fn num_surface_faces(&self, surface: MeshID) -> Result<usize, MeshError>;

    /// All volume ids in the model.
    fn volumes(&self) -> Vec<MeshID>;

    /// All surface ids in the model.
    fn surfaces(&self) -> Vec<MeshID>;

    /// Surfaces bounding `volume`.
    fn get_volume_surfaces(&self, volume: MeshID) -> Result<Vec<MeshID>, MeshError>;

    /// Faces belonging to `surface`, in stable order.
    fn get_surface_faces(&self, surface: MeshID) -> Result<Vec<MeshID>, MeshError>;

    /// Elements filling `volume`.
    fn get_volume_elements(&self, volume: MeshID) -> Result<Vec<MeshID>, MeshError>;

    /// The three vertex positions of a face, in winding order.
    fn face_vertices(&self, face: MeshID) -> Result<[Point3; 3], MeshError>;

    /// The four vertex positions of a tetrahedral element.
    fn element_vertices(&self, element: MeshID) -> Result<[Point3; 4], MeshError>;

    /// The (forward, reverse) volume pair recorded for `surface`. Either may
    /// be `MeshID::NONE`.
    fn surface_senses(&self, surface: MeshID) -> Result<(MeshID, MeshID), MeshError>;

    /// The sense `volume` has on `surface`.
    fn surface_sense(&self, surface: MeshID, volume: MeshID) -> Result<Sense, MeshError>;

    /// Unnormalized face normal: `(v1 - v0) x (v2 - v0)`, right-hand rule.
    fn triangle_normal(&self, face: MeshID) -> Result<Vec3, MeshError>;

    /// Alias for [`MeshAdapter::triangle_normal`]; kept distinct because the
    /// hit-filter pipeline calls it by this name when it already has a face
    /// in hand rather than a surface to resolve one from.
    fn face_normal(&self, face: MeshID) -> Result<Vec3, MeshError> {
        self.triangle_normal(face)
    }

    /// Bounding box of a single element.
    fn element_bounding_box(&self, element: MeshID) -> Result<Aabb3, MeshError>;

    /// Bounding box of a single surface (union over its faces).
    fn surface_bounding_box(&self, surface: MeshID) -> Result<Aabb3, MeshError>;

    /// Bounding box of a volume (union over its bounding surfaces).
    fn volume_bounding_box(&self, volume: MeshID) -> Result<Aabb3, MeshError>;

    /// Allocate a new, empty volume and return its id.
    fn create_volume(&mut self) -> MeshID;

    /// Record that `volume` is bounded by `surface` with the given `sense`.
    /// If a sense is already recorded for that side, `overwrite` must be set
    /// or this is a [`MeshError::SenseConflict`].
    fn add_surface_to_volume(
        &mut self,
        volume: MeshID,
        surface: MeshID,
        sense: Sense,
        overwrite: bool,
    ) -> Result<(), MeshError>;

    /// Synthesize the implicit-complement volume: a catch-all volume that
    /// owns every surface side left dangling (`MeshID::NONE`) after load.
    /// Idempotent only in the sense that calling it twice creates two
    /// volumes — callers are expected to call it exactly once per model.
    ///
    /// Rejects with [`MeshError::DegenerateSurface`] if any surface has
    /// neither side registered to a volume — such a surface was never
    /// attached during load and is not a legitimate dangling side for the
    /// complement to absorb.
    fn create_implicit_complement(&mut self) -> Result<MeshID, MeshError>;

    /// True if `volume` is the implicit complement.
    fn is_implicit_complement(&self, volume: MeshID) -> bool;

    /// The volume on the other side of `surface` from `current`.
    fn next_volume(&self, current: MeshID, surface: MeshID) -> Result<MeshID, MeshError>;

    /// Walk the tetrahedral mesh from `start`, following the ray
    /// `origin + t * direction`, for up to `dist_remaining` along the ray.
    /// Returns ordered `(element, chord_length)` pairs; the walk stops
    /// early if it leaves the tet mesh before covering the full distance.
    ///
    /// Adapters with no tetrahedral mesh leave this unimplemented.
    fn walk_elements(
        &self,
        start: MeshID,
        origin: Point3,
        direction: Dir3,
        dist_remaining: f64,
    ) -> Result<Vec<(MeshID, f64)>, MeshError> {
        let _ = (start, origin, direction, dist_remaining);
        Err(MeshError::Unsupported("walk_elements".into()))
    }

    /// Convenience form of [`MeshAdapter::walk_elements`] that walks from
    /// `origin` toward `end` rather than along a distance-bounded ray.
    fn walk_elements_to(
        &self,
        start: MeshID,
        origin: Point3,
        end: Point3,
    ) -> Result<Vec<(MeshID, f64)>, MeshError> {
        let delta = end - origin;
        let dist = delta.norm();
        if dist < xdg_math::PLUCKER_ZERO_TOL {
            return Ok(Vec::new());
        }
        let direction = Dir3::new_normalize(delta);
        self.walk_elements(start, origin, direction, dist)
    }

    /// A short tag identifying which mesh library backs this adapter, e.g.
    /// `"xdg-mesh::simple"`.
    fn mesh_library_tag(&self) -> &str;
}
