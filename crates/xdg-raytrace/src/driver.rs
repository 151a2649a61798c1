//! Per-volume acceleration structures and the ray-fire / closest-point /
//! point-location query driver built against a [`MeshAdapter`].

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use xdg_kernels::{closest_point_on_triangle, ray_triangle, tet_contains};
use xdg_math::{Aabb3, Dir3, Point3, NUMERICAL_PRECISION};
use xdg_mesh::{MeshAdapter, MeshError, MeshID, Sense};

use crate::bvh::Bvh;
use crate::orientation::Orientation;
use crate::primitive::Primitive;
use crate::ray::{Ray, RayHit};

new_key_type! {
    /// Opaque handle to one built acceleration structure. Stable for the
    /// lifetime of the [`Driver`] that returned it.
    pub struct TreeHandle;
}

struct Tree {
    bvh: Bvh,
    primitives: Vec<Primitive>,
}

/// Shared bookkeeping for the (up to) two trees straddling a surface — one
/// per bounding volume — so both sides can be dilated by the same slack.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceUserData {
    /// Bounding-box dilation applied to both of this surface's trees.
    pub box_dilation: f64,
    /// Tree handle for the forward-sense volume, if bound.
    pub forward_tree: Option<TreeHandle>,
    /// Tree handle for the reverse-sense volume, if bound.
    pub reverse_tree: Option<TreeHandle>,
}

/// Builds and queries acceleration structures over a [`MeshAdapter`].
///
/// Each volume gets a triangle tree (its bounding surfaces' faces, wound
/// outward for that volume's sense) for ray-fire and closest-point queries,
/// and — where the adapter has tetrahedra — an element tree for
/// point-location. A [`SurfaceUserData`] record per surface tracks the
/// dilation shared by both of a surface's sides.
pub struct Driver {
    trees: SlotMap<TreeHandle, Tree>,
    volume_trees: HashMap<MeshID, TreeHandle>,
    element_trees: HashMap<MeshID, TreeHandle>,
    surface_data: HashMap<MeshID, SurfaceUserData>,
}

impl Driver {
    /// Build acceleration structures for every volume and surface in
    /// `mesh`. Call once after the model (including its implicit
    /// complement, if any) is fully loaded.
    pub fn prepare(mesh: &impl MeshAdapter) -> Result<Self, MeshError> {
        let mut trees = SlotMap::with_key();
        let mut volume_trees = HashMap::new();
        let mut element_trees = HashMap::new();
        let mut surface_data: HashMap<MeshID, SurfaceUserData> = HashMap::new();

        for volume in mesh.volumes() {
            let dilation = volume_dilation(mesh, volume)?;

            let mut primitives = Vec::new();
            for surface in mesh.get_volume_surfaces(volume)? {
                let sense = mesh.surface_sense(surface, volume)?;
                for face in mesh.get_surface_faces(surface)? {
                    let mut verts = mesh.face_vertices(face)?;
                    if sense == Sense::Reverse {
                        verts.swap(1, 2);
                    }
                    primitives.push(Primitive::Triangle {
                        face,
                        surface,
                        verts,
                    });
                }
            }
            let handle = insert_tree(&mut trees, primitives, dilation);
            volume_trees.insert(volume, handle);

            for surface in mesh.get_volume_surfaces(volume)? {
                let sense = mesh.surface_sense(surface, volume)?;
                let entry = surface_data.entry(surface).or_insert(SurfaceUserData {
                    box_dilation: dilation,
                    forward_tree: None,
                    reverse_tree: None,
                });
                entry.box_dilation = entry.box_dilation.max(dilation);
                match sense {
                    Sense::Forward => entry.forward_tree = Some(handle),
                    Sense::Reverse => entry.reverse_tree = Some(handle),
                    Sense::Unset => {}
                }
            }

            if mesh.num_volume_elements(volume)? > 0 {
                let elements = mesh
                    .get_volume_elements(volume)?
                    .into_iter()
                    .map(|element| {
                        let verts = mesh.element_vertices(element)?;
                        Ok(Primitive::Tetrahedron { element, verts })
                    })
                    .collect::<Result<Vec<_>, MeshError>>()?;
                let handle = insert_tree(&mut trees, elements, dilation);
                element_trees.insert(volume, handle);
            }
        }

        Ok(Self {
            trees,
            volume_trees,
            element_trees,
            surface_data,
        })
    }

    /// Bookkeeping record for `surface`, if it was prepared.
    pub fn surface_user_data(&self, surface: MeshID) -> Option<&SurfaceUserData> {
        self.surface_data.get(&surface)
    }

    /// Fire a ray from `origin` in `direction` against `volume`'s boundary,
    /// keeping only crossings that pass `orientation` and whose face id is
    /// not in `excl`, ordered by `t` and truncated to `max_hits` (all of
    /// them, if `None`).
    pub fn ray_fire(
        &self,
        volume: MeshID,
        origin: Point3,
        direction: Dir3,
        orientation: Orientation,
        excl: &[MeshID],
        max_hits: Option<usize>,
    ) -> Result<Vec<RayHit>, MeshError> {
        let tree = self.volume_tree(volume)?;
        let ray = Ray::new(origin, direction.into_inner());
        let mut hits = tree.bvh.trace(&ray, |i| {
            test_triangle(&tree.primitives[i], &ray, orientation, excl)
                .into_iter()
                .collect()
        });
        if let Some(n) = max_hits {
            hits.truncate(n);
        }
        Ok(hits)
    }

    /// The closest surviving ray/surface crossing on `volume`'s boundary,
    /// excluding any face whose id is in `excl` — the primitive-exclusion
    /// cull a transport caller uses to disable self-intersection against a
    /// face it just left.
    pub fn ray_fire_closest(
        &self,
        volume: MeshID,
        origin: Point3,
        direction: Dir3,
        orientation: Orientation,
        excl: &[MeshID],
    ) -> Result<Option<RayHit>, MeshError> {
        let tree = self.volume_tree(volume)?;
        let ray = Ray::new(origin, direction.into_inner());
        Ok(tree
            .bvh
            .trace_closest(&ray, |i| test_triangle(&tree.primitives[i], &ray, orientation, excl)))
    }

    /// The closest point on `volume`'s boundary to `point`: the point
    /// itself, its distance, and the face and surface it lies on.
    pub fn closest_point(
        &self,
        volume: MeshID,
        point: Point3,
    ) -> Result<Option<(Point3, f64, MeshID, MeshID)>, MeshError> {
        let tree = self.volume_tree(volume)?;
        let found = tree.bvh.nearest(point, |i| match &tree.primitives[i] {
            Primitive::Triangle { verts, .. } => {
                closest_point_on_triangle(point, verts[0], verts[1], verts[2])
            }
            Primitive::Tetrahedron { .. } => (point, f64::INFINITY),
        });
        Ok(found.and_then(|(i, q, d2)| match &tree.primitives[i] {
            Primitive::Triangle { face, surface, .. } => Some((q, d2.sqrt(), *face, *surface)),
            Primitive::Tetrahedron { .. } => None,
        }))
    }

    /// The tetrahedral element of `volume` containing `point`, if its mesh
    /// has an element tree.
    pub fn locate_element(
        &self,
        volume: MeshID,
        point: Point3,
    ) -> Result<Option<MeshID>, MeshError> {
        let Some(handle) = self.element_trees.get(&volume) else {
            return Ok(None);
        };
        let tree = &self.trees[*handle];
        let found = tree.bvh.locate(point, |i| match &tree.primitives[i] {
            Primitive::Tetrahedron { verts, .. } => tet_contains(point, *verts),
            Primitive::Triangle { .. } => false,
        });
        Ok(found.map(|i| match &tree.primitives[i] {
            Primitive::Tetrahedron { element, .. } => *element,
            Primitive::Triangle { .. } => unreachable!("element trees hold only tetrahedra"),
        }))
    }

    fn volume_tree(&self, volume: MeshID) -> Result<&Tree, MeshError> {
        let handle = self
            .volume_trees
            .get(&volume)
            .ok_or(MeshError::NotFound(volume))?;
        Ok(&self.trees[*handle])
    }
}

fn insert_tree(
    trees: &mut SlotMap<TreeHandle, Tree>,
    primitives: Vec<Primitive>,
    dilation: f64,
) -> TreeHandle {
    let entries: Vec<(usize, Aabb3)> = primitives
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut b = p.aabb();
            b.dilate(dilation);
            (i, b)
        })
        .collect();
    let bvh = Bvh::build(&entries);
    trees.insert(Tree { bvh, primitives })
}

fn test_triangle(
    primitive: &Primitive,
    ray: &Ray,
    orientation: Orientation,
    excl: &[MeshID],
) -> Option<RayHit> {
    let Primitive::Triangle {
        face,
        surface,
        verts,
    } = primitive
    else {
        return None;
    };
    if excl.contains(face) {
        return None;
    }
    let hit = ray_triangle(
        ray.origin,
        ray.direction.into_inner(),
        *verts,
        None,
        None,
        f64::INFINITY,
    )?;
    let normal = (verts[1] - verts[0]).cross(&(verts[2] - verts[0]));
    let direction_dot_normal = ray.direction.into_inner().dot(&normal);
    if !orientation.accepts(direction_dot_normal) {
        return None;
    }
    Some(RayHit {
        t: hit.t,
        point: hit.point,
        normal: Dir3::new_normalize(normal),
        face_id: *face,
        surface_id: *surface,
    })
}

fn volume_dilation(mesh: &impl MeshAdapter, volume: MeshID) -> Result<f64, MeshError> {
    let bbox = mesh.volume_bounding_box(volume)?;
    Ok((bbox.diagonal() * 1e-6).max(NUMERICAL_PRECISION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdg_mesh::mock::box_with_tets;

    #[test]
    fn ray_fire_through_box_reports_entry_and_exit() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let origin = Point3::new(1.5, 1.5, -100.0);
        let direction = Dir3::new_normalize(xdg_math::Vec3::new(0.0, 0.0, 1.0));
        let hits = driver
            .ray_fire(volume, origin, direction, Orientation::Any, &[], None)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].t < hits[1].t);
    }

    #[test]
    fn ray_fire_entering_only_reports_one_hit() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let origin = Point3::new(1.5, 1.5, -100.0);
        let direction = Dir3::new_normalize(xdg_math::Vec3::new(0.0, 0.0, 1.0));
        let hits = driver
            .ray_fire(volume, origin, direction, Orientation::Entering, &[], None)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn ray_fire_excludes_a_previously_hit_face() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let origin = Point3::new(1.5, 1.5, -100.0);
        let direction = Dir3::new_normalize(xdg_math::Vec3::new(0.0, 0.0, 1.0));

        let first = driver
            .ray_fire_closest(volume, origin, direction, Orientation::Entering, &[])
            .unwrap()
            .unwrap();
        let excl = [first.face_id];

        let second = driver
            .ray_fire_closest(volume, origin, direction, Orientation::Entering, &excl)
            .unwrap();
        assert!(second.is_none(), "entering face was excluded, so no entering hit should remain");

        let any_with_excl = driver
            .ray_fire(volume, origin, direction, Orientation::Any, &excl, None)
            .unwrap();
        assert_eq!(any_with_excl.len(), 1);
        assert_ne!(any_with_excl[0].face_id, first.face_id);
    }

    #[test]
    fn closest_point_finds_nearest_face_outside_box() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let (_q, dist, _face, _surface) = driver
            .closest_point(volume, Point3::new(1.5, 1.5, -10.0))
            .unwrap()
            .unwrap();
        approx::assert_relative_eq!(dist, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn locate_element_finds_containing_tet_at_centroid() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let found = driver.locate_element(volume, Point3::new(1.5, 1.5, 1.5)).unwrap();
        assert!(found.is_some());
    }

    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    /// Firing straight through the box at sampled interior (x, y) positions
    /// must always report exactly an entry then an exit, entry strictly
    /// before exit in `t`.
    #[test]
    fn ray_fire_hits_are_monotonically_ordered_by_t_over_sampled_origins() {
        let (mesh, volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let direction = Dir3::new_normalize(xdg_math::Vec3::new(0.0, 0.0, 1.0));
        let mut seed = 0xA1A1_u64;
        for _ in 0..100 {
            let x = -1.9 + lcg(&mut seed) * 6.8; // stays inside (-2, 5)
            let y = -2.9 + lcg(&mut seed) * 8.8; // stays inside (-3, 6)
            let origin = Point3::new(x, y, -100.0);
            let hits = driver
                .ray_fire(volume, origin, direction, Orientation::Any, &[], None)
                .unwrap();
            assert_eq!(hits.len(), 2, "origin ({x}, {y}) should cross the box exactly twice");
            assert!(hits[0].t < hits[1].t);
        }
    }

    #[test]
    fn unknown_volume_is_not_found() {
        let (mesh, _volume) = box_with_tets();
        let driver = Driver::prepare(&mesh).unwrap();
        let bogus = MeshID::from(9999usize);
        let err = driver
            .ray_fire(
                bogus,
                Point3::new(0.0, 0.0, 0.0),
                Dir3::new_normalize(xdg_math::Vec3::new(1.0, 0.0, 0.0)),
                Orientation::Any,
                &[],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MeshError::NotFound(_)));
    }
}
