//! An in-memory reference [`MeshAdapter`] implementation.

use std::collections::HashMap;

use xdg_math::{Aabb3, Dir3, Point3, Vec3};

use crate::{Element, Face, MeshAdapter, MeshError, MeshID, Sense, Surface, Vertex, Volume};

/// In-memory, `Vec`-arena-backed mesh adapter.
///
/// Entities are immutable once queries begin; volumes, surfaces, and sense
/// assignments are populated with the builder methods (`add_vertex`,
/// `add_face`, `add_surface`, `add_element`, `add_elements_to_volume`) and
/// the trait's `create_volume`/`add_surface_to_volume`. There is no file
/// format behind this adapter — it exists so the rest of the workspace has
/// a concrete, testable back-end, since real mesh-file loaders are outside
/// this engine's scope.
#[derive(Debug, Default)]
pub struct SimpleMeshAdapter {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    elements: Vec<Element>,
    surfaces: Vec<Surface>,
    volumes: Vec<Volume>,
    implicit_complement: Option<MeshID>,
}

impl SimpleMeshAdapter {
    /// An adapter with no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex, returning its id.
    pub fn add_vertex(&mut self, point: Point3) -> MeshID {
        let id = MeshID::from(self.vertices.len());
        self.vertices.push(Vertex { point });
        id
    }

    /// Add a triangular face (not yet assigned to a surface), returning its
    /// id.
    pub fn add_face(&mut self, vertices: [MeshID; 3]) -> MeshID {
        let id = MeshID::from(self.faces.len());
        self.faces.push(Face {
            vertices,
            surface: MeshID::NONE,
        });
        id
    }

    /// Add a tetrahedral element (not yet assigned to a volume), returning
    /// its id.
    pub fn add_element(&mut self, vertices: [MeshID; 4]) -> MeshID {
        let id = MeshID::from(self.elements.len());
        self.elements.push(Element {
            vertices,
            volume: MeshID::NONE,
        });
        id
    }

    /// Create a surface owning `faces`, tagging each face with the new
    /// surface id.
    pub fn add_surface(&mut self, faces: Vec<MeshID>) -> MeshID {
        let id = MeshID::from(self.surfaces.len());
        for &f in &faces {
            if let Some(i) = f.index() {
                self.faces[i].surface = id;
            }
        }
        self.surfaces.push(Surface {
            id,
            faces,
            forward_volume: MeshID::NONE,
            reverse_volume: MeshID::NONE,
        });
        id
    }

    /// Assign elements to a volume, tagging each element with the volume id.
    pub fn add_elements_to_volume(
        &mut self,
        volume: MeshID,
        elements: Vec<MeshID>,
    ) -> Result<(), MeshError> {
        let vi = volume.index().ok_or(MeshError::NotFound(volume))?;
        if vi >= self.volumes.len() {
            return Err(MeshError::NotFound(volume));
        }
        for &e in &elements {
            if let Some(i) = e.index() {
                self.elements[i].volume = volume;
            }
        }
        self.volumes[vi].elements.extend(elements);
        Ok(())
    }

    fn vertex(&self, id: MeshID) -> Result<Point3, MeshError> {
        id.index()
            .and_then(|i| self.vertices.get(i))
            .map(|v| v.point)
            .ok_or(MeshError::NotFound(id))
    }

    fn face(&self, id: MeshID) -> Result<&Face, MeshError> {
        id.index()
            .and_then(|i| self.faces.get(i))
            .ok_or(MeshError::NotFound(id))
    }

    fn element(&self, id: MeshID) -> Result<&Element, MeshError> {
        id.index()
            .and_then(|i| self.elements.get(i))
            .ok_or(MeshError::NotFound(id))
    }

    fn surface(&self, id: MeshID) -> Result<&Surface, MeshError> {
        id.index()
            .and_then(|i| self.surfaces.get(i))
            .ok_or(MeshError::NotFound(id))
    }

    fn volume(&self, id: MeshID) -> Result<&Volume, MeshError> {
        id.index()
            .and_then(|i| self.volumes.get(i))
            .ok_or(MeshError::NotFound(id))
    }

    /// Face-adjacency map for tet walking: every tet face (its 3 vertex ids,
    /// sorted) maps to the one or two elements that share it. Rebuilt on
    /// demand rather than cached, since element lists only change during
    /// construction.
    fn element_face_adjacency(&self) -> HashMap<[i32; 3], Vec<MeshID>> {
        let mut map: HashMap<[i32; 3], Vec<MeshID>> = HashMap::new();
        for (i, elem) in self.elements.iter().enumerate() {
            for face in tet_faces(&elem.vertices) {
                let mut key = [face[0].0, face[1].0, face[2].0];
                key.sort_unstable();
                map.entry(key).or_default().push(MeshID::from(i));
            }
        }
        map
    }
}

/// The four triangular faces of a tetrahedron, face `i` being the one
/// opposite vertex `i`.
fn tet_faces(v: &[MeshID; 4]) -> [[MeshID; 3]; 4] {
    [
        [v[1], v[2], v[3]],
        [v[0], v[2], v[3]],
        [v[0], v[1], v[3]],
        [v[0], v[1], v[2]],
    ]
}

/// Distance along `origin + t*dir` at which the ray leaves the convex
/// tetrahedron with vertices `verts`, and which local face (0..3, per
/// [`tet_faces`]) it exits through. `None` if the ray never leaves (direction
/// degenerate) or the tet is degenerate.
fn tet_exit(verts: &[Point3; 4], origin: Point3, dir: Vec3) -> Option<(f64, usize)> {
    let faces = tet_faces(&[MeshID(0), MeshID(1), MeshID(2), MeshID(3)]);
    let mut best: Option<(f64, usize)> = None;
    for (face_idx, face) in faces.iter().enumerate() {
        let a = verts[face[0].0 as usize];
        let b = verts[face[1].0 as usize];
        let c = verts[face[2].0 as usize];
        let opposite_vertex = verts[(0..4).find(|i| !face.contains(&MeshID(*i as i32))).unwrap()];

        let mut n = (b - a).cross(&(c - a));
        if n.norm() < xdg_math::PLUCKER_ZERO_TOL {
            continue;
        }
        // orient outward: away from the vertex this face excludes
        if n.dot(&(opposite_vertex - a)) > 0.0 {
            n = -n;
        }
        let denom = n.dot(&dir);
        if denom <= xdg_math::PLUCKER_ZERO_TOL {
            // ray not moving through this face's outward half-space
            continue;
        }
        let d = n.dot(&a.coords);
        let t = (d - n.dot(&origin.coords)) / denom;
        match best {
            Some((bt, _)) if bt <= t => {}
            _ => best = Some((t, face_idx)),
        }
    }
    best
}

impl MeshAdapter for SimpleMeshAdapter {
    fn num_volumes(&self) -> usize {
        self.volumes.len()
    }

    fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    fn num_volume_faces(&self, volume: MeshID) -> Result<usize, MeshError> {
        let v = self.volume(volume)?;
        let mut count = 0;
        for &(s, _) in &v.surfaces {
            count += self.surface(s)?.faces.len();
        }
        Ok(count)
    }

    fn num_volume_elements(&self, volume: MeshID) -> Result<usize, MeshError> {
        Ok(self.volume(volume)?.elements.len())
    }

    fn num_surface_faces(&self, surface: MeshID) -> Result<usize, MeshError> {
        Ok(self.surface(surface)?.faces.len())
    }

    fn volumes(&self) -> Vec<MeshID> {
        (0..self.volumes.len()).map(MeshID::from).collect()
    }

    fn surfaces(&self) -> Vec<MeshID> {
        (0..self.surfaces.len()).map(MeshID::from).collect()
    }

    fn get_volume_surfaces(&self, volume: MeshID) -> Result<Vec<MeshID>, MeshError> {
        Ok(self.volume(volume)?.surfaces.iter().map(|(s, _)| *s).collect())
    }

    fn get_surface_faces(&self, surface: MeshID) -> Result<Vec<MeshID>, MeshError> {
        Ok(self.surface(surface)?.faces.clone())
    }

    fn get_volume_elements(&self, volume: MeshID) -> Result<Vec<MeshID>, MeshError> {
        Ok(self.volume(volume)?.elements.clone())
    }

    fn face_vertices(&self, face: MeshID) -> Result<[Point3; 3], MeshError> {
        let f = self.face(face)?;
        Ok([
            self.vertex(f.vertices[0])?,
            self.vertex(f.vertices[1])?,
            self.vertex(f.vertices[2])?,
        ])
    }

    fn element_vertices(&self, element: MeshID) -> Result<[Point3; 4], MeshError> {
        let e = self.element(element)?;
        Ok([
            self.vertex(e.vertices[0])?,
            self.vertex(e.vertices[1])?,
            self.vertex(e.vertices[2])?,
            self.vertex(e.vertices[3])?,
        ])
    }

    fn surface_senses(&self, surface: MeshID) -> Result<(MeshID, MeshID), MeshError> {
        let s = self.surface(surface)?;
        Ok((s.forward_volume, s.reverse_volume))
    }

    fn surface_sense(&self, surface: MeshID, volume: MeshID) -> Result<Sense, MeshError> {
        let s = self.surface(surface)?;
        if s.forward_volume == volume {
            Ok(Sense::Forward)
        } else if s.reverse_volume == volume {
            Ok(Sense::Reverse)
        } else {
            Err(MeshError::NotAParent { volume, surface })
        }
    }

    fn triangle_normal(&self, face: MeshID) -> Result<Vec3, MeshError> {
        let [a, b, c] = self.face_vertices(face)?;
        Ok((b - a).cross(&(c - a)))
    }

    fn element_bounding_box(&self, element: MeshID) -> Result<Aabb3, MeshError> {
        let verts = self.element_vertices(element)?;
        let mut bb = Aabb3::empty();
        for v in verts {
            bb.update(&v);
        }
        Ok(bb)
    }

    fn surface_bounding_box(&self, surface: MeshID) -> Result<Aabb3, MeshError> {
        let s = self.surface(surface)?;
        let mut bb = Aabb3::empty();
        for &f in &s.faces {
            for v in self.face_vertices(f)? {
                bb.update(&v);
            }
        }
        Ok(bb)
    }

    fn volume_bounding_box(&self, volume: MeshID) -> Result<Aabb3, MeshError> {
        let v = self.volume(volume)?;
        let mut bb = Aabb3::empty();
        for &(s, _) in &v.surfaces {
            bb = bb.union(&self.surface_bounding_box(s)?);
        }
        Ok(bb)
    }

    fn create_volume(&mut self) -> MeshID {
        let id = MeshID::from(self.volumes.len());
        self.volumes.push(Volume {
            id,
            surfaces: Vec::new(),
            elements: Vec::new(),
        });
        id
    }

    fn add_surface_to_volume(
        &mut self,
        volume: MeshID,
        surface: MeshID,
        sense: Sense,
        overwrite: bool,
    ) -> Result<(), MeshError> {
        let vi = volume.index().ok_or(MeshError::NotFound(volume))?;
        let si = surface.index().ok_or(MeshError::NotFound(surface))?;
        if vi >= self.volumes.len() {
            return Err(MeshError::NotFound(volume));
        }
        if si >= self.surfaces.len() {
            return Err(MeshError::NotFound(surface));
        }
        match sense {
            Sense::Forward => {
                if self.surfaces[si].forward_volume.is_some() && !overwrite {
                    return Err(MeshError::SenseConflict { surface });
                }
                self.surfaces[si].forward_volume = volume;
            }
            Sense::Reverse => {
                if self.surfaces[si].reverse_volume.is_some() && !overwrite {
                    return Err(MeshError::SenseConflict { surface });
                }
                self.surfaces[si].reverse_volume = volume;
            }
            Sense::Unset => {
                return Err(MeshError::InvalidArgument(
                    "add_surface_to_volume requires Forward or Reverse".into(),
                ))
            }
        }
        self.volumes[vi].surfaces.push((surface, sense));
        Ok(())
    }

    fn create_implicit_complement(&mut self) -> Result<MeshID, MeshError> {
        let surface_ids: Vec<MeshID> = self.surfaces();
        for s in &surface_ids {
            let (fwd, rev) = self.surface_senses(*s)?;
            if fwd.is_none() && rev.is_none() {
                return Err(MeshError::DegenerateSurface(*s));
            }
        }

        let ipc = self.create_volume();
        for s in surface_ids {
            let (fwd, rev) = self.surface_senses(s).expect("surface just listed exists");
            if fwd.is_none() {
                self.add_surface_to_volume(ipc, s, Sense::Forward, false)
                    .expect("ipc volume and surface both exist");
            }
            if rev.is_none() {
                self.add_surface_to_volume(ipc, s, Sense::Reverse, false)
                    .expect("ipc volume and surface both exist");
            }
        }
        self.implicit_complement = Some(ipc);
        Ok(ipc)
    }

    fn is_implicit_complement(&self, volume: MeshID) -> bool {
        self.implicit_complement == Some(volume)
    }

    fn next_volume(&self, current: MeshID, surface: MeshID) -> Result<MeshID, MeshError> {
        let s = self.surface(surface)?;
        if s.forward_volume == current {
            Ok(s.reverse_volume)
        } else if s.reverse_volume == current {
            Ok(s.forward_volume)
        } else {
            Err(MeshError::NotAParent {
                volume: current,
                surface,
            })
        }
    }

    fn walk_elements(
        &self,
        start: MeshID,
        origin: Point3,
        direction: Dir3,
        dist_remaining: f64,
    ) -> Result<Vec<(MeshID, f64)>, MeshError> {
        let adjacency = self.element_face_adjacency();
        let mut out = Vec::new();
        let mut current = start;
        let mut r = origin;
        let mut remaining = dist_remaining;
        let dir = direction.into_inner();

        while remaining > xdg_math::PLUCKER_ZERO_TOL {
            let elem = self.element(current)?;
            let verts = self.element_vertices(current)?;
            let Some((t_exit, face_idx)) = tet_exit(&verts, r, dir) else {
                break;
            };
            let chord = t_exit.min(remaining).max(0.0);
            out.push((current, chord));
            remaining -= chord;
            if chord + 1e-12 < t_exit {
                // ran out of requested distance before leaving this element
                break;
            }
            r = r + dir * t_exit;

            let face = tet_faces(&elem.vertices)[face_idx];
            let mut key = [face[0].0, face[1].0, face[2].0];
            key.sort_unstable();
            let neighbors = adjacency.get(&key).map(|v| v.as_slice()).unwrap_or(&[]);
            let next = neighbors.iter().copied().find(|&e| e != current);
            match next {
                Some(n) => current = n,
                None => break,
            }
        }
        Ok(out)
    }

    fn mesh_library_tag(&self) -> &str {
        "xdg-mesh::simple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> (SimpleMeshAdapter, MeshID) {
        let mut m = SimpleMeshAdapter::new();
        let v = [
            m.add_vertex(Point3::new(0.0, 0.0, 0.0)),
            m.add_vertex(Point3::new(1.0, 0.0, 0.0)),
            m.add_vertex(Point3::new(1.0, 1.0, 0.0)),
            m.add_vertex(Point3::new(0.0, 1.0, 0.0)),
            m.add_vertex(Point3::new(0.0, 0.0, 1.0)),
            m.add_vertex(Point3::new(1.0, 0.0, 1.0)),
            m.add_vertex(Point3::new(1.0, 1.0, 1.0)),
            m.add_vertex(Point3::new(0.0, 1.0, 1.0)),
        ];
        // bottom (z=0, normal -z), wound so cross product points -z
        let bottom = [
            m.add_face([v[0], v[3], v[2]]),
            m.add_face([v[0], v[2], v[1]]),
        ];
        let top = [
            m.add_face([v[4], v[5], v[6]]),
            m.add_face([v[4], v[6], v[7]]),
        ];
        let s_bottom = m.add_surface(bottom.to_vec());
        let s_top = m.add_surface(top.to_vec());
        let vol = m.create_volume();
        m.add_surface_to_volume(vol, s_bottom, Sense::Forward, false)
            .unwrap();
        m.add_surface_to_volume(vol, s_top, Sense::Forward, false)
            .unwrap();
        (m, vol)
    }

    #[test]
    fn volume_surfaces_round_trip() {
        let (m, vol) = unit_cube();
        let surfaces = m.get_volume_surfaces(vol).unwrap();
        assert_eq!(surfaces.len(), 2);
        assert_eq!(m.num_volume_faces(vol).unwrap(), 4);
    }

    #[test]
    fn sense_conflict_without_overwrite() {
        let (mut m, vol) = unit_cube();
        let s = m.get_volume_surfaces(vol).unwrap()[0];
        let err = m.add_surface_to_volume(vol, s, Sense::Forward, false);
        assert!(matches!(err, Err(MeshError::SenseConflict { .. })));
        assert!(m
            .add_surface_to_volume(vol, s, Sense::Forward, true)
            .is_ok());
    }

    #[test]
    fn implicit_complement_absorbs_dangling_sides() {
        let (mut m, vol) = unit_cube();
        let ipc = m.create_implicit_complement().unwrap();
        assert!(m.is_implicit_complement(ipc));
        for s in m.surfaces() {
            let (fwd, rev) = m.surface_senses(s).unwrap();
            assert!(fwd.is_some());
            assert!(rev.is_some());
            assert!(fwd == vol || fwd == ipc);
            assert!(rev == vol || rev == ipc);
        }
    }

    #[test]
    fn implicit_complement_rejects_a_surface_attached_to_nothing() {
        let (mut m, _vol) = unit_cube();
        // A surface created but never attached to any volume's sense slots.
        let stray_vertex = [
            m.add_vertex(Point3::new(5.0, 5.0, 5.0)),
            m.add_vertex(Point3::new(6.0, 5.0, 5.0)),
            m.add_vertex(Point3::new(5.0, 6.0, 5.0)),
        ];
        let stray_face = m.add_face(stray_vertex);
        let stray_surface = m.add_surface(vec![stray_face]);

        let err = m.create_implicit_complement().unwrap_err();
        assert!(matches!(err, MeshError::DegenerateSurface(s) if s == stray_surface));
    }

    #[test]
    fn walk_elements_sums_to_segment_length_inside_one_tet() {
        let mut m = SimpleMeshAdapter::new();
        let v0 = m.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = m.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = m.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let v3 = m.add_vertex(Point3::new(0.0, 0.0, 1.0));
        let e = m.add_element([v0, v1, v2, v3]);
        let vol = m.create_volume();
        m.add_elements_to_volume(vol, vec![e]).unwrap();

        let origin = Point3::new(0.05, 0.05, 0.05);
        let end = Point3::new(0.1, 0.1, 0.1);
        let segs = m.walk_elements_to(e, origin, end).unwrap();
        let total: f64 = segs.iter().map(|(_, c)| c).sum();
        approx::assert_relative_eq!(total, (end - origin).norm(), epsilon = 1e-9);
    }
}
