#![warn(missing_docs)]

//! Query-engine facade tying a [`MeshAdapter`] to its [`Driver`]-built
//! acceleration structures.
//!
//! # Architecture
//!
//! - [`error`] — [`QueryError`], the facade's error type.
//! - [`topology`] — implicit-complement synthesis and the volume-iteration
//!   order `find_volume` walks.
//! - [`XdgModel`] — the facade itself: ray-fire, point-in-volume, closest
//!   point, surface normal, volume/element location, track segmentation,
//!   and divergence-theorem volume/area measurement.
//!
//! # Example
//!
//! ```
//! use xdg_math::Point3;
//! use xdg_mesh::mock::box_with_tets;
//! use xdg_query::XdgModel;
//!
//! let (mesh, volume) = box_with_tets();
//! let model = XdgModel::prepare(mesh).unwrap();
//! let area = model.measure_surface_area_of_volume(volume).unwrap();
//! assert!((area - 478.0).abs() < 1e-9);
//! ```

mod error;
mod topology;

pub use error::QueryError;

use xdg_math::{Dir3, Point3, Vec3, PLUCKER_ZERO_TOL};
use xdg_mesh::{MeshAdapter, MeshID, Sense};
use xdg_raytrace::{Driver, Orientation};

/// A fixed, non-axis-aligned unit direction used by [`XdgModel::point_in_volume`]
/// and [`XdgModel::find_volume`] when the caller supplies none: the
/// normalized form of `(1, 2, 3)`.
fn generic_direction() -> Dir3 {
    Dir3::new_normalize(Vec3::new(1.0, 2.0, 3.0))
}

/// A loaded mesh plus the acceleration structures built over it, answering
/// the full set of XDG geometric queries.
pub struct XdgModel<M: MeshAdapter> {
    mesh: M,
    driver: Driver,
    ipc: MeshID,
}

impl<M: MeshAdapter> XdgModel<M> {
    /// Synthesize the implicit complement and build acceleration structures
    /// for every volume in `mesh`. Consumes `mesh`; query methods borrow it
    /// back out for the model's lifetime.
    pub fn prepare(mut mesh: M) -> Result<Self, QueryError> {
        let ipc = topology::prepare_implicit_complement(&mut mesh)?;
        let driver = Driver::prepare(&mesh)?;
        Ok(Self { mesh, driver, ipc })
    }

    /// The id of the synthesized implicit-complement volume.
    pub fn implicit_complement(&self) -> MeshID {
        self.ipc
    }

    /// Read-only access to the underlying mesh adapter.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// Fire a ray from `origin` toward `direction` against `volume`'s
    /// boundary, keeping only the closest crossing within `d_max` that
    /// passes `orientation` and whose face id is not already in `excl`.
    /// Returns `(t, surface_id)`, or `(INFINITY, ID_NONE)` on a miss. If
    /// `excl` is supplied, the faces it already lists are culled from this
    /// query's candidates, and the newly hit face id is appended to it on a
    /// hit — letting a transport caller disable self-intersection against a
    /// face it just left on the next ray.
    pub fn ray_fire(
        &self,
        volume: MeshID,
        origin: Point3,
        direction: Dir3,
        d_max: f64,
        orientation: Orientation,
        excl: Option<&mut Vec<MeshID>>,
    ) -> Result<(f64, MeshID), QueryError> {
        let already_hit: Vec<MeshID> = excl.as_deref().cloned().unwrap_or_default();
        match self
            .driver
            .ray_fire_closest(volume, origin, direction, orientation, &already_hit)?
        {
            Some(hit) if hit.t <= d_max => {
                if let Some(list) = excl {
                    list.push(hit.face_id);
                }
                Ok((hit.t, hit.surface_id))
            }
            _ => Ok((f64::INFINITY, MeshID::NONE)),
        }
    }

    /// Whether `point` lies inside `volume`: fire an `Any`-orientation ray
    /// and check that the nearest crossing is exiting. `direction`
    /// defaults to [`generic_direction`] when not supplied.
    pub fn point_in_volume(
        &self,
        volume: MeshID,
        point: Point3,
        direction: Option<Dir3>,
    ) -> Result<bool, QueryError> {
        let direction = direction.unwrap_or_else(generic_direction);
        let hit = self
            .driver
            .ray_fire_closest(volume, point, direction, Orientation::Any, &[])?;
        Ok(match hit {
            Some(hit) => direction.into_inner().dot(&hit.normal.into_inner()) > 0.0,
            None => false,
        })
    }

    /// The closest point on `volume`'s boundary to `point`: `(distance,
    /// surface_id)`, or `(INFINITY, ID_NONE)` if `volume` has no boundary.
    pub fn closest(&self, volume: MeshID, point: Point3) -> Result<(f64, MeshID), QueryError> {
        match self.driver.closest_point(volume, point)? {
            Some((_point, dist, _face, surface)) => Ok((dist, surface)),
            None => Ok((f64::INFINITY, MeshID::NONE)),
        }
    }

    /// The outward normal at `point` on `surface`: the last face in `excl`
    /// if non-empty, else the face under the closest-point query against
    /// the surface's forward-sense volume.
    pub fn surface_normal(
        &self,
        surface: MeshID,
        point: Point3,
        excl: &[MeshID],
    ) -> Result<Vec3, QueryError> {
        if let Some(&face) = excl.last() {
            return Ok(self.mesh.face_normal(face)?);
        }
        let (forward, _reverse) = self.mesh.surface_senses(surface)?;
        if forward.is_none() {
            return Err(QueryError::UnknownSurface(surface));
        }
        match self.driver.closest_point(forward, point)? {
            Some((_point, _dist, face, _surface)) => Ok(self.mesh.face_normal(face)?),
            None => Err(QueryError::BackendNotBuilt),
        }
    }

    /// The first non-complement volume containing `point`, or the implicit
    /// complement if none does.
    pub fn find_volume(&self, point: Point3, direction: Option<Dir3>) -> Result<MeshID, QueryError> {
        for volume in topology::locatable_volumes(&self.mesh) {
            if self.point_in_volume(volume, point, direction)? {
                return Ok(volume);
            }
        }
        Ok(self.ipc)
    }

    /// The tetrahedral element of `volume` containing `point`, or
    /// `MeshID::NONE` if it lies outside `volume`'s element mesh.
    pub fn find_element_in(&self, volume: MeshID, point: Point3) -> Result<MeshID, QueryError> {
        Ok(self.driver.locate_element(volume, point)?.unwrap_or(MeshID::NONE))
    }

    /// The tetrahedral element containing `point`, searching whichever
    /// volume [`XdgModel::find_volume`] resolves `point` to.
    pub fn find_element(&self, point: Point3) -> Result<MeshID, QueryError> {
        let volume = self.find_volume(point, None)?;
        if self.mesh.is_implicit_complement(volume) {
            return Ok(MeshID::NONE);
        }
        self.find_element_in(volume, point)
    }

    /// Track segmentation within a single tetrahedralized volume: walk the
    /// segment `[start, end]`, alternating between locating the containing
    /// element and ray-firing into `volume` when the track currently sits
    /// outside it, returning ordered `(element, chord_length)` pairs.
    pub fn segments_in(
        &self,
        volume: MeshID,
        start: Point3,
        end: Point3,
    ) -> Result<Vec<(MeshID, f64)>, QueryError> {
        let delta = end - start;
        let mut remaining = delta.norm();
        if remaining < PLUCKER_ZERO_TOL {
            return Ok(Vec::new());
        }
        let direction = Dir3::new_normalize(delta);
        let mut cursor = start;
        let mut out = Vec::new();

        // Traversal alternates locate/walk and entering-ray-fire phases; a
        // phase that makes no progress means the track has left the mesh.
        loop {
            if remaining <= 0.0 {
                break;
            }
            match self.driver.locate_element(volume, cursor)? {
                Some(start_elem) => {
                    let hops = self
                        .mesh
                        .walk_elements(start_elem, cursor, direction, remaining)?;
                    if hops.is_empty() {
                        break;
                    }
                    let covered: f64 = hops.iter().map(|&(_, chord)| chord).sum();
                    out.extend(hops);
                    remaining -= covered;
                    cursor = cursor + direction.into_inner() * covered;
                }
                None => {
                    match self
                        .driver
                        .ray_fire_closest(volume, cursor, direction, Orientation::Entering, &[])?
                    {
                        Some(hit) if hit.t <= remaining => {
                            remaining -= hit.t;
                            cursor = hit.point;
                        }
                        _ => break,
                    }
                }
            }
        }
        Ok(out)
    }

    /// Track segmentation with no volume hint: start wherever
    /// [`XdgModel::find_volume`] resolves `start` to (the implicit
    /// complement included) and step across volume boundaries as the track
    /// crosses them, using the crossed surface's [`MeshAdapter::next_volume`]
    /// to resolve which volume to continue walking in. Ray-fires against the
    /// implicit complement are what carry the track from empty space into
    /// the next mesh region it meets.
    pub fn segments(&self, start: Point3, end: Point3) -> Result<Vec<(MeshID, f64)>, QueryError> {
        let delta = end - start;
        let mut remaining = delta.norm();
        if remaining < PLUCKER_ZERO_TOL {
            return Ok(Vec::new());
        }
        let direction = Dir3::new_normalize(delta);
        let mut cursor = start;
        let mut volume = self.find_volume(cursor, Some(direction))?;
        let mut out = Vec::new();

        loop {
            if remaining <= 0.0 {
                break;
            }
            if self.mesh.is_implicit_complement(volume) {
                // Leaving the complement's own space is what crossing into
                // a real volume looks like from here.
                match self
                    .driver
                    .ray_fire_closest(volume, cursor, direction, Orientation::Exiting, &[])?
                {
                    Some(hit) if hit.t <= remaining => {
                        remaining -= hit.t;
                        cursor = hit.point;
                        volume = self.mesh.next_volume(volume, hit.surface_id)?;
                    }
                    _ => break,
                }
                continue;
            }

            match self.driver.locate_element(volume, cursor)? {
                Some(start_elem) => {
                    let hops = self
                        .mesh
                        .walk_elements(start_elem, cursor, direction, remaining)?;
                    if hops.is_empty() {
                        match self.driver.ray_fire_closest(
                            volume,
                            cursor,
                            direction,
                            Orientation::Exiting,
                            &[],
                        )? {
                            Some(hit) if hit.t <= remaining => {
                                remaining -= hit.t;
                                cursor = hit.point;
                                volume = self.mesh.next_volume(volume, hit.surface_id)?;
                            }
                            _ => break,
                        }
                        continue;
                    }
                    let covered: f64 = hops.iter().map(|&(_, chord)| chord).sum();
                    out.extend(hops);
                    remaining -= covered;
                    cursor = cursor + direction.into_inner() * covered;
                }
                None => {
                    match self
                        .driver
                        .ray_fire_closest(volume, cursor, direction, Orientation::Entering, &[])?
                    {
                        Some(hit) if hit.t <= remaining => {
                            remaining -= hit.t;
                            cursor = hit.point;
                        }
                        _ => break,
                    }
                }
            }
        }
        Ok(out)
    }

    /// Divergence-theorem volume of `volume`: signed sum of
    /// `v0 · (v1 − v0) × (v2 − v0)` over every bounding triangle, divided
    /// by 6, negated for surfaces on which `volume` sits on the reverse
    /// side.
    pub fn measure_volume(&self, volume: MeshID) -> Result<f64, QueryError> {
        let mut sum = 0.0;
        for surface in self.mesh.get_volume_surfaces(volume)? {
            let sign = match self.mesh.surface_sense(surface, volume)? {
                Sense::Forward => 1.0,
                Sense::Reverse => -1.0,
                Sense::Unset => 0.0,
            };
            for face in self.mesh.get_surface_faces(surface)? {
                let v = self.mesh.face_vertices(face)?;
                sum += sign * v[0].coords.dot(&(v[1] - v[0]).cross(&(v[2] - v[0])));
            }
        }
        Ok(sum / 6.0)
    }

    /// Surface area of `surface`: half the sum of `‖(v1 − v0) × (v2 − v0)‖`
    /// over its faces.
    pub fn measure_surface_area(&self, surface: MeshID) -> Result<f64, QueryError> {
        let mut sum = 0.0;
        for face in self.mesh.get_surface_faces(surface)? {
            let v = self.mesh.face_vertices(face)?;
            sum += (v[1] - v[0]).cross(&(v[2] - v[0])).norm();
        }
        Ok(sum / 2.0)
    }

    /// Total boundary area of `volume`: the sum of
    /// [`XdgModel::measure_surface_area`] over its bounding surfaces.
    pub fn measure_surface_area_of_volume(&self, volume: MeshID) -> Result<f64, QueryError> {
        let mut sum = 0.0;
        for surface in self.mesh.get_volume_surfaces(volume)? {
            sum += self.measure_surface_area(surface)?;
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdg_mesh::mock::box_with_tets;

    #[test]
    fn measure_volume_matches_box_with_tets() {
        let (mesh, volume) = box_with_tets();
        let model = XdgModel::prepare(mesh).unwrap();
        assert!((model.measure_volume(volume).unwrap() - 693.0).abs() < 1e-9);
    }

    #[test]
    fn find_volume_falls_back_to_implicit_complement() {
        let (mesh, _volume) = box_with_tets();
        let model = XdgModel::prepare(mesh).unwrap();
        let far = Point3::new(1000.0, 1000.0, 1000.0);
        assert_eq!(model.find_volume(far, None).unwrap(), model.implicit_complement());
    }

    #[test]
    fn point_in_volume_is_true_at_the_centroid() {
        let (mesh, volume) = box_with_tets();
        let model = XdgModel::prepare(mesh).unwrap();
        assert!(model
            .point_in_volume(volume, Point3::new(1.5, 1.5, 1.5), None)
            .unwrap());
    }

    #[test]
    fn find_element_returns_none_outside_every_volume() {
        let (mesh, _volume) = box_with_tets();
        let model = XdgModel::prepare(mesh).unwrap();
        assert!(model.find_element(Point3::new(10.0, 10.0, 10.0)).unwrap().is_none());
    }
}
