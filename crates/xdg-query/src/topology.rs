//! Implicit-complement synthesis and topology-aware volume routing.

use xdg_mesh::{MeshAdapter, MeshError, MeshID};

/// Synthesize the implicit complement for `mesh` and return its id. Callers
/// must invoke this exactly once per model, during [`crate::XdgModel::prepare`]
/// before any acceleration structures are built.
pub fn prepare_implicit_complement(mesh: &mut impl MeshAdapter) -> Result<MeshID, MeshError> {
    mesh.create_implicit_complement()
}

/// Volume ids to examine when searching for a point's containing volume:
/// every volume except the implicit complement, which callers fall back to
/// only once every other volume has been tried and failed.
pub fn locatable_volumes(mesh: &impl MeshAdapter) -> Vec<MeshID> {
    mesh.volumes()
        .into_iter()
        .filter(|&v| !mesh.is_implicit_complement(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdg_mesh::mock::box_with_tets;

    #[test]
    fn locatable_volumes_excludes_the_implicit_complement() {
        let (mut mesh, volume) = box_with_tets();
        let ipc = prepare_implicit_complement(&mut mesh).unwrap();
        let locatable = locatable_volumes(&mesh);
        assert!(locatable.contains(&volume));
        assert!(!locatable.contains(&ipc));
    }

    #[test]
    fn implicit_complement_absorbs_every_dangling_surface_side() {
        let (mut mesh, volume) = box_with_tets();
        let ipc = prepare_implicit_complement(&mut mesh).unwrap();
        for surface in mesh.get_volume_surfaces(volume).unwrap() {
            let (forward, reverse) = mesh.surface_senses(surface).unwrap();
            assert!(forward == volume || reverse == ipc);
        }
    }

    #[test]
    fn every_surface_side_ends_up_owned_by_volume_or_complement() {
        let (mut mesh, volume) = box_with_tets();
        let ipc = prepare_implicit_complement(&mut mesh).unwrap();
        for surface in mesh.surfaces() {
            let (forward, reverse) = mesh.surface_senses(surface).unwrap();
            assert!(forward == volume || forward == ipc);
            assert!(reverse == volume || reverse == ipc);
        }
    }
}
