//! Error taxonomy for the query-engine facade.

use thiserror::Error;
use xdg_mesh::{MeshError, MeshID};

/// Errors an [`crate::XdgModel`] query can report.
///
/// Configuration errors (`UnknownVolume`, `UnknownSurface`, `BackendNotBuilt`)
/// and the [`MeshError`]s they wrap are fatal — callers are expected to
/// propagate them. A query that simply finds nothing (no hit, no containing
/// volume) is not an error; it returns `MeshID::NONE` or the implicit
/// complement, per the individual query's documentation.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The mesh adapter reported a structural or numerical problem.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The requested volume has no registered acceleration structure.
    #[error("volume {0} is not registered with the query engine")]
    UnknownVolume(MeshID),

    /// The requested surface is not known to the mesh adapter.
    #[error("surface {0} is not registered with the query engine")]
    UnknownSurface(MeshID),

    /// A query was issued before [`crate::XdgModel::prepare`] built the
    /// acceleration structures.
    #[error("acceleration structures have not been built for this model")]
    BackendNotBuilt,
}
