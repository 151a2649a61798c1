//! Error taxonomy for mesh-adapter operations.

use thiserror::Error;

use crate::MeshID;

/// Errors a [`crate::MeshAdapter`] implementation can report.
///
/// Configuration and topology errors (`NotFound`, `NotAParent`,
/// `SenseConflict`) are fatal: callers should propagate them rather than
/// swallow them. `Unsupported` and `DegenerateSurface` are the adapter's way
/// of reporting a numerical edge case or an optional capability it doesn't
/// implement; callers in the query engine treat those as "no answer" rather
/// than aborting.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The adapter does not implement this operation.
    #[error("operation not supported by this mesh adapter: {0}")]
    Unsupported(String),

    /// No entity exists with this id.
    #[error("no such mesh entity: {0}")]
    NotFound(MeshID),

    /// `volume` does not bound `surface`.
    #[error("volume {volume} is not a parent of surface {surface}")]
    NotAParent {
        /// The volume that was queried.
        volume: MeshID,
        /// The surface that is not bounded by `volume`.
        surface: MeshID,
    },

    /// A sense was already recorded for this surface side and `overwrite`
    /// was not requested.
    #[error("surface {surface} already has a sense recorded for this side")]
    SenseConflict {
        /// The surface whose sense conflicted.
        surface: MeshID,
    },

    /// A face referenced by this surface has zero area.
    #[error("surface {0} has a degenerate (zero-area) face")]
    DegenerateSurface(MeshID),

    /// The caller passed an argument the adapter cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
