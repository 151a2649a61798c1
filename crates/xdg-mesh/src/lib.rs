#![warn(missing_docs)]

//! Mesh adapter contract and reference data model for the xdg
//! geometry-query engine.
//!
//! # Architecture
//!
//! [`MeshAdapter`] is the seam between a loaded mesh (wherever it came from)
//! and the rest of the workspace. It answers topology questions (which
//! surfaces bound a volume, which faces belong to a surface) and geometry
//! questions (vertex positions, normals, bounding boxes) but never builds an
//! acceleration structure and never traces a ray — that's `xdg-raytrace`'s
//! job, built on top of an adapter.
//!
//! [`SimpleMeshAdapter`] is an in-memory reference implementation; real
//! format adapters (HDF5-moab, Exodus-II) are out of scope for this engine.
//!
//! ```
//! use xdg_mesh::{MeshAdapter, Sense, SimpleMeshAdapter};
//! use xdg_math::Point3;
//!
//! let mut mesh = SimpleMeshAdapter::new();
//! let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let v2 = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! let face = mesh.add_face([v0, v1, v2]);
//! let surface = mesh.add_surface(vec![face]);
//! let volume = mesh.create_volume();
//! mesh.add_surface_to_volume(volume, surface, Sense::Forward, false).unwrap();
//! assert_eq!(mesh.num_volume_faces(volume).unwrap(), 1);
//! ```

mod adapter;
mod error;
mod id;
mod simple;
mod types;

#[cfg(feature = "testing")]
pub mod mock;

pub use adapter::MeshAdapter;
pub use error::MeshError;
pub use id::MeshID;
pub use simple::SimpleMeshAdapter;
pub use types::{Element, Face, Sense, Surface, Vertex, Volume};
