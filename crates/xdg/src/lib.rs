#![warn(missing_docs)]

//! Discrete-geometry query engine: ray-fire, point-in-volume, closest-point,
//! element location, track segmentation, and volume/area measurement over a
//! triangle-surface-plus-tetrahedral-volume mesh.
//!
//! # Architecture
//!
//! - [`xdg_math`] — points, vectors, axis-aligned boxes, shared tolerances.
//! - [`xdg_mesh`] — [`MeshAdapter`], the entity model, and the in-memory
//!   [`SimpleMeshAdapter`] reference implementation.
//! - [`xdg_kernels`] — the primitive-intersection kernels (ray/triangle,
//!   tetrahedron containment, closest-point-on-triangle).
//! - [`xdg_raytrace`] — [`Driver`], the bounding-volume hierarchies built
//!   over a mesh and the queries run against them.
//! - [`xdg_query`] — [`XdgModel`], the facade composing all of the above
//!   into the full query surface.
//!
//! # Example
//!
//! ```
//! use xdg::{Orientation, XdgModel};
//! use xdg_math::{Dir3, Point3, Vec3};
//! use xdg_mesh::mock::box_with_tets;
//!
//! let (mesh, volume) = box_with_tets();
//! let model = XdgModel::prepare(mesh).unwrap();
//!
//! assert!((model.measure_volume(volume).unwrap() - 693.0).abs() < 1e-9);
//!
//! let origin = Point3::new(0.0, 0.0, 0.0);
//! let direction = Dir3::new_normalize(Vec3::new(0.0, 0.0, 1.0));
//! let (t, surface) = model
//!     .ray_fire(volume, origin, direction, f64::INFINITY, Orientation::Any, None)
//!     .unwrap();
//! assert!((t - 7.0).abs() < 1e-9);
//! assert!(surface.is_some());
//! ```

pub use xdg_kernels;
pub use xdg_math;
pub use xdg_mesh;
pub use xdg_query;
pub use xdg_raytrace;

pub use xdg_mesh::{MeshAdapter, MeshError, MeshID, SimpleMeshAdapter};
pub use xdg_query::{QueryError, XdgModel};
pub use xdg_raytrace::{Driver, Orientation};
