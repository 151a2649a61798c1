#![warn(missing_docs)]

//! Acceleration-structure construction and ray-tracing backend for a
//! [`xdg_mesh::MeshAdapter`]-backed model.
//!
//! # Architecture
//!
//! - [`ray`] — the [`Ray`] and [`RayHit`] types, plus the slab-method
//!   ray/AABB test the trees are pruned with.
//! - [`orientation`] — the [`Orientation`] filter controlling which
//!   crossings a ray-fire query reports.
//! - [`primitive`] — [`Primitive`], the triangle/tetrahedron payload stored
//!   in a tree's leaves.
//! - [`bvh`] — [`Bvh`], a generic surface-area-heuristic bounding volume
//!   hierarchy over externally-owned primitive indices.
//! - [`driver`] — [`Driver`], which builds one tree per volume (and, where
//!   a tet mesh exists, one element tree per volume) and answers ray-fire,
//!   closest-point, and point-location queries against them.
//!
//! # Example
//!
//! ```
//! use xdg_math::{Dir3, Point3, Vec3};
//! use xdg_mesh::mock::box_with_tets;
//! use xdg_raytrace::{Driver, Orientation};
//!
//! let (mesh, volume) = box_with_tets();
//! let driver = Driver::prepare(&mesh).unwrap();
//!
//! let origin = Point3::new(1.5, 1.5, -100.0);
//! let direction = Dir3::new_normalize(Vec3::new(0.0, 0.0, 1.0));
//! let hits = driver
//!     .ray_fire(volume, origin, direction, Orientation::Any, &[], None)
//!     .unwrap();
//! assert_eq!(hits.len(), 2);
//! ```

mod bvh;
mod driver;
mod orientation;
mod primitive;
mod ray;

pub use bvh::Bvh;
pub use driver::{Driver, SurfaceUserData, TreeHandle};
pub use orientation::Orientation;
pub use primitive::Primitive;
pub use ray::{Ray, RayHit};
