#![warn(missing_docs)]

//! Primitive-intersection kernels: ray/triangle, point/tetrahedron, and
//! closest-point-on-triangle. Pure functions over raw vertex positions —
//! no mesh, no acceleration structure, no I/O.

mod closest_point;
mod plucker;
mod tetrahedron;

pub use closest_point::closest_point_on_triangle;
pub use plucker::{ray_triangle, RayTriangleHit};
pub use tetrahedron::{barycentric as tet_barycentric, contains as tet_contains};
