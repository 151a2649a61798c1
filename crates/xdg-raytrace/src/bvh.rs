//! Bounding Volume Hierarchy over an externally-owned primitive buffer.
//!
//! Construction uses the Surface Area Heuristic with 12-bucket binning.
//! The tree itself only knows `usize` indices and `Aabb3` boxes; callers
//! supply the actual per-primitive test (ray/triangle, ray/tetrahedron,
//! closest-point) via a callback, so the same tree shape backs both the
//! ray-fire and closest-point-on-surface traversals.

use xdg_math::{Aabb3, Point3};

use crate::ray::{Ray, RayHit};

const LEAF_SIZE: usize = 4;
const NUM_BUCKETS: usize = 12;
const TRAVERSAL_COST: f64 = 0.125;

/// A node in the hierarchy: either a leaf holding primitive indices, or an
/// internal node with two children.
#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        aabb: Aabb3,
        items: Vec<usize>,
    },
    Internal {
        aabb: Aabb3,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } => *aabb,
            BvhNode::Internal { aabb, .. } => *aabb,
        }
    }
}

/// A bounding-volume hierarchy over a fixed set of primitive indices.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a tree over `entries`, each a `(primitive_index, aabb)` pair.
    /// Centroids are derived from each entry's own aabb.
    pub fn build(entries: &[(usize, Aabb3)]) -> Self {
        let mut data: Vec<(usize, Aabb3, Point3)> = entries
            .iter()
            .map(|(idx, aabb)| (*idx, *aabb, aabb.center()))
            .collect();

        let root = if data.is_empty() {
            None
        } else {
            Some(build_node(&mut data))
        };

        Self { root }
    }

    /// True if this tree holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Collect every intersection along `ray`, sorted by `t`. `test` maps a
    /// primitive index to its hits (normally zero, one, or two for a
    /// triangle/tetrahedron, but left open-ended).
    pub fn trace(&self, ray: &Ray, mut test: impl FnMut(usize) -> Vec<RayHit>) -> Vec<RayHit> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            trace_node(ray, root, &mut test, &mut hits);
        }
        hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        hits
    }

    /// Return only the closest intersection along `ray`.
    pub fn trace_closest(
        &self,
        ray: &Ray,
        mut test: impl FnMut(usize) -> Option<RayHit>,
    ) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        if let Some(root) = &self.root {
            trace_node_closest(ray, root, &mut test, &mut closest);
        }
        closest
    }

    /// Find the primitive whose `test` callback reports the smallest
    /// squared distance to `point`. `test` returns the closest point on the
    /// primitive and its squared distance to `point`.
    pub fn nearest(
        &self,
        point: Point3,
        mut test: impl FnMut(usize) -> (Point3, f64),
    ) -> Option<(usize, Point3, f64)> {
        let mut best: Option<(usize, Point3, f64)> = None;
        if let Some(root) = &self.root {
            nearest_node(point, root, &mut test, &mut best);
        }
        best
    }

    /// Find a primitive containing `point`, short-circuiting on the first
    /// match. Used for point-location queries (point-in-tetrahedron) rather
    /// than ray or nearest-distance traversal.
    pub fn locate(&self, point: Point3, mut test: impl FnMut(usize) -> bool) -> Option<usize> {
        self.root
            .as_ref()
            .and_then(|root| locate_node(point, root, &mut test))
    }
}

fn locate_node(point: Point3, node: &BvhNode, test: &mut impl FnMut(usize) -> bool) -> Option<usize> {
    if !node.aabb().contains(&point) {
        return None;
    }
    match node {
        BvhNode::Leaf { items, .. } => items.iter().copied().find(|&i| test(i)),
        BvhNode::Internal { left, right, .. } => {
            locate_node(point, left, test).or_else(|| locate_node(point, right, test))
        }
    }
}

fn trace_node(
    ray: &Ray,
    node: &BvhNode,
    test: &mut impl FnMut(usize) -> Vec<RayHit>,
    hits: &mut Vec<RayHit>,
) {
    match node {
        BvhNode::Leaf { aabb, items } => {
            if ray.intersect_aabb(aabb).is_some() {
                for &i in items {
                    hits.extend(test(i));
                }
            }
        }
        BvhNode::Internal { aabb, left, right } => {
            if ray.intersect_aabb(aabb).is_some() {
                trace_node(ray, left, test, hits);
                trace_node(ray, right, test, hits);
            }
        }
    }
}

fn trace_node_closest(
    ray: &Ray,
    node: &BvhNode,
    test: &mut impl FnMut(usize) -> Option<RayHit>,
    closest: &mut Option<RayHit>,
) {
    match node {
        BvhNode::Leaf { aabb, items } => {
            let Some((t_min, _)) = ray.intersect_aabb(aabb) else {
                return;
            };
            if let Some(c) = closest {
                if t_min >= c.t {
                    return;
                }
            }
            for &i in items {
                if let Some(hit) = test(i) {
                    if closest.is_none() || hit.t < closest.as_ref().unwrap().t {
                        *closest = Some(hit);
                    }
                }
            }
        }
        BvhNode::Internal { aabb, left, right } => {
            let Some((t_min, _)) = ray.intersect_aabb(aabb) else {
                return;
            };
            if let Some(c) = closest {
                if t_min >= c.t {
                    return;
                }
            }
            let left_t = ray.intersect_aabb(&left.aabb()).map(|(t, _)| t);
            let right_t = ray.intersect_aabb(&right.aabb()).map(|(t, _)| t);
            match (left_t, right_t) {
                (Some(lt), Some(rt)) if rt < lt => {
                    trace_node_closest(ray, right, test, closest);
                    trace_node_closest(ray, left, test, closest);
                }
                (Some(_), _) => {
                    trace_node_closest(ray, left, test, closest);
                    trace_node_closest(ray, right, test, closest);
                }
                (None, Some(_)) => {
                    trace_node_closest(ray, right, test, closest);
                }
                (None, None) => {}
            }
        }
    }
}

fn aabb_distance_squared(point: Point3, aabb: &Aabb3) -> f64 {
    let dx = (aabb.min.x - point.x).max(0.0).max(point.x - aabb.max.x);
    let dy = (aabb.min.y - point.y).max(0.0).max(point.y - aabb.max.y);
    let dz = (aabb.min.z - point.z).max(0.0).max(point.z - aabb.max.z);
    dx * dx + dy * dy + dz * dz
}

fn nearest_node(
    point: Point3,
    node: &BvhNode,
    test: &mut impl FnMut(usize) -> (Point3, f64),
    best: &mut Option<(usize, Point3, f64)>,
) {
    let bound = aabb_distance_squared(point, &node.aabb());
    if let Some((_, _, d2)) = best {
        if bound >= *d2 {
            return;
        }
    }
    match node {
        BvhNode::Leaf { items, .. } => {
            for &i in items {
                let (q, d2) = test(i);
                if best.is_none() || d2 < best.as_ref().unwrap().2 {
                    *best = Some((i, q, d2));
                }
            }
        }
        BvhNode::Internal { left, right, .. } => {
            let left_bound = aabb_distance_squared(point, &left.aabb());
            let right_bound = aabb_distance_squared(point, &right.aabb());
            if left_bound <= right_bound {
                nearest_node(point, left, test, best);
                nearest_node(point, right, test, best);
            } else {
                nearest_node(point, right, test, best);
                nearest_node(point, left, test, best);
            }
        }
    }
}

fn build_node(data: &mut [(usize, Aabb3, Point3)]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in data.iter() {
        bounds.update(&aabb.min);
        bounds.update(&aabb.max);
    }

    if data.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            items: data.iter().map(|(i, _, _)| *i).collect(),
        };
    }

    match find_best_split(data, &bounds) {
        Some((axis, pos)) => {
            let mid = partition(data, axis, pos);
            if mid == 0 || mid == data.len() {
                let mid = data.len() / 2;
                let (l, r) = data.split_at_mut(mid);
                BvhNode::Internal {
                    aabb: bounds,
                    left: Box::new(build_node(l)),
                    right: Box::new(build_node(r)),
                }
            } else {
                let (l, r) = data.split_at_mut(mid);
                BvhNode::Internal {
                    aabb: bounds,
                    left: Box::new(build_node(l)),
                    right: Box::new(build_node(r)),
                }
            }
        }
        None => BvhNode::Leaf {
            aabb: bounds,
            items: data.iter().map(|(i, _, _)| *i).collect(),
        },
    }
}

fn axis_of(p: Point3, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

fn find_best_split(data: &[(usize, Aabb3, Point3)], bounds: &Aabb3) -> Option<(usize, f64)> {
    let extent = bounds.max - bounds.min;
    let total_area = bounds.surface_area();

    let mut best_cost = f64::INFINITY;
    let mut best: Option<(usize, f64)> = None;

    for axis in 0..3 {
        let axis_extent = axis_of(bounds.max, axis) - axis_of(bounds.min, axis);
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = axis_of(bounds.min, axis);

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in data {
            let c = axis_of(*centroid, axis);
            let b = (((c - axis_min) / axis_extent) * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].update(&aabb.min);
            bucket_bounds[b].update(&aabb.max);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for b in 0..split {
                left_count += bucket_counts[b];
                if bucket_counts[b] > 0 {
                    left_bounds.update(&bucket_bounds[b].min);
                    left_bounds.update(&bucket_bounds[b].max);
                }
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for b in split..NUM_BUCKETS {
                right_count += bucket_counts[b];
                if bucket_counts[b] > 0 {
                    right_bounds.update(&bucket_bounds[b].min);
                    right_bounds.update(&bucket_bounds[b].max);
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = TRAVERSAL_COST
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best = Some((axis, axis_min + (split as f64 / NUM_BUCKETS as f64) * extent_axis(extent, axis)));
            }
        }
    }

    best
}

fn extent_axis(extent: xdg_math::Vec3, axis: usize) -> f64 {
    match axis {
        0 => extent.x,
        1 => extent.y,
        _ => extent.z,
    }
}

fn partition(data: &mut [(usize, Aabb3, Point3)], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = data.len();
    while left < right {
        if axis_of(data[left].2, axis) < pos {
            left += 1;
        } else {
            right -= 1;
            data.swap(left, right);
        }
    }
    left
}
