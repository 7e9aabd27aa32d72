//! Balanced k-nearest index over the full survey point set.
//!
//! Alternative to [`crate::TilePartition`] for surveys whose point density
//! does not bucket well into a uniform grid: one immutable k-d tree is built
//! at setup and every lattice query asks it for the k nearest points
//! directly, so no boundary-candidate rescue is needed.

use std::num::NonZero;

use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};

use crate::point::Point3;

/// Immutable k-d tree over survey points, queried by true 2D distance.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
    points: Vec<Point3>,
}

impl SpatialIndex {
    /// Build the index over `points`. The set is fixed afterwards.
    ///
    /// # Panics
    ///
    /// Panics on an empty point set; callers gate on survey size first.
    pub fn build(points: Vec<Point3>) -> Self {
        assert!(!points.is_empty(), "cannot index an empty point set");
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: ImmutableKdTree::new_from_slice(&entries),
            points,
        }
    }

    /// The `k` points nearest to `(x, y)`, with their distances, in
    /// ascending distance order. Yields fewer than `k` entries only when the
    /// whole index holds fewer points.
    pub fn nearest(&self, x: f64, y: f64, k: usize) -> Vec<(f64, Point3)> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[x, y], NonZero::new(k).unwrap())
            .into_iter()
            .map(|n| (n.distance.sqrt(), self.points[n.item]))
            .collect()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index holds no points (never true for a built index).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
