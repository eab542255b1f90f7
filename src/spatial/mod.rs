mod brute_force;
mod kd_tree;

pub use brute_force::BruteForce;
pub use kd_tree::KdTree;

use crate::math::Point3;

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the closest point in the indexed set.
    pub vertex: usize,
    /// Euclidean distance from the query to that point.
    pub distance: f64,
}

/// A static nearest-neighbor structure over a point set.
///
/// Indices returned by [`nearest`](SpatialIndex::nearest) refer to positions in
/// the slice the index was built from.
pub trait SpatialIndex {
    /// Returns the closest indexed point to `query`.
    ///
    /// Ties in distance are broken by the lowest index. Returns `None` when the
    /// index is empty. `query` is expected to be finite.
    fn nearest(&self, query: &Point3) -> Option<Nearest>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Returns `true` if no points are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Running best candidate shared by the index implementations.
#[derive(Debug, Clone, Copy)]
struct Best {
    index: usize,
    dist_sq: f64,
}

impl Best {
    #[allow(clippy::float_cmp)]
    fn offer(best: &mut Option<Best>, index: usize, dist_sq: f64) {
        let better = match best {
            None => true,
            Some(b) => dist_sq < b.dist_sq || (dist_sq == b.dist_sq && index < b.index),
        };
        if better {
            *best = Some(Best { index, dist_sq });
        }
    }

    fn into_nearest(self) -> Nearest {
        Nearest {
            vertex: self.index,
            distance: self.dist_sq.sqrt(),
        }
    }
}
