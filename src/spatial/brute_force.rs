use crate::math::Point3;

use super::{Best, Nearest, SpatialIndex};

/// Linear-scan nearest-neighbor lookup.
///
/// O(N) per query. Serves as the reference the [`KdTree`](super::KdTree) is
/// checked against, and is adequate for meshes with a handful of vertices.
#[derive(Debug, Clone, Default)]
pub struct BruteForce {
    points: Vec<Point3>,
}

impl BruteForce {
    /// Creates a linear-scan index over `points`.
    #[must_use]
    pub fn new(points: &[Point3]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl SpatialIndex for BruteForce {
    fn nearest(&self, query: &Point3) -> Option<Nearest> {
        let mut best = None;
        for (index, p) in self.points.iter().enumerate() {
            Best::offer(&mut best, index, (p - query).norm_squared());
        }
        best.map(Best::into_nearest)
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
