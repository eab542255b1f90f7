use crate::math::Point3;

use super::{Best, Nearest, SpatialIndex};

#[derive(Debug, Clone, Copy)]
struct Node {
    point: Point3,
    index: usize,
    axis: usize,
}

/// Balanced static kd-tree over a point set.
///
/// The tree is stored implicitly: every sub-slice `nodes[lo..hi]` is a subtree
/// whose root sits at its midpoint, with the left half holding coordinates
/// `<=` the root's along the split axis and the right half `>=`.
/// Build is O(N log N), queries are O(log N) on average.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
}

impl KdTree {
    /// Builds a kd-tree over `points`.
    #[must_use]
    pub fn new(points: &[Point3]) -> Self {
        let mut nodes: Vec<Node> = points
            .iter()
            .enumerate()
            .map(|(index, point)| Node {
                point: *point,
                index,
                axis: 0,
            })
            .collect();
        build(&mut nodes);
        Self { nodes }
    }
}

impl SpatialIndex for KdTree {
    fn nearest(&self, query: &Point3) -> Option<Nearest> {
        let mut best = None;
        search(&self.nodes, query, &mut best);
        best.map(Best::into_nearest)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

fn build(nodes: &mut [Node]) {
    if nodes.len() <= 1 {
        return;
    }

    let axis = widest_axis(nodes);
    let mid = nodes.len() / 2;
    nodes.select_nth_unstable_by(mid, |a, b| a.point[axis].total_cmp(&b.point[axis]));
    nodes[mid].axis = axis;

    let (left, rest) = nodes.split_at_mut(mid);
    build(left);
    build(&mut rest[1..]);
}

/// Axis with the largest coordinate spread.
fn widest_axis(nodes: &[Node]) -> usize {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for node in nodes {
        for axis in 0..3 {
            min[axis] = min[axis].min(node.point[axis]);
            max[axis] = max[axis].max(node.point[axis]);
        }
    }

    let mut widest = 0;
    for axis in 1..3 {
        if max[axis] - min[axis] > max[widest] - min[widest] {
            widest = axis;
        }
    }
    widest
}

fn search(nodes: &[Node], query: &Point3, best: &mut Option<Best>) {
    if nodes.is_empty() {
        return;
    }

    let mid = nodes.len() / 2;
    let node = &nodes[mid];
    Best::offer(best, node.index, (node.point - query).norm_squared());

    let diff = query[node.axis] - node.point[node.axis];
    let (near, far) = if diff < 0.0 {
        (&nodes[..mid], &nodes[mid + 1..])
    } else {
        (&nodes[mid + 1..], &nodes[..mid])
    };

    search(near, query, best);

    // `<=` keeps equidistant points on the far side eligible for the index tie-break.
    if best.is_none_or(|b| diff * diff <= b.dist_sq) {
        search(far, query, best);
    }
}
