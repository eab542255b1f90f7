//! Closest-point projection of arbitrary points onto a [`SurfaceMesh`].
//!
//! A query is resolved locally around the mesh vertex nearest to it: the
//! point is first flattened onto that vertex's tangent plane, then tried
//! against each incident triangle, closest plane first.
//!
//! [`SurfaceMesh`]: crate::mesh::SurfaceMesh

mod project_point;
mod project_points;

pub use project_point::ProjectPoint;
pub use project_points::ProjectPoints;

use crate::math::{Point3, TOLERANCE};

/// Parameters controlling the projection.
///
/// The defaults reproduce the reference acceptance rule
/// `r <= 1, t <= 1, r + t <= 1.001`.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionParams {
    /// Slack allowed above `r + t = 1` when accepting a triangle.
    pub barycentric_slack: f64,
    /// Vertex-normal sums shorter than this are treated as degenerate.
    pub degenerate_tolerance: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            barycentric_slack: 1e-3,
            degenerate_tolerance: TOLERANCE,
        }
    }
}

/// Outcome of projecting a point onto a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// The projected point lies in `triangle`.
    Hit {
        /// Projected point on the triangle.
        point: Point3,
        /// Index of the containing triangle.
        triangle: usize,
    },
    /// No incident triangle contains the projection.
    ///
    /// `point` is the projection onto the plane of the last candidate
    /// triangle tried. It is a best guess and need not lie on the surface.
    Miss {
        /// Best-effort projected point.
        point: Point3,
    },
}

impl Projection {
    /// The projected point, whether or not a triangle was found.
    #[must_use]
    pub fn point(&self) -> &Point3 {
        match self {
            Self::Hit { point, .. } | Self::Miss { point } => point,
        }
    }

    /// The containing triangle, if any.
    #[must_use]
    pub fn triangle(&self) -> Option<usize> {
        match self {
            Self::Hit { triangle, .. } => Some(*triangle),
            Self::Miss { .. } => None,
        }
    }

    /// Returns `true` if a containing triangle was found.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// Splits into the projected point and the optional triangle.
    #[must_use]
    pub fn into_parts(self) -> (Point3, Option<usize>) {
        match self {
            Self::Hit { point, triangle } => (point, Some(triangle)),
            Self::Miss { point } => (point, None),
        }
    }
}
