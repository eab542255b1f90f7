use rayon::prelude::*;

use crate::error::Result;
use crate::math::Point3;
use crate::mesh::SurfaceMesh;
use crate::spatial::SpatialIndex;

use super::{ProjectPoint, Projection, ProjectionParams};

/// Projects a batch of independent points onto a surface mesh in parallel.
///
/// Results are returned in input order. A failure on one point does not
/// affect the others.
pub struct ProjectPoints {
    points: Vec<Point3>,
    params: ProjectionParams,
}

impl ProjectPoints {
    /// Creates a new `ProjectPoints` query with default parameters.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self::with_params(points, ProjectionParams::default())
    }

    /// Creates a new `ProjectPoints` query.
    #[must_use]
    pub fn with_params(points: Vec<Point3>, params: ProjectionParams) -> Self {
        Self { points, params }
    }

    /// Executes the batch against the mesh's own kd-tree.
    #[must_use]
    pub fn execute(&self, mesh: &SurfaceMesh) -> Vec<Result<Projection>> {
        self.execute_with(mesh, mesh.spatial_index())
    }

    /// Executes the batch using `index` for nearest-vertex lookups.
    #[must_use]
    pub fn execute_with<I>(&self, mesh: &SurfaceMesh, index: &I) -> Vec<Result<Projection>>
    where
        I: SpatialIndex + Sync + ?Sized,
    {
        self.points
            .par_iter()
            .map(|&point| ProjectPoint::with_params(point, self.params).execute_with(mesh, index))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ProjectionError, TrisurfError};
    use crate::mesh::tests::octahedron;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn mesh_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurfaceMesh>();
    }

    #[test]
    fn batch_matches_single_queries_in_order() {
        let mesh = octahedron();
        let points: Vec<Point3> = (0..300)
            .map(|k| {
                let a = f64::from(k) * 0.173;
                p(a.cos() * 2.0, a.sin() * 1.5, (a * 3.1).sin())
            })
            .collect();

        let batch = ProjectPoints::new(points.clone()).execute(&mesh);
        assert_eq!(batch.len(), points.len());
        for (q, result) in points.iter().zip(batch) {
            assert_eq!(result.unwrap(), mesh.project(q).unwrap());
        }
    }

    #[test]
    fn failures_stay_local_to_their_point() {
        let mesh = octahedron();
        let batch = ProjectPoints::new(vec![
            p(0.5, 0.5, 0.5),
            p(f64::NAN, 0.0, 0.0),
            p(-0.3, 0.2, -0.6),
        ])
        .execute(&mesh);

        assert!(batch[0].is_ok());
        assert!(matches!(
            batch[1],
            Err(TrisurfError::Projection(ProjectionError::NonFinitePoint))
        ));
        assert!(batch[2].is_ok());
    }

    #[test]
    fn empty_batch() {
        assert!(ProjectPoints::new(Vec::new()).execute(&octahedron()).is_empty());
    }
}
