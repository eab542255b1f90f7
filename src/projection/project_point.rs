use crate::error::{ProjectionError, Result};
use crate::math::triangle::{locate_in_triangle, project_onto_plane, signed_plane_distance};
use crate::math::{is_finite, Point3};
use crate::mesh::SurfaceMesh;
use crate::spatial::SpatialIndex;

use super::{Projection, ProjectionParams};

/// Projects a single point onto a surface mesh.
pub struct ProjectPoint {
    point: Point3,
    params: ProjectionParams,
}

impl ProjectPoint {
    /// Creates a new `ProjectPoint` query with default parameters.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self::with_params(point, ProjectionParams::default())
    }

    /// Creates a new `ProjectPoint` query.
    #[must_use]
    pub fn with_params(point: Point3, params: ProjectionParams) -> Self {
        Self { point, params }
    }

    /// Executes the query against the mesh's own kd-tree.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub fn execute(&self, mesh: &SurfaceMesh) -> Result<Projection> {
        self.execute_with(mesh, mesh.spatial_index())
    }

    /// Executes the query using `index` for the nearest-vertex lookup.
    ///
    /// `index` must be built over `mesh.vertices()`.
    ///
    /// Candidate triangles are those incident to the nearest vertex. They are
    /// tried in ascending order of `|distance|` from the tangent-plane point to
    /// their own plane (ties keep adjacency order), and the first whose edges
    /// contain the in-plane projection wins.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::NonFinitePoint`] for NaN or infinite input,
    /// [`ProjectionError::EmptyIndex`] if `index` has no points,
    /// [`ProjectionError::VertexOutOfRange`] if `index` returns a vertex the
    /// mesh does not have,
    /// [`ProjectionError::UnconnectedVertex`] if the nearest vertex belongs to
    /// no triangle, and [`ProjectionError::DegenerateVertexNormal`] if its
    /// incident normals cancel out. A miss is not an error.
    pub fn execute_with<I>(&self, mesh: &SurfaceMesh, index: &I) -> Result<Projection>
    where
        I: SpatialIndex + ?Sized,
    {
        let point = &self.point;
        if !is_finite(point) {
            return Err(ProjectionError::NonFinitePoint.into());
        }

        let vertex = index
            .nearest(point)
            .ok_or(ProjectionError::EmptyIndex)?
            .vertex;
        if vertex >= mesh.vertex_count() {
            return Err(ProjectionError::VertexOutOfRange {
                vertex,
                vertex_count: mesh.vertex_count(),
            }
            .into());
        }

        let vertex_normal =
            mesh.vertex_normal_with_tolerance(vertex, self.params.degenerate_tolerance)?;

        // Flatten onto the tangent plane at the nearest vertex.
        let pre = project_onto_plane(
            point,
            signed_plane_distance(point, mesh.vertex(vertex), &vertex_normal),
            &vertex_normal,
        );

        let mut candidates: Vec<(usize, f64)> = mesh
            .vertex_triangles(vertex)
            .iter()
            .map(|&t| {
                let [a, _, _] = mesh.corners(t);
                (t, signed_plane_distance(&pre, a, mesh.normal(t)))
            })
            .collect();
        candidates.sort_by(|(_, d0), (_, d1)| d0.abs().total_cmp(&d1.abs()));

        let mut last = pre;
        for (t, distance) in candidates {
            let projected = project_onto_plane(&pre, distance, mesh.normal(t));
            let [a, b, c] = mesh.corners(t);
            if locate_in_triangle(&projected, a, b, c, self.params.barycentric_slack).is_some() {
                return Ok(Projection::Hit {
                    point: projected,
                    triangle: t,
                });
            }
            last = projected;
        }

        tracing::trace!(?point, vertex, "no incident triangle contains the projection");
        Ok(Projection::Miss { point: last })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{Rotation3, Translation3};

    use super::*;
    use crate::error::TrisurfError;
    use crate::math::Vector3;
    use crate::mesh::tests::{octahedron, quad};
    use crate::spatial::BruteForce;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// `n` by `n` unit squares in z = 0, each split along its
    /// lower-left to upper-right diagonal.
    fn grid_data(n: usize) -> (Vec<Point3>, Vec<[usize; 3]>) {
        let vid = |i: usize, j: usize| j * (n + 1) + i;
        let mut verts = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                verts.push(p(i as f64, j as f64, 0.0));
            }
        }
        let mut tris = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let (v00, v10) = (vid(i, j), vid(i + 1, j));
                let (v11, v01) = (vid(i + 1, j + 1), vid(i, j + 1));
                tris.push([v00, v10, v11]);
                tris.push([v00, v11, v01]);
            }
        }
        (verts, tris)
    }

    fn grid(n: usize) -> SurfaceMesh {
        let (verts, tris) = grid_data(n);
        SurfaceMesh::new(verts, &tris).unwrap()
    }

    /// Triangle of `grid(n)` that strictly contains `(x, y)`.
    fn grid_triangle(n: usize, x: f64, y: f64) -> usize {
        let (i, j) = (x.floor(), y.floor());
        let square = 2 * (j as usize * n + i as usize);
        if x - i > y - j {
            square
        } else {
            square + 1
        }
    }

    const GRID_SAMPLES: [(f64, f64); 6] = [
        (0.3, 0.6),
        (1.7, 0.2),
        (2.45, 3.9),
        (3.15, 1.1),
        (0.8, 2.35),
        (3.6, 3.3),
    ];

    /// Three triangles meeting at the origin with normals +z, +x, +y.
    fn corner() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(0.0, 0.0, 1.0),
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 1]],
        )
        .unwrap()
    }

    #[test]
    fn point_above_shared_diagonal() {
        let result = quad().project(&p(0.5, 0.5, 5.0)).unwrap();
        assert_abs_diff_eq!(*result.point(), p(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert!(matches!(result.triangle(), Some(0 | 1)));
    }

    #[test]
    fn point_above_first_triangle() {
        let result = quad().project(&p(0.2, 0.2, 3.0)).unwrap();
        assert_eq!(result.triangle(), Some(0));
        assert_abs_diff_eq!(*result.point(), p(0.2, 0.2, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn interior_points_find_their_triangle() {
        let mesh = quad();
        let below = mesh.project(&p(0.8, 0.3, 2.0)).unwrap();
        assert_eq!(below.triangle(), Some(0));
        let above = mesh.project(&p(0.3, 0.8, -1.0)).unwrap();
        assert_eq!(above.triangle(), Some(1));
        assert_abs_diff_eq!(*above.point(), p(0.3, 0.8, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn point_past_the_boundary_misses() {
        let result = quad().project(&p(5.0, 5.0, 0.0)).unwrap();
        assert!(!result.is_hit());
        assert_eq!(result.triangle(), None);
        assert_abs_diff_eq!(*result.point(), p(5.0, 5.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn miss_returns_last_tried_candidate() {
        // Plane distances from the tangent point (2, 1, -3) are
        // +y: 1, +x: 2, +z: -3, so the +z triangle is tried last.
        let result = corner().project(&p(-5.0, -6.0, -10.0)).unwrap();
        let (point, triangle) = result.into_parts();
        assert_eq!(triangle, None);
        assert_abs_diff_eq!(point, p(2.0, 1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn on_surface_points_are_fixed() {
        let mesh = grid(4);
        for (x, y) in GRID_SAMPLES {
            let q = p(x, y, 0.0);
            let result = mesh.project(&q).unwrap();
            assert_eq!(result.triangle(), Some(grid_triangle(4, x, y)), "({x}, {y})");
            assert_abs_diff_eq!(*result.point(), q, epsilon = 1e-12);
        }
    }

    #[test]
    fn points_off_a_tilted_plane_land_on_it() {
        let (verts, tris) = grid_data(4);
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.7)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), -0.4);
        let shift = Translation3::new(3.0, -2.0, 10.0);
        let place = |q: Point3| shift * (rotation * q);

        let mesh = SurfaceMesh::new(verts.into_iter().map(place).collect(), &tris).unwrap();
        let up = rotation * Vector3::z();

        for (x, y) in GRID_SAMPLES {
            let on = place(p(x, y, 0.0));
            for h in [0.0, 0.4, -1.5] {
                let result = mesh.project(&(on + up * h)).unwrap();
                assert_eq!(result.triangle(), Some(grid_triangle(4, x, y)));
                assert_abs_diff_eq!(*result.point(), on, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn reprojection_does_not_drift() {
        let mesh = grid(3);
        for q in [p(2.3, 1.6, 4.0), p(0.2, 0.9, -2.5), p(1.45, 2.05, 0.3)] {
            let first = mesh.project(&q).unwrap();
            let second = mesh.project(first.point()).unwrap();
            assert!(first.is_hit());
            assert_eq!(second.triangle(), first.triangle());
            assert_abs_diff_eq!(*second.point(), *first.point(), epsilon = 1e-12);
        }
    }

    #[test]
    fn vertices_project_onto_themselves() {
        let mesh = octahedron();
        for v in 0..mesh.vertex_count() {
            let result = mesh.project(mesh.vertex(v)).unwrap();
            let t = result.triangle().unwrap();
            assert!(mesh.vertex_triangles(v).contains(&t));
            assert_abs_diff_eq!(*result.point(), *mesh.vertex(v), epsilon = 1e-12);
        }
    }

    #[test]
    fn hits_lie_on_their_triangle() {
        let mesh = octahedron();
        for k in 0..64 {
            let angle = f64::from(k) * 0.7;
            let q = p(angle.cos(), angle.sin(), (f64::from(k) * 0.31).sin()) * 1.3;
            if let Projection::Hit { point, triangle } = mesh.project(&q).unwrap() {
                let [a, b, c] = mesh.corners(triangle);
                assert!(signed_plane_distance(&point, a, mesh.normal(triangle)).abs() < 1e-12);
                assert!(locate_in_triangle(&point, a, b, c, 1e-3).is_some());
            }
        }
    }

    #[test]
    fn far_points_never_fail() {
        let mesh = octahedron();
        for k in 0..200 {
            let a = f64::from(k) * 0.377;
            let b = f64::from(k) * 0.911;
            let q = p(a.cos() * b.sin(), a.sin() * b.sin(), b.cos()) * 1e4;
            let result = mesh.project(&q).unwrap();
            assert!(result.point().coords.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn brute_force_index_gives_same_answers() {
        let mesh = grid(5);
        let brute = BruteForce::new(mesh.vertices());
        for k in 0..40 {
            let t = f64::from(k);
            let q = p((t * 0.61).fract() * 6.0 - 0.5, (t * 0.37).fract() * 6.0 - 0.5, t.sin());
            let query = ProjectPoint::new(q);
            assert_eq!(
                query.execute(&mesh).unwrap(),
                query.execute_with(&mesh, &brute).unwrap()
            );
        }
    }

    #[test]
    fn unconnected_vertex_fails() {
        let mesh = SurfaceMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(10.0, 10.0, 10.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let err = mesh.project(&p(10.0, 10.0, 11.0)).unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Projection(ProjectionError::UnconnectedVertex { vertex: 4 })
        ));
        // Queries near connected vertices are unaffected.
        assert!(mesh.project(&p(0.2, 0.1, 1.0)).unwrap().is_hit());
    }

    #[test]
    fn cancelling_normals_fail() {
        let mesh = SurfaceMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            &[[0, 1, 2], [0, 2, 1]],
        )
        .unwrap();
        let err = mesh.project(&p(0.1, 0.1, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Projection(ProjectionError::DegenerateVertexNormal { vertex: 0 })
        ));
    }

    #[test]
    fn non_finite_query_fails() {
        let err = quad().project(&p(f64::NAN, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Projection(ProjectionError::NonFinitePoint)
        ));
        assert!(quad().project(&p(0.0, f64::INFINITY, 0.0)).is_err());
    }

    #[test]
    fn empty_index_fails() {
        let err = ProjectPoint::new(p(0.0, 0.0, 0.0))
            .execute_with(&quad(), &BruteForce::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Projection(ProjectionError::EmptyIndex)
        ));
    }

    #[test]
    fn index_over_other_points_fails() {
        let mut points = quad().vertices().to_vec();
        points.push(p(20.0, 20.0, 0.0));
        let wider = BruteForce::new(&points);
        let err = ProjectPoint::new(p(19.0, 19.0, 1.0))
            .execute_with(&quad(), &wider)
            .unwrap_err();
        assert!(matches!(
            err,
            TrisurfError::Projection(ProjectionError::VertexOutOfRange {
                vertex: 4,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn zero_slack_rejects_edge_overshoot() {
        let mesh = SurfaceMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            &[[0, 1, 2]],
        )
        .unwrap();
        // Just past the hypotenuse: r + t = 1.0004.
        let q = p(0.5002, 0.5002, 1.0);
        assert!(ProjectPoint::new(q).execute(&mesh).unwrap().is_hit());

        let strict = ProjectionParams {
            barycentric_slack: 0.0,
            ..ProjectionParams::default()
        };
        let result = ProjectPoint::with_params(q, strict).execute(&mesh).unwrap();
        assert!(!result.is_hit());
    }
}
