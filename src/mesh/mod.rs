mod adjacency;

pub use adjacency::VertexAdjacency;

use crate::error::{MeshError, ProjectionError, Result};
use crate::math::triangle::raw_normal;
use crate::math::{is_finite, Aabb, Point3, Vector3, TOLERANCE};
use crate::projection::{ProjectPoint, Projection};
use crate::spatial::{KdTree, Nearest, SpatialIndex};

/// Parameters controlling mesh construction.
#[derive(Debug, Clone, Copy)]
pub struct MeshParams {
    /// Triangles whose `|(b - a) × (c - a)|` falls below this are rejected
    /// as degenerate.
    pub degenerate_tolerance: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            degenerate_tolerance: TOLERANCE,
        }
    }
}

/// A triangle of a [`SurfaceMesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex indices in winding order.
    pub vertices: [usize; 3],
    /// Unit normal `normalize((b - a) × (c - a))`.
    pub normal: Vector3,
}

/// Immutable triangulated surface with derived normals, vertex adjacency
/// and a nearest-vertex index.
///
/// Built once through a validating constructor and never mutated, so a
/// `&SurfaceMesh` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    vertices: Vec<Point3>,
    triangles: Vec<Triangle>,
    adjacency: VertexAdjacency,
    index: KdTree,
    bounds: Aabb,
}

impl SurfaceMesh {
    /// Builds a surface from vertex positions and triangle connectivity
    /// using default [`MeshParams`].
    ///
    /// # Errors
    ///
    /// See [`with_params`](Self::with_params).
    pub fn new(vertices: Vec<Point3>, connectivity: &[[usize; 3]]) -> Result<Self> {
        Self::with_params(vertices, connectivity, MeshParams::default())
    }

    /// Builds a surface from N×3 coordinate rows and M×3 index rows.
    ///
    /// # Errors
    ///
    /// See [`with_params`](Self::with_params).
    pub fn from_arrays(positions: &[[f64; 3]], connectivity: &[[usize; 3]]) -> Result<Self> {
        let vertices = positions.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect();
        Self::new(vertices, connectivity)
    }

    /// Builds a surface from vertex positions and triangle connectivity.
    ///
    /// Computes a unit normal per triangle, the vertex → triangle adjacency
    /// and a kd-tree over the vertex positions.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] if there are no vertices,
    /// [`MeshError::NonFiniteVertex`] for NaN or infinite coordinates,
    /// [`MeshError::IndexOutOfRange`] if a triangle references a missing vertex,
    /// and [`MeshError::DegenerateGeometry`] if a triangle has (near) zero area.
    pub fn with_params(
        vertices: Vec<Point3>,
        connectivity: &[[usize; 3]],
        params: MeshParams,
    ) -> Result<Self> {
        let Some(bounds) = Aabb::from_points(&vertices) else {
            return Err(MeshError::Empty.into());
        };
        if let Some(vertex) = vertices.iter().position(|p| !is_finite(p)) {
            return Err(MeshError::NonFiniteVertex { vertex }.into());
        }

        let vertex_count = vertices.len();
        let mut triangles = Vec::with_capacity(connectivity.len());
        for (t, &tri) in connectivity.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle: t,
                    index,
                    vertex_count,
                }
                .into());
            }

            let [a, b, c] = tri;
            let n = raw_normal(&vertices[a], &vertices[b], &vertices[c]);
            let magnitude = n.norm();
            if !magnitude.is_finite() || magnitude < params.degenerate_tolerance {
                tracing::warn!(triangle = t, magnitude, "rejecting degenerate triangle");
                return Err(MeshError::DegenerateGeometry {
                    triangle: t,
                    magnitude,
                }
                .into());
            }

            triangles.push(Triangle {
                vertices: tri,
                normal: n / magnitude,
            });
        }

        let adjacency = VertexAdjacency::new(vertex_count, connectivity);
        let index = KdTree::new(&vertices);

        tracing::debug!(
            vertices = vertex_count,
            triangles = triangles.len(),
            min = ?bounds.min,
            max = ?bounds.max,
            diagonal = bounds.diagonal(),
            "built surface mesh"
        );

        Ok(Self {
            vertices,
            triangles,
            adjacency,
            index,
            bounds,
        })
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// All vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Position of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn vertex(&self, v: usize) -> &Point3 {
        &self.vertices[v]
    }

    /// All triangles.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is out of range.
    #[must_use]
    pub fn triangle(&self, t: usize) -> &Triangle {
        &self.triangles[t]
    }

    /// Unit normal of triangle `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is out of range.
    #[must_use]
    pub fn normal(&self, t: usize) -> &Vector3 {
        &self.triangles[t].normal
    }

    /// Corner positions of triangle `t` in winding order.
    ///
    /// # Panics
    ///
    /// Panics if `t` is out of range.
    #[must_use]
    pub fn corners(&self, t: usize) -> [&Point3; 3] {
        let [a, b, c] = self.triangles[t].vertices;
        [&self.vertices[a], &self.vertices[b], &self.vertices[c]]
    }

    /// The vertex → triangle adjacency table.
    #[must_use]
    pub fn adjacency(&self) -> &VertexAdjacency {
        &self.adjacency
    }

    /// Triangles incident to vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn vertex_triangles(&self, v: usize) -> &[usize] {
        self.adjacency.triangles_of(v)
    }

    /// The kd-tree over vertex positions.
    #[must_use]
    pub fn spatial_index(&self) -> &KdTree {
        &self.index
    }

    /// Bounding box of all vertices.
    #[must_use]
    pub fn bounding_box(&self) -> &Aabb {
        &self.bounds
    }

    /// Closest vertex to `point`.
    #[must_use]
    pub fn nearest_vertex(&self, point: &Point3) -> Option<Nearest> {
        self.index.nearest(point)
    }

    /// Vertex normal of `v`: the normalized plain sum of its incident
    /// triangle normals. Triangle areas are deliberately ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnconnectedVertex`] if no triangle uses `v`,
    /// and [`ProjectionError::DegenerateVertexNormal`] if the incident normals
    /// cancel out.
    pub fn vertex_normal(&self, v: usize) -> Result<Vector3> {
        self.vertex_normal_with_tolerance(v, TOLERANCE)
    }

    pub(crate) fn vertex_normal_with_tolerance(&self, v: usize, tolerance: f64) -> Result<Vector3> {
        let incident = self.adjacency.triangles_of(v);
        if incident.is_empty() {
            return Err(ProjectionError::UnconnectedVertex { vertex: v }.into());
        }

        let sum: Vector3 = incident.iter().map(|&t| self.triangles[t].normal).sum();
        let len = sum.norm();
        if len.is_nan() || len < tolerance {
            return Err(ProjectionError::DegenerateVertexNormal { vertex: v }.into());
        }
        Ok(sum / len)
    }

    /// Projects `point` onto the surface with default parameters.
    ///
    /// # Errors
    ///
    /// See [`ProjectPoint::execute`].
    pub fn project(&self, point: &Point3) -> Result<Projection> {
        ProjectPoint::new(*point).execute(self)
    }
}
