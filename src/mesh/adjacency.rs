/// Vertex → incident-triangle table.
///
/// Stored in compressed-row form: the triangles incident to vertex `v` are
/// `triangles[offsets[v]..offsets[v + 1]]`, in ascending triangle order.
/// It is the exact inverse of the triangle connectivity it was built from.
#[derive(Debug, Clone, Default)]
pub struct VertexAdjacency {
    offsets: Vec<usize>,
    triangles: Vec<usize>,
}

impl VertexAdjacency {
    /// Builds the table for `vertex_count` vertices.
    ///
    /// Every index in `connectivity` must be `< vertex_count`, and no triangle
    /// may repeat a vertex.
    #[must_use]
    pub fn new(vertex_count: usize, connectivity: &[[usize; 3]]) -> Self {
        let mut offsets = vec![0usize; vertex_count + 1];
        for tri in connectivity {
            for &v in tri {
                offsets[v + 1] += 1;
            }
        }
        for v in 0..vertex_count {
            offsets[v + 1] += offsets[v];
        }

        let mut cursor = offsets.clone();
        let mut triangles = vec![0usize; connectivity.len() * 3];
        for (t, tri) in connectivity.iter().enumerate() {
            for &v in tri {
                triangles[cursor[v]] = t;
                cursor[v] += 1;
            }
        }

        Self { offsets, triangles }
    }

    /// Triangles incident to vertex `v`. Empty for unconnected vertices.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn triangles_of(&self, v: usize) -> &[usize] {
        &self.triangles[self.offsets[v]..self.offsets[v + 1]]
    }

    /// Number of triangles incident to vertex `v`.
    #[must_use]
    pub fn degree(&self, v: usize) -> usize {
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Number of vertices covered by the table.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_around_center_vertex() {
        // Four triangles sharing vertex 0.
        let conn = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
        let adj = VertexAdjacency::new(5, &conn);
        assert_eq!(adj.triangles_of(0), &[0, 1, 2, 3]);
        assert_eq!(adj.triangles_of(1), &[0, 3]);
        assert_eq!(adj.triangles_of(2), &[0, 1]);
        assert_eq!(adj.triangles_of(4), &[2, 3]);
        assert_eq!(adj.degree(3), 2);
    }

    #[test]
    fn unreferenced_vertex_has_no_triangles() {
        let adj = VertexAdjacency::new(4, &[[0, 1, 2]]);
        assert_eq!(adj.vertex_count(), 4);
        assert!(adj.triangles_of(3).is_empty());
        assert_eq!(adj.degree(3), 0);
    }

    #[test]
    fn inverse_of_connectivity() {
        let conn = [[0, 1, 2], [2, 1, 3], [3, 4, 2], [5, 4, 3], [0, 2, 5]];
        let adj = VertexAdjacency::new(6, &conn);
        for v in 0..6 {
            for (t, tri) in conn.iter().enumerate() {
                assert_eq!(adj.triangles_of(v).contains(&t), tri.contains(&v));
            }
        }
        let total: usize = (0..6).map(|v| adj.degree(v)).sum();
        assert_eq!(total, conn.len() * 3);
    }
}
