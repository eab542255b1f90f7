use thiserror::Error;

/// Top-level error type for the trisurf crate.
#[derive(Debug, Error)]
pub enum TrisurfError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors raised while building a [`SurfaceMesh`](crate::mesh::SurfaceMesh).
///
/// Any of these aborts construction; no partial mesh is ever returned.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    Empty,

    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex { vertex: usize },

    #[error("triangle {triangle} references vertex {index} of {vertex_count}")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("degenerate geometry: triangle {triangle} has normal magnitude {magnitude:e}")]
    DegenerateGeometry { triangle: usize, magnitude: f64 },
}

/// Errors raised by a single projection query.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("query point has a non-finite coordinate")]
    NonFinitePoint,

    #[error("spatial index holds no points")]
    EmptyIndex,

    #[error("spatial index returned vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("vertex {vertex} is not connected to any triangle, check your mesh")]
    UnconnectedVertex { vertex: usize },

    #[error("normals around vertex {vertex} cancel out")]
    DegenerateVertexNormal { vertex: usize },
}

/// Errors raised while reading a Wavefront OBJ surface.
///
/// `line` is 1-based.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: vertex position needs three numeric coordinates")]
    InvalidPosition { line: usize },

    #[error("line {line}: face references an invalid vertex index")]
    InvalidFace { line: usize },

    #[error("line {line}: face has {arity} vertices, only triangles are supported")]
    NonTriangularFace { line: usize, arity: usize },
}

/// Convenience type alias for results using [`TrisurfError`].
pub type Result<T> = std::result::Result<T, TrisurfError>;
