//! Reading surfaces from Wavefront OBJ data.
//!
//! Only `v` positions and `f` faces are read. Vertex `i` of the resulting
//! surface is the `i`-th `v` record of the stream, including vertices no face
//! references, and every face keeps the corner order written in the file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LoadError, Result};
use crate::math::Point3;
use crate::mesh::{MeshParams, SurfaceMesh};

/// Reads a Wavefront OBJ stream and builds a surface from it.
///
/// Objects and groups are merged into one surface. Face corners may carry
/// texture and normal references (`v/vt/vn`); those are ignored, as are point
/// and line elements, materials, smoothing groups and comments. Negative face
/// indices count back from the most recent position.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the stream cannot be read,
/// [`LoadError::InvalidPosition`] or [`LoadError::InvalidFace`] for malformed
/// records, [`LoadError::NonTriangularFace`] if any face is not a triangle,
/// and any error [`SurfaceMesh::with_params`] raises on the resulting
/// geometry.
pub fn read_wavefront<R: BufRead>(reader: &mut R, params: MeshParams) -> Result<SurfaceMesh> {
    let mut vertices = Vec::new();
    let mut connectivity = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(LoadError::from)?;
        let number = n + 1;
        let mut words = line.split_whitespace();
        match words.next() {
            Some("v") => vertices.push(read_position(words, number)?),
            Some("f") => connectivity.push(read_face(words, vertices.len(), number)?),
            _ => {}
        }
    }

    tracing::debug!(
        vertices = vertices.len(),
        triangles = connectivity.len(),
        "read wavefront surface"
    );

    SurfaceMesh::with_params(vertices, &connectivity, params)
}

/// Reads a Wavefront OBJ file and builds a surface from it.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened, otherwise see
/// [`read_wavefront`].
pub fn read_wavefront_file(path: impl AsRef<Path>, params: MeshParams) -> Result<SurfaceMesh> {
    let file = File::open(path.as_ref()).map_err(LoadError::from)?;
    read_wavefront(&mut BufReader::new(file), params)
}

/// Parses the coordinates of a `v` record. Trailing weight or color values
/// are ignored.
fn read_position<'a>(
    mut words: impl Iterator<Item = &'a str>,
    line: usize,
) -> std::result::Result<Point3, LoadError> {
    let mut coord = || {
        words
            .next()
            .and_then(|w| w.parse::<f64>().ok())
            .ok_or(LoadError::InvalidPosition { line })
    };
    Ok(Point3::new(coord()?, coord()?, coord()?))
}

/// Parses an `f` record into zero-based vertex indices, given the number of
/// positions read so far.
fn read_face<'a>(
    words: impl Iterator<Item = &'a str>,
    vertex_count: usize,
    line: usize,
) -> std::result::Result<[usize; 3], LoadError> {
    let corners = words
        .map(|word| {
            let position = word.split('/').next().unwrap_or(word);
            let index: i64 = position
                .parse()
                .map_err(|_| LoadError::InvalidFace { line })?;
            resolve_index(index, vertex_count).ok_or(LoadError::InvalidFace { line })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match corners[..] {
        [a, b, c] => Ok([a, b, c]),
        _ => Err(LoadError::NonTriangularFace {
            line,
            arity: corners.len(),
        }),
    }
}

/// OBJ indices are 1-based; negative ones are relative to the end.
fn resolve_index(index: i64, vertex_count: usize) -> Option<usize> {
    match index {
        0 => None,
        i if i > 0 => usize::try_from(i - 1).ok(),
        i => vertex_count.checked_sub(usize::try_from(i.unsigned_abs()).ok()?),
    }
}
