//! End-to-end: load surfaces from OBJ text, then repeatedly pull candidate
//! tip points back onto them the way a branch-growth loop would.

#![allow(clippy::unwrap_used)]

use std::sync::Once;

use trisurf::io::read_wavefront;
use trisurf::math::triangle::signed_plane_distance;
use trisurf::math::{Point3, Vector3};
use trisurf::mesh::MeshParams;
use trisurf::{ProjectPoints, Projection, SurfaceMesh};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Cube of side 2 centered at the origin, two outward triangles per face.
const CUBE: &str = "\
v -1 -1 -1
v  1 -1 -1
v  1  1 -1
v -1  1 -1
v -1 -1  1
v  1 -1  1
v  1  1  1
v -1  1  1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 2 3 7
f 2 7 6
f 3 4 8
f 3 8 7
f 4 1 5
f 4 5 8
";

fn cube() -> SurfaceMesh {
    read_wavefront(&mut CUBE.as_bytes(), MeshParams::default()).unwrap()
}

#[test]
fn cube_normals_point_outward() {
    init_tracing();
    let mesh = cube();
    assert_eq!(mesh.triangle_count(), 12);
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.corners(t);
        let centroid: Vector3 = (a.coords + b.coords + c.coords) / 3.0;
        assert!(mesh.normal(t).dot(&centroid) > 0.0, "triangle {t}");
    }
}

/// Flat `n` by `n` sheet of unit squares in z = 0, written as OBJ text.
fn sheet_obj(n: usize) -> String {
    let mut obj = String::from("o sheet\n");
    for j in 0..=n {
        for i in 0..=n {
            obj.push_str(&format!("v {i} {j} 0\n"));
        }
    }
    // OBJ indices are 1-based.
    let vid = |i: usize, j: usize| j * (n + 1) + i + 1;
    for j in 0..n {
        for i in 0..n {
            let (v00, v10) = (vid(i, j), vid(i + 1, j));
            let (v11, v01) = (vid(i + 1, j + 1), vid(i, j + 1));
            obj.push_str(&format!("f {v00} {v10} {v11}\nf {v00} {v11} {v01}\n"));
        }
    }
    obj
}

fn sheet(n: usize) -> SurfaceMesh {
    read_wavefront(&mut sheet_obj(n).as_bytes(), MeshParams::default()).unwrap()
}

#[test]
fn growing_across_a_sheet_stays_on_it() {
    init_tracing();
    let mesh = sheet(6);
    assert_eq!(mesh.vertex_count(), 49);
    assert_eq!(mesh.triangle_count(), 72);

    // Each candidate tip leaves the surface and is pulled back onto it.
    let mut tip = Point3::new(0.55, 0.4, 0.0);
    let step = Vector3::new(0.3, 0.25, 0.2);
    for _ in 0..12 {
        let candidate = tip + step;
        let projection = mesh.project(&candidate).unwrap();
        assert!(projection.is_hit(), "lost the surface at {candidate:?}");
        tip = *projection.point();
        assert!(tip.z.abs() < 1e-12);
    }
    assert!((tip.x - 4.15).abs() < 1e-9);
    assert!((tip.y - 3.4).abs() < 1e-9);

    // Past the edge of the sheet the projection is a miss, not an error.
    let outside = mesh.project(&Point3::new(7.5, 3.0, 0.5)).unwrap();
    assert!(!outside.is_hit());
    assert!((outside.point() - Point3::new(7.5, 3.0, 0.0)).norm() < 1e-12);
}

#[test]
fn batch_of_tips_lands_in_containing_triangles() {
    init_tracing();
    let mesh = sheet(4);
    let tips = vec![
        Point3::new(0.3, 0.6, 1.0),
        Point3::new(1.7, 0.2, -0.5),
        Point3::new(3.6, 3.3, 0.25),
    ];
    let expected = [1, 2, 30];

    let results = ProjectPoints::new(tips.clone()).execute(&mesh);
    for ((tip, result), triangle) in tips.iter().zip(results).zip(expected) {
        let Projection::Hit { point, triangle: found } = result.unwrap() else {
            panic!("expected a hit for {tip:?}");
        };
        assert_eq!(found, triangle);
        assert!((point - Point3::new(tip.x, tip.y, 0.0)).norm() < 1e-12);
    }
}

#[test]
fn cube_queries_never_fail() {
    init_tracing();
    let mesh = cube();
    for k in 0..100 {
        let a = f64::from(k) * 0.41;
        let b = f64::from(k) * 0.23;
        let direction = Point3::new(a.cos() * b.sin(), a.sin() * b.sin(), b.cos());
        let q = direction * (1.0 + f64::from(k % 7));
        if let Projection::Hit { point, triangle } = mesh.project(&q).unwrap() {
            let [origin, _, _] = mesh.corners(triangle);
            assert!(signed_plane_distance(&point, origin, mesh.normal(triangle)).abs() < 1e-9);
        }
    }
}

#[test]
fn every_vertex_maps_to_itself() {
    init_tracing();
    let mesh = cube();
    for v in 0..mesh.vertex_count() {
        let (point, triangle) = mesh.project(mesh.vertex(v)).unwrap().into_parts();
        assert!(mesh.vertex_triangles(v).contains(&triangle.unwrap()));
        assert!((point - mesh.vertex(v)).norm() < 1e-12);
    }
}
