use super::{Point3, Vector3};

/// Edge parameters of a point expressed in a triangle's frame.
///
/// For a triangle `(a, b, c)` and a coplanar point `p`,
/// `p = a + r * (b - a) + t * (c - a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeParams {
    /// Coefficient along `b - a`.
    pub r: f64,
    /// Coefficient along `c - a`.
    pub t: f64,
}

/// Unnormalized triangle normal `(b - a) × (c - a)`.
///
/// The winding order of `(a, b, c)` fixes the sign.
#[must_use]
pub fn raw_normal(a: &Point3, b: &Point3, c: &Point3) -> Vector3 {
    (b - a).cross(&(c - a))
}

/// Signed distance from `point` to the plane through `origin` with unit `normal`.
#[must_use]
pub fn signed_plane_distance(point: &Point3, origin: &Point3, normal: &Vector3) -> f64 {
    (point - origin).dot(normal)
}

/// Moves `point` along `normal` by `-distance`, landing on the plane.
#[must_use]
pub fn project_onto_plane(point: &Point3, distance: f64, normal: &Vector3) -> Point3 {
    point - normal * distance
}

/// Inside-triangle test using cross-product magnitude ratios.
///
/// `point` must already lie in the triangle's plane. The point is accepted when
/// both edge half-plane signs are non-negative, `r <= 1`, `t <= 1` and
/// `r + t <= 1 + slack`. Returns the edge parameters on acceptance.
#[must_use]
#[allow(clippy::similar_names)]
pub fn locate_in_triangle(
    point: &Point3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
    slack: f64,
) -> Option<EdgeParams> {
    let u = b - a;
    let v = c - a;
    let w = point - a;

    let vxw = v.cross(&w);
    let vxu = v.cross(&u);
    let uxw = u.cross(&w);

    let sign_r = vxw.dot(&vxu);
    let sign_t = uxw.dot(&(-vxu));
    if sign_r >= 0.0 && sign_t >= 0.0 {
        let denom = vxu.norm();
        let r = vxw.norm() / denom;
        let t = uxw.norm() / denom;

        // NaN ratios (zero-area triangle) fail every comparison.
        if r <= 1.0 && t <= 1.0 && r + t <= 1.0 + slack {
            return Some(EdgeParams { r, t });
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SLACK: f64 = 0.001;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn tri() -> (Point3, Point3, Point3) {
        (p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 2.0, 0.0))
    }

    #[test]
    fn raw_normal_follows_winding() {
        let (a, b, c) = tri();
        assert_eq!(raw_normal(&a, &b, &c), Vector3::new(0.0, 0.0, 8.0));
        assert_eq!(raw_normal(&a, &c, &b), Vector3::new(0.0, 0.0, -8.0));
    }

    #[test]
    fn plane_distance_is_signed() {
        let n = Vector3::z();
        let origin = p(0.0, 0.0, 1.0);
        assert!((signed_plane_distance(&p(3.0, 3.0, 4.0), &origin, &n) - 3.0).abs() < 1e-12);
        assert!((signed_plane_distance(&p(3.0, 3.0, -1.0), &origin, &n) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn projection_lands_on_plane() {
        let n = Vector3::new(1.0, 1.0, 0.0).normalize();
        let q = p(2.0, 1.0, 7.0);
        let d = signed_plane_distance(&q, &Point3::origin(), &n);
        let on = project_onto_plane(&q, d, &n);
        assert!(signed_plane_distance(&on, &Point3::origin(), &n).abs() < 1e-12);
        assert!((on.z - 7.0).abs() < 1e-12);
    }

    #[test]
    fn interior_point_reports_edge_params() {
        let (a, b, c) = tri();
        let params = locate_in_triangle(&p(1.0, 0.5, 0.0), &a, &b, &c, SLACK).unwrap();
        assert!((params.r - 0.25).abs() < 1e-12);
        assert!((params.t - 0.25).abs() < 1e-12);
    }

    #[test]
    fn corners_are_inside() {
        let (a, b, c) = tri();
        assert!(locate_in_triangle(&a, &a, &b, &c, SLACK).is_some());
        assert!(locate_in_triangle(&b, &a, &b, &c, SLACK).is_some());
        assert!(locate_in_triangle(&c, &a, &b, &c, SLACK).is_some());
    }

    #[test]
    fn point_behind_edge_is_rejected() {
        let (a, b, c) = tri();
        assert!(locate_in_triangle(&p(-0.1, 0.5, 0.0), &a, &b, &c, SLACK).is_none());
        assert!(locate_in_triangle(&p(1.0, -0.1, 0.0), &a, &b, &c, SLACK).is_none());
    }

    #[test]
    fn point_beyond_hypotenuse_is_rejected() {
        let (a, b, c) = tri();
        // r + t = 0.55 + 0.55
        assert!(locate_in_triangle(&p(2.2, 1.1, 0.0), &a, &b, &c, SLACK).is_none());
    }

    #[test]
    fn slack_tolerates_points_just_past_hypotenuse() {
        let (a, b, c) = tri();
        // r + t = 1.0005
        let q = p(4.0 * 0.5, 2.0 * 0.5005, 0.0);
        assert!(locate_in_triangle(&q, &a, &b, &c, SLACK).is_some());
        assert!(locate_in_triangle(&q, &a, &b, &c, 0.0).is_none());
    }

    #[test]
    fn degenerate_triangle_rejects_everything() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(2.0, 0.0, 0.0);
        assert!(locate_in_triangle(&p(0.5, 0.0, 0.0), &a, &b, &c, SLACK).is_none());
    }
}
