pub mod aabb;
pub mod triangle;

pub use aabb::Aabb;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `true` if every coordinate of `point` is finite.
#[must_use]
pub fn is_finite(point: &Point3) -> bool {
    point.coords.iter().all(|c| c.is_finite())
}
