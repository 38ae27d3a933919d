//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete vertex positions.
///
/// Winding is **counter-clockwise (CCW) when viewed from the front**.
///
/// # Example
///
/// ```
/// use mesh_types::{Triangle, Point3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// assert!((tri.area() - 0.5).abs() < 1e-10);
/// let normal = tri.normal().unwrap();
/// assert!((normal.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal; its magnitude is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit face normal, or `None` for a degenerate triangle.
    #[inline]
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.normal_unnormalized().try_normalize(f64::EPSILON)
    }

    /// Triangle area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid (average of the three corners).
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Map two unit-interval draws to a uniformly distributed point on the triangle.
    ///
    /// Uses the square-root parameterisation, so `(r1, r2)` drawn uniformly
    /// from `[0, 1)²` yields a point uniform in area.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Triangle, Point3};
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// );
    /// assert_eq!(tri.point_from_unit_square(0.0, 0.7), tri.v0);
    /// ```
    #[must_use]
    pub fn point_from_unit_square(&self, r1: f64, r2: f64) -> Point3<f64> {
        let s = r1.sqrt();
        let a = 1.0 - s;
        let b = s * (1.0 - r2);
        let c = s * r2;
        Point3::from(self.v0.coords * a + self.v1.coords * b + self.v2.coords * c)
    }

    /// Check if the triangle has (near) zero area.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn area_and_normal() {
        let tri = right_triangle();
        assert_relative_eq!(tri.area(), 2.0);
        assert_relative_eq!(tri.normal_unnormalized().norm(), 4.0);
        let n = tri.normal().unwrap_or_else(Vector3::zeros);
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn degenerate_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert!(tri.is_degenerate(1e-12));
    }

    #[test]
    fn centroid() {
        let c = right_triangle().centroid();
        assert_relative_eq!(c.x, 2.0 / 3.0);
        assert_relative_eq!(c.y, 2.0 / 3.0);
    }

    #[test]
    fn unit_square_points_stay_on_triangle() {
        let tri = right_triangle();
        for &(r1, r2) in &[(0.1, 0.2), (0.5, 0.5), (0.99, 0.01), (1.0, 1.0)] {
            let p = tri.point_from_unit_square(r1, r2);
            assert!(p.x >= -1e-12 && p.y >= -1e-12);
            assert!(p.x + p.y <= 2.0 + 1e-12);
            assert_relative_eq!(p.z, 0.0);
        }
    }
}
