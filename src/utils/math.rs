// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Matrix4, Point3, Vector3};

/// Lengths at or below this are not unitized
pub const UNITIZE_EPSILON: f64 = 1e-12;

/// Scale a vector to unit length
///
/// Returns `None` for zero-length or non-finite input.
pub fn unitize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = v.norm();
    if norm > UNITIZE_EPSILON && norm.is_finite() {
        Some(v / norm)
    } else {
        None
    }
}

/// Apply a homogeneous transform to a set of points
pub fn transform_points(points: &[Point3<f64>], matrix: &Matrix4<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| matrix.transform_point(p)).collect()
}

/// Unnormalized triangle normal (`(b - a) x (c - a)`), twice the area in length
pub fn triangle_cross(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

/// Calculate the unit normal of a triangle, following its winding
pub fn triangle_normal(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<Vector3<f64>> {
    unitize(&triangle_cross(a, b, c))
}

/// Triangle centroid
pub fn triangle_centroid(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Signed volume of the tetrahedron spanned by the origin and a triangle
///
/// Positive when the triangle winds counter-clockwise seen from outside the origin.
pub fn tetrahedron_signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
}

/// Round to a number of significant digits
///
/// Negative zero is folded into positive zero so rounded values compare bitwise.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return if value == 0.0 { 0.0 } else { value };
    }
    let magnitude = value.abs().log10().floor() as i32;
    let exponent = digits as i32 - 1 - magnitude;
    let scale = 10f64.powi(exponent);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Two orthonormal vectors spanning the plane with the given normal
pub fn plane_basis(normal: &Vector3<f64>) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let n = unitize(normal)?;
    // Cross with the axis least aligned with n
    let helper = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vector3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = unitize(&n.cross(&helper))?;
    let v = n.cross(&u);
    Some((u, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unitize() {
        let v = unitize(&Vector3::new(3.0, 0.0, 4.0)).unwrap();
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 0.6, epsilon = 1e-12);
        assert!(unitize(&Vector3::zeros()).is_none());
        assert!(unitize(&Vector3::new(f64::NAN, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_triangle_helpers() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        assert_relative_eq!(triangle_cross(&a, &b, &c).norm(), 1.0, epsilon = 1e-12);
        assert_eq!(triangle_normal(&a, &b, &c), Some(Vector3::z()));
        assert_eq!(triangle_normal(&a, &c, &b), Some(-Vector3::z()));
        assert!(triangle_normal(&a, &b, &b).is_none());
    }

    #[test]
    fn test_tetrahedron_volume() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(tetrahedron_signed_volume(&a, &b, &c), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(tetrahedron_signed_volume(&a, &c, &b), -1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(123.456789, 4), 123.5);
        assert_eq!(round_significant(0.000123456, 3), 0.000123);
        assert_eq!(round_significant(-2.6e-7, 1), -3e-7);
        assert_eq!(round_significant(-0.0, 6).to_bits(), 0.0f64.to_bits());
        assert_eq!(round_significant(0.9999999999, 6), 1.0);
    }

    #[test]
    fn test_plane_basis() {
        let n = Vector3::new(1.0, 2.0, 3.0);
        let (u, v) = plane_basis(&n).unwrap();
        let n = n.normalize();
        assert!(u.dot(&n).abs() < 1e-12);
        assert!(v.dot(&n).abs() < 1e-12);
        assert!(u.dot(&v).abs() < 1e-12);
        assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
        assert!(plane_basis(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_transform_points() {
        let points = vec![Point3::new(1.0, 2.0, 3.0)];
        let matrix = Matrix4::new_translation(&Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(transform_points(&points, &matrix)[0], Point3::new(2.0, 3.0, 4.0));
    }
}
