// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane cross-sections

use super::Mesh;
use crate::utils::math;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Segments where a plane cuts the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub origin: Point3<f64>,
    /// Unit plane normal
    pub normal: Vector3<f64>,
    pub segments: Vec<[Point3<f64>; 2]>,
    /// Face that produced each segment
    pub faces: Vec<usize>,
    /// Total segment length
    pub length: f64,
}

impl CrossSection {
    fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            origin,
            normal,
            segments: Vec::new(),
            faces: Vec::new(),
            length: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in plane coordinates, using an orthonormal basis of the plane
    pub fn to_planar(&self) -> Vec<[Point2<f64>; 2]> {
        let Some((u, v)) = math::plane_basis(&self.normal) else {
            return Vec::new();
        };
        let project = |p: &Point3<f64>| {
            let d = p - self.origin;
            Point2::new(d.dot(&u), d.dot(&v))
        };
        self.segments
            .iter()
            .map(|[a, b]| [project(a), project(b)])
            .collect()
    }
}

/// Intersect every face with the plane through `origin` with `normal`
///
/// Faces lying in the plane contribute nothing. An edge lying in the plane
/// is reported once for each face that owns it.
pub fn cross_section(mesh: &Mesh, origin: &Point3<f64>, normal: &Vector3<f64>) -> CrossSection {
    let Some(normal) = math::unitize(normal) else {
        return CrossSection::new(*origin, Vector3::zeros());
    };
    let mut section = CrossSection::new(*origin, normal);

    for (face, corners) in mesh.triangles().enumerate() {
        let dist = corners.map(|p| (p - origin).dot(&normal));
        if dist.iter().all(|&d| d > 0.0) || dist.iter().all(|&d| d < 0.0) {
            continue;
        }

        let mut points: Vec<Point3<f64>> = Vec::with_capacity(3);
        for i in 0..3 {
            let j = (i + 1) % 3;
            if dist[i] == 0.0 {
                points.push(corners[i]);
            } else if dist[i] * dist[j] < 0.0 {
                let t = dist[i] / (dist[i] - dist[j]);
                points.push(corners[i] + (corners[j] - corners[i]) * t);
            }
        }

        // Three points only when the whole face lies in the plane
        if let [a, b] = points[..] {
            section.length += (b - a).norm();
            section.segments.push([a, b]);
            section.faces.push(face);
        }
    }

    section
}

#[cfg(test)]
mod tests {
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_cube_midplane() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let section = mesh.cross_section(&Point3::new(0.0, 0.0, 0.5), &Vector3::new(0.0, 0.0, 2.0));

        assert_eq!(section.segments.len(), 8);
        assert_relative_eq!(section.length, 4.0, epsilon = 1e-12);
        for [a, b] in &section.segments {
            assert_relative_eq!(a.z, 0.5, epsilon = 1e-12);
            assert_relative_eq!(b.z, 0.5, epsilon = 1e-12);
        }

        let planar = section.to_planar();
        let length: f64 = planar.iter().map(|[a, b]| (b - a).norm()).sum();
        assert_relative_eq!(length, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_missing_mesh() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let section = mesh.cross_section(&Point3::new(0.0, 0.0, 3.0), &Vector3::z());
        assert!(section.is_empty());
        assert_eq!(section.length, 0.0);
    }
}
