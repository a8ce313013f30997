// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Every primitive shares vertices between faces and winds faces outward, so
//! the results are watertight and have positive volume.

use super::{Face, Mesh};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Icosahedron { radius: f64 },
    Sphere { radius: f64, subdivisions: u32 },
    Cylinder { height: f64, radius: f64, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn icosahedron(radius: f64) -> Self {
        Self::Icosahedron { radius }
    }

    /// Icosphere: an icosahedron subdivided `subdivisions` times onto the sphere
    pub fn sphere(radius: f64, subdivisions: u32) -> Self {
        Self::Sphere {
            radius,
            subdivisions,
        }
    }

    pub fn cylinder(height: f64, radius: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Cylinder {
            height,
            radius,
            segments,
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cube { size, center } => generate_cube_mesh(size, center),
            Self::Icosahedron { radius } => generate_sphere_mesh(radius, 0),
            Self::Sphere {
                radius,
                subdivisions,
            } => generate_sphere_mesh(radius, subdivisions),
            Self::Cylinder {
                height,
                radius,
                segments,
            } => generate_cylinder_mesh(height, radius, segments),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = vec![
        // Front (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Back (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Top (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Bottom (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    Mesh::from_trusted(vertices, faces)
}

const ICOSAHEDRON_FACES: [Face; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> Vec<Vector3<f64>> {
    let t = (1.0 + 5f64.sqrt()) / 2.0;
    [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|v| Vector3::from(*v).normalize())
    .collect()
}

fn generate_sphere_mesh(radius: f64, subdivisions: u32) -> Mesh {
    let mut directions = icosahedron_vertices();
    let mut faces = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..subdivisions {
        let mut midpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut midpoint = |a: usize, b: usize, directions: &mut Vec<Vector3<f64>>| -> usize {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                directions.push((directions[a] + directions[b]).normalize());
                directions.len() - 1
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut directions);
            let bc = midpoint(b, c, &mut directions);
            let ca = midpoint(c, a, &mut directions);
            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }

    let vertices = directions
        .into_iter()
        .map(|d| Point3::from(d * radius))
        .collect();
    Mesh::from_trusted(vertices, faces)
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> Mesh {
    let segments = segments as usize;
    // Bottom center, top center, then alternating bottom and top rim vertices
    let mut vertices = Vec::with_capacity(2 + 2 * segments);
    vertices.push(Point3::new(0.0, 0.0, 0.0));
    vertices.push(Point3::new(0.0, 0.0, height));
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        vertices.push(Point3::new(radius * cos, radius * sin, 0.0));
        vertices.push(Point3::new(radius * cos, radius * sin, height));
    }

    let bottom = |i: usize| 2 + 2 * (i % segments);
    let top = |i: usize| 3 + 2 * (i % segments);

    let mut faces = Vec::with_capacity(4 * segments);
    for i in 0..segments {
        let (bi, bn, ti, tn) = (bottom(i), bottom(i + 1), top(i), top(i + 1));
        faces.push([0, bn, bi]);
        faces.push([1, ti, tn]);
        faces.push([bi, bn, ti]);
        faces.push([ti, bn, tn]);
    }

    Mesh::from_trusted(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_generation() {
        let mesh = generate_cube_mesh(Vector3::new(10.0, 10.0, 10.0), false);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
        assert_relative_eq!(mesh.volume(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_icosahedron() {
        let mesh = Primitive::icosahedron(1.0).to_mesh();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 20);
        assert!(mesh.is_watertight());
        assert_eq!(mesh.euler_number(), 2);
        assert!(mesh.volume() > 0.0);

        // On a regular polyhedron centred at the origin vertex normals point along the vertices
        for (point, normal) in mesh.vertices().iter().zip(mesh.vertex_normals()) {
            assert_relative_eq!(point.coords.normalize(), *normal, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sphere_subdivision_shares_vertices() {
        let mesh = Primitive::sphere(2.0, 2).to_mesh();
        assert_eq!(mesh.face_count(), 320);
        assert_eq!(mesh.vertex_count(), 162);
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
        for point in mesh.vertices() {
            assert_relative_eq!(point.coords.norm(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cylinder_is_closed() {
        let mesh = Primitive::cylinder(10.0, 5.0, 16).to_mesh();
        // 2 centers + 16 * 2 rim vertices
        assert_eq!(mesh.vertex_count(), 34);
        assert!(mesh.is_watertight());
        assert!(mesh.is_winding_consistent());
        assert!(mesh.volume() > 0.0);
        assert_relative_eq!(mesh.center_mass().z, 5.0, epsilon = 1e-9);
    }
}
