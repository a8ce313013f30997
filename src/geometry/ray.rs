// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ray queries against a mesh

use super::{BoundingBox, Mesh, BVH};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Fixed, deliberately irregular direction for containment rays
const CONTAINS_DIRECTION: [f64; 3] = [0.439_506_445_5, 0.617_598_629_942, 0.652_231_566_745];

/// Where a ray meets a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub ray: usize,
    pub face: usize,
    pub location: Point3<f64>,
    /// Distance along the ray in units of its direction vector
    pub distance: f64,
}

/// Möller–Trumbore ray/triangle test, returning the ray parameter of the hit
pub fn ray_triangle(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    triangle: &[Point3<f64>; 3],
) -> Option<f64> {
    const EPSILON: f64 = 1e-12;
    let [a, b, c] = triangle;

    let e1 = b - a;
    let e2 = c - a;
    let p = direction.cross(&e2);
    let det = e1.dot(&p);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(&p) * inv_det;
    if !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(&e1);
    let v = direction.dot(&q) * inv_det;
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return None;
    }

    let t = e2.dot(&q) * inv_det;
    (t > EPSILON).then_some(t)
}

/// Ray intersector over a borrowed mesh
///
/// The BVH is built on first use and lives as long as the intersector.
pub struct RayMeshIntersector<'a> {
    mesh: &'a Mesh,
    bvh: OnceLock<BVH>,
}

impl<'a> RayMeshIntersector<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            bvh: OnceLock::new(),
        }
    }

    fn bvh(&self) -> &BVH {
        self.bvh.get_or_init(|| {
            let triangles = self
                .mesh
                .triangles()
                .enumerate()
                .map(|(face, tri)| (face, BoundingBox::from_points(tri.iter())))
                .collect();
            debug!(faces = self.mesh.face_count(), "built ray BVH");
            BVH::build(triangles)
        })
    }

    /// Every hit of one ray, nearest first
    pub fn ray_hits(&self, ray: usize, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<RayHit> {
        let vertices = self.mesh.vertices();
        let faces = self.mesh.faces();
        let mut hits: Vec<RayHit> = self
            .bvh()
            .query_ray(origin, direction)
            .into_iter()
            .filter_map(|face| {
                let triangle = faces[face].map(|i| vertices[i]);
                ray_triangle(origin, direction, &triangle).map(|distance| RayHit {
                    ray,
                    face,
                    location: origin + direction * distance,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.face.cmp(&b.face)));
        hits
    }

    /// All hits of all rays
    pub fn intersects_location(
        &self,
        origins: &[Point3<f64>],
        directions: &[Vector3<f64>],
    ) -> Vec<RayHit> {
        origins
            .iter()
            .zip(directions)
            .enumerate()
            .flat_map(|(ray, (origin, direction))| self.ray_hits(ray, origin, direction))
            .collect()
    }

    /// `(ray, face)` for every hit
    pub fn intersects_id(
        &self,
        origins: &[Point3<f64>],
        directions: &[Vector3<f64>],
    ) -> Vec<(usize, usize)> {
        self.intersects_location(origins, directions)
            .into_iter()
            .map(|hit| (hit.ray, hit.face))
            .collect()
    }

    /// Whether each ray hits anything
    pub fn intersects_any(&self, origins: &[Point3<f64>], directions: &[Vector3<f64>]) -> Vec<bool> {
        origins
            .iter()
            .zip(directions)
            .enumerate()
            .map(|(ray, (origin, direction))| !self.ray_hits(ray, origin, direction).is_empty())
            .collect()
    }

    /// Nearest hit of a single ray
    pub fn intersects_first(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<RayHit> {
        self.ray_hits(0, origin, direction).into_iter().next()
    }

    /// Inside test by counting surface crossings along a fixed ray
    ///
    /// Only meaningful for watertight meshes. Hits at the same distance, as
    /// happens when the ray passes through a shared edge, count once.
    pub fn contains_points(&self, points: &[Point3<f64>]) -> Vec<bool> {
        let bounds = self.bvh().bounds();
        let merge_distance = bounds.diagonal() * 1e-9;
        let direction = Vector3::from(CONTAINS_DIRECTION).normalize();

        points
            .iter()
            .map(|point| {
                if bounds.is_empty() || !bounds.intersects(&BoundingBox::new(*point, *point)) {
                    return false;
                }
                let hits = self.ray_hits(0, point, &direction);
                let mut crossings = 0usize;
                let mut last = f64::NEG_INFINITY;
                for hit in &hits {
                    if hit.distance - last > merge_distance {
                        crossings += 1;
                        last = hit.distance;
                    }
                }
                crossings % 2 == 1
            })
            .collect()
    }
}
