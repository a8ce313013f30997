// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Incremental 3D convex hull
//!
//! Starts from the largest tetrahedron found by extreme-point search and adds
//! the remaining points one at a time. A point replaces every face it can see
//! with a fan of faces built on the horizon of that region.

use super::{BoundingBox, Face, Mesh};
use crate::error::{HullDegeneracy, MeshError, Result};
use crate::topology::{face_edges, flipped};
use crate::utils::math;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Distances below this fraction of the bounding diagonal count as zero
const RELATIVE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
struct HullFace {
    vertices: Face,
    normal: Vector3<f64>,
    offset: f64,
    alive: bool,
}

impl HullFace {
    fn new(points: &[Point3<f64>], vertices: Face) -> Self {
        let [a, b, c] = vertices.map(|i| &points[i]);
        let normal = math::triangle_normal(a, b, c).unwrap_or_else(Vector3::zeros);
        Self {
            vertices,
            normal,
            offset: normal.dot(&a.coords),
            alive: true,
        }
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }
}

fn farthest<F>(candidates: impl Iterator<Item = usize>, measure: F) -> Option<(usize, f64)>
where
    F: Fn(usize) -> f64,
{
    candidates
        .map(|i| (i, measure(i)))
        .fold(None, |best, (i, d)| match best {
            Some((_, best_d)) if best_d >= d => best,
            _ => Some((i, d)),
        })
}

/// Pick four affinely independent points spanning as much volume as possible
fn initial_simplex(points: &[Point3<f64>], eps: f64) -> Result<[usize; 4]> {
    let degenerate = MeshError::DegenerateHull;

    let p0 = farthest(0..points.len(), |i| -points[i].x)
        .map(|(i, _)| i)
        .ok_or(degenerate(HullDegeneracy::TooFewPoints(0)))?;

    let (p1, d1) = farthest(0..points.len(), |i| (points[i] - points[p0]).norm())
        .ok_or(degenerate(HullDegeneracy::Coincident))?;
    if d1 <= eps {
        return Err(degenerate(HullDegeneracy::Coincident));
    }

    let axis = (points[p1] - points[p0]) / d1;
    let (p2, d2) = farthest(0..points.len(), |i| (points[i] - points[p0]).cross(&axis).norm())
        .ok_or(degenerate(HullDegeneracy::Collinear))?;
    if d2 <= eps {
        return Err(degenerate(HullDegeneracy::Collinear));
    }

    let normal = math::triangle_normal(&points[p0], &points[p1], &points[p2])
        .ok_or(degenerate(HullDegeneracy::Collinear))?;
    let (p3, d3) = farthest(0..points.len(), |i| (points[i] - points[p0]).dot(&normal).abs())
        .ok_or(degenerate(HullDegeneracy::Coplanar))?;
    if d3 <= eps {
        return Err(degenerate(HullDegeneracy::Coplanar));
    }

    Ok([p0, p1, p2, p3])
}

/// Convex hull of a point set as a closed, outward-wound mesh
///
/// Only points on the hull are kept as vertices. Fails with
/// [`MeshError::DegenerateHull`] when the points do not span three dimensions.
pub fn convex_hull(points: &[Point3<f64>]) -> Result<Mesh> {
    if points.len() < 4 {
        return Err(MeshError::DegenerateHull(HullDegeneracy::TooFewPoints(
            points.len(),
        )));
    }

    let diagonal = BoundingBox::from_points(points).diagonal();
    if !diagonal.is_finite() {
        return Err(MeshError::DegenerateHull(HullDegeneracy::Coincident));
    }
    let eps = diagonal * RELATIVE_EPSILON;

    let simplex = initial_simplex(points, eps)?;
    let interior = Point3::from(
        simplex
            .iter()
            .map(|&i| points[i].coords)
            .sum::<Vector3<f64>>()
            / 4.0,
    );

    let mut faces: Vec<HullFace> = Vec::new();
    let [a, b, c, d] = simplex;
    for tri in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
        let mut face = HullFace::new(points, tri);
        if face.distance(&interior) > 0.0 {
            face = HullFace::new(points, flipped(tri));
        }
        faces.push(face);
    }

    for (index, point) in points.iter().enumerate() {
        if simplex.contains(&index) {
            continue;
        }

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && f.distance(point) > eps)
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let mut visible_edges = AHashSet::with_capacity(visible.len() * 3);
        for &f in &visible {
            for [u, v] in face_edges(&faces[f].vertices) {
                visible_edges.insert((u, v));
            }
        }

        let mut horizon = Vec::new();
        for &f in &visible {
            faces[f].alive = false;
            for [u, v] in face_edges(&faces[f].vertices) {
                if !visible_edges.contains(&(v, u)) {
                    horizon.push([u, v]);
                }
            }
        }

        for [u, v] in horizon {
            faces.push(HullFace::new(points, [u, v, index]));
        }

        // Dead faces pile up; compact once they dominate
        if faces.len() > 64 && faces.iter().filter(|f| !f.alive).count() * 2 > faces.len() {
            faces.retain(|f| f.alive);
        }
    }

    let mut remap: AHashMap<usize, usize> = AHashMap::new();
    let mut vertices = Vec::new();
    let hull_faces: Vec<Face> = faces
        .iter()
        .filter(|f| f.alive)
        .map(|f| {
            f.vertices.map(|i| {
                *remap.entry(i).or_insert_with(|| {
                    vertices.push(points[i]);
                    vertices.len() - 1
                })
            })
        })
        .collect();

    debug!(
        input = points.len(),
        vertices = vertices.len(),
        faces = hull_faces.len(),
        "computed convex hull"
    );
    Ok(Mesh::from_trusted(vertices, hull_faces))
}
