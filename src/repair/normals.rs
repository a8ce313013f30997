// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Winding propagation and outward orientation

use crate::geometry::Face;
use crate::topology::{flipped, traverses, FaceAdjacency};
use crate::utils::math;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// What [`fix_winding`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalsReport {
    /// Connected components visited, singletons included
    pub components: usize,
    /// Faces whose stored winding differs from the input
    pub flipped_faces: usize,
    /// Components turned inside out to face outward
    pub inverted_components: usize,
}

/// Make winding agree across every manifold edge, then orient each component
/// so its signed volume is positive
///
/// Traversal only crosses edges shared by exactly two faces. Regions that are
/// reachable only through non-manifold edges are treated as separate
/// components and oriented on their own, so their relative winding is not
/// guaranteed. Components with no measurable volume keep the orientation of
/// their seed face.
pub fn fix_winding(
    vertices: &[Point3<f64>],
    faces: &mut [Face],
    adjacency: &FaceAdjacency,
    zero: f64,
) -> NormalsReport {
    let original = faces.to_vec();
    let neighbors = adjacency.neighbors(faces.len());
    let mut visited = vec![false; faces.len()];
    let mut queue = VecDeque::new();
    let mut report = NormalsReport::default();

    for seed in 0..faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        let mut component = Vec::new();
        while let Some(face) = queue.pop_front() {
            component.push(face);
            for &(neighbor, pair) in neighbors.of(face) {
                if visited[neighbor] {
                    continue;
                }
                visited[neighbor] = true;

                let [lo, hi] = adjacency.edges[pair].vertices();
                if traverses(&faces[face], lo, hi) == traverses(&faces[neighbor], lo, hi) {
                    faces[neighbor] = flipped(faces[neighbor]);
                }
                queue.push_back(neighbor);
            }
        }

        report.components += 1;
        if signed_volume(vertices, faces, &component) < -zero {
            for &face in &component {
                faces[face] = flipped(faces[face]);
            }
            report.inverted_components += 1;
        }
    }

    report.flipped_faces = faces
        .iter()
        .zip(&original)
        .filter(|(now, before)| now != before)
        .count();

    debug!(
        components = report.components,
        flipped = report.flipped_faces,
        inverted = report.inverted_components,
        "fixed winding"
    );
    report
}

/// Signed volume of a set of faces, measured about their vertex centroid
fn signed_volume(vertices: &[Point3<f64>], faces: &[Face], component: &[usize]) -> f64 {
    let sum: Vector3<f64> = component
        .iter()
        .flat_map(|&f| faces[f])
        .map(|v| vertices[v].coords)
        .sum();
    let center = Point3::from(sum / (component.len() * 3) as f64);

    component
        .iter()
        .map(|&f| {
            let [a, b, c] = faces[f].map(|v| Point3::from(vertices[v] - center));
            math::tetrahedron_signed_volume(&a, &b, &c)
        })
        .sum()
}
