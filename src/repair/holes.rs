// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary loop tracing and small hole filling
//!
//! Every boundary edge is used by one face, which walks it in one direction.
//! Following those directed half-edges end to start traces the rim of each
//! hole. A patch face must walk the rim the other way round.

use crate::geometry::Face;
use crate::topology::{traverses, EdgeIndex};
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Chain of boundary vertices in the direction their faces walk them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryLoop {
    pub vertices: Vec<usize>,
    /// The chain returns to its first vertex
    pub closed: bool,
}

impl BoundaryLoop {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// What [`fill_loops`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleReport {
    /// Holes closed
    pub filled: usize,
    pub faces_added: usize,
    /// Open chains and loops that were too large or self-touching
    pub unresolved: Vec<BoundaryLoop>,
}

/// Trace all boundary edges into chains
///
/// Open chains are traced first, from vertices where a chain starts. The
/// remaining half-edges form closed loops. Output order follows the sorted
/// edge order of the index.
pub fn boundary_loops(faces: &[Face], index: &EdgeIndex) -> Vec<BoundaryLoop> {
    let half_edges: Vec<[usize; 2]> = index
        .boundary_edges()
        .map(|(edge, face)| {
            let [lo, hi] = edge.vertices();
            if traverses(&faces[face], lo, hi) {
                [lo, hi]
            } else {
                [hi, lo]
            }
        })
        .collect();
    if half_edges.is_empty() {
        return Vec::new();
    }

    let mut outgoing: AHashMap<usize, Vec<usize>> = AHashMap::new();
    let mut ends: AHashSet<usize> = AHashSet::new();
    for (i, &[from, to]) in half_edges.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
        ends.insert(to);
    }

    let mut used = vec![false; half_edges.len()];
    let mut loops = Vec::new();

    let heads: Vec<usize> = (0..half_edges.len())
        .filter(|&i| !ends.contains(&half_edges[i][0]))
        .collect();
    for start in heads.into_iter().chain(0..half_edges.len()) {
        if used[start] {
            continue;
        }

        let origin = half_edges[start][0];
        let mut vertices = vec![origin];
        let mut current = start;
        let closed = loop {
            used[current] = true;
            let to = half_edges[current][1];
            if to == origin {
                break true;
            }
            vertices.push(to);

            let next = outgoing
                .get(&to)
                .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
            match next {
                Some(next) => current = next,
                None => break false,
            }
        };

        loops.push(BoundaryLoop { vertices, closed });
    }

    debug!(
        edges = half_edges.len(),
        loops = loops.len(),
        "traced boundary loops"
    );
    loops
}

fn has_repeats(vertices: &[usize]) -> bool {
    let unique: AHashSet<&usize> = vertices.iter().collect();
    unique.len() != vertices.len()
}

fn sorted(face: &Face) -> Face {
    let mut key = *face;
    key.sort_unstable();
    key
}

/// An existing face already spans three of the rim's vertices
///
/// That is the case for the rim of a lone triangle or of a flat sheet, where
/// a patch would lay a second, reversed copy over the surface.
fn covers_existing(rim: &[usize], existing: &AHashSet<Face>) -> bool {
    let n = rim.len();
    (0..n).any(|i| {
        (i + 1..n).any(|j| {
            (j + 1..n).any(|k| existing.contains(&sorted(&[rim[i], rim[j], rim[k]])))
        })
    })
}

/// Patch faces for closed loops of three or four vertices
///
/// Quads are split along their shorter diagonal. Loops a patch would lay over
/// existing faces, and everything else, are returned in
/// [`HoleReport::unresolved`].
pub fn fill_loops(
    vertices: &[Point3<f64>],
    faces: &[Face],
    loops: Vec<BoundaryLoop>,
) -> (Vec<Face>, HoleReport) {
    let existing: AHashSet<Face> = faces.iter().map(sorted).collect();
    let mut faces = Vec::new();
    let mut report = HoleReport::default();

    for rim in loops {
        if !rim.closed
            || has_repeats(&rim.vertices)
            || covers_existing(&rim.vertices, &existing)
        {
            report.unresolved.push(rim);
            continue;
        }

        let patch = match rim.vertices[..] {
            [v0, v1, v2] => vec![[v0, v2, v1]],
            [v0, v1, v2, v3] => {
                let d02 = (vertices[v0] - vertices[v2]).norm_squared();
                let d13 = (vertices[v1] - vertices[v3]).norm_squared();
                if d02 <= d13 {
                    vec![[v0, v3, v2], [v0, v2, v1]]
                } else {
                    vec![[v3, v2, v1], [v3, v1, v0]]
                }
            }
            _ => Vec::new(),
        };
        if patch.is_empty() {
            report.unresolved.push(rim);
            continue;
        }
        faces.extend(patch);
        report.filled += 1;
    }

    report.faces_added = faces.len();
    if !report.unresolved.is_empty() {
        warn!(
            filled = report.filled,
            unresolved = report.unresolved.len(),
            "some holes were left open"
        );
    }
    (faces, report)
}
