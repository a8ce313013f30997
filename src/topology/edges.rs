// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge extraction and classification
//!
//! Edges are never stored on the mesh. [`EdgeIndex`] sorts every
//! `(edge, face)` record by canonical edge and keeps the runs of equal
//! edges, which is enough to answer boundary, interior and non-manifold
//! queries in one pass.

use crate::geometry::Face;
use serde::{Deserialize, Serialize};

/// Unordered vertex pair, stored with the smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge(usize, usize);

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        if v0 <= v1 {
            Self(v0, v1)
        } else {
            Self(v1, v0)
        }
    }

    pub fn low(&self) -> usize {
        self.0
    }

    pub fn high(&self) -> usize {
        self.1
    }

    pub fn vertices(&self) -> [usize; 2] {
        [self.0, self.1]
    }
}

/// A face that uses the same vertex more than once
pub fn is_degenerate(face: &Face) -> bool {
    face[0] == face[1] || face[1] == face[2] || face[0] == face[2]
}

/// Same triangle with reversed winding
pub fn flipped(face: Face) -> Face {
    [face[0], face[2], face[1]]
}

/// Directed edges of a face in winding order
pub fn face_edges(face: &Face) -> [[usize; 2]; 3] {
    [[face[0], face[1]], [face[1], face[2]], [face[2], face[0]]]
}

/// True if the face walks from `from` straight to `to`
pub fn traverses(face: &Face, from: usize, to: usize) -> bool {
    face_edges(face).contains(&[from, to])
}

pub fn directed_edges(faces: &[Face]) -> Vec<[usize; 2]> {
    faces.iter().flat_map(face_edges).collect()
}

pub fn sorted_edges(faces: &[Face]) -> Vec<Edge> {
    faces
        .iter()
        .flat_map(face_edges)
        .map(|[a, b]| Edge::new(a, b))
        .collect()
}

/// Edge counts by how many faces use each edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeReport {
    /// Distinct edges
    pub edges: usize,
    /// Shared by exactly two faces
    pub interior: usize,
    /// Used by a single face
    pub boundary: usize,
    /// Shared by three or more faces
    pub non_manifold: usize,
    pub boundary_edges: Vec<Edge>,
    pub non_manifold_edges: Vec<Edge>,
}

impl EdgeReport {
    pub fn is_closed(&self) -> bool {
        self.edges > 0 && self.boundary == 0 && self.non_manifold == 0
    }
}

/// Canonical edges of all non-degenerate faces, sorted and grouped
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    /// Canonical edge per record, ascending
    edges: Vec<Edge>,
    /// Face that contributed each record
    faces: Vec<usize>,
    /// Start of each run of equal edges, plus a final sentinel
    runs: Vec<usize>,
}

impl EdgeIndex {
    pub fn build(faces: &[Face]) -> Self {
        let mut records: Vec<(Edge, usize)> = faces
            .iter()
            .enumerate()
            .filter(|(_, face)| !is_degenerate(face))
            .flat_map(|(f, face)| face_edges(face).map(|[a, b]| (Edge::new(a, b), f)))
            .collect();
        records.sort_unstable();

        let mut runs = Vec::new();
        for (i, (edge, _)) in records.iter().enumerate() {
            if i == 0 || records[i - 1].0 != *edge {
                runs.push(i);
            }
        }
        runs.push(records.len());

        let (edges, faces) = records.into_iter().unzip();
        Self { edges, faces, runs }
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.runs.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Each distinct edge with the faces that use it, ascending by edge
    pub fn groups(&self) -> impl Iterator<Item = (Edge, &[usize])> + '_ {
        self.runs
            .windows(2)
            .map(move |w| (self.edges[w[0]], &self.faces[w[0]..w[1]]))
    }

    pub fn unique_edges(&self) -> Vec<Edge> {
        self.groups().map(|(edge, _)| edge).collect()
    }

    /// Edges used by exactly one face
    pub fn boundary_edges(&self) -> impl Iterator<Item = (Edge, usize)> + '_ {
        self.groups()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, faces)| (edge, faces[0]))
    }

    /// Boundary and non-manifold edge counts
    pub fn defect_counts(&self) -> (usize, usize) {
        self.groups()
            .fold((0, 0), |(boundary, non_manifold), (_, faces)| match faces.len() {
                1 => (boundary + 1, non_manifold),
                2 => (boundary, non_manifold),
                _ => (boundary, non_manifold + 1),
            })
    }

    /// Non-empty and every edge shared by exactly two faces
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.defect_counts() == (0, 0)
    }

    pub fn report(&self) -> EdgeReport {
        let mut report = EdgeReport {
            edges: self.len(),
            ..EdgeReport::default()
        };
        for (edge, faces) in self.groups() {
            match faces.len() {
                1 => {
                    report.boundary += 1;
                    report.boundary_edges.push(edge);
                }
                2 => report.interior += 1,
                _ => {
                    report.non_manifold += 1;
                    report.non_manifold_edges.push(edge);
                }
            }
        }
        report
    }
}
