// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face adjacency graph
//!
//! Two faces are adjacent when they are the only two users of an edge.
//! Edges with three or more faces are left out of the graph.

use super::edges::{traverses, Edge, EdgeIndex};
use crate::geometry::Face;

/// Pairs of faces sharing a manifold edge
#[derive(Debug, Clone, Default)]
pub struct FaceAdjacency {
    /// Face pairs, lower face index first, ordered by shared edge
    pub pairs: Vec<[usize; 2]>,
    /// Shared edge of each pair
    pub edges: Vec<Edge>,
}

/// Per-face neighbour lists packed into one arena
#[derive(Debug, Clone)]
pub struct Neighbors {
    offsets: Vec<usize>,
    /// `(neighbour face, adjacency pair index)`
    entries: Vec<(usize, usize)>,
}

impl Neighbors {
    pub fn of(&self, face: usize) -> &[(usize, usize)] {
        &self.entries[self.offsets[face]..self.offsets[face + 1]]
    }

    pub fn face_count(&self) -> usize {
        self.offsets.len() - 1
    }
}

impl FaceAdjacency {
    pub fn from_index(index: &EdgeIndex) -> Self {
        let mut adjacency = Self::default();
        for (edge, faces) in index.groups() {
            if let &[a, b] = faces {
                adjacency.pairs.push([a.min(b), a.max(b)]);
                adjacency.edges.push(edge);
            }
        }
        adjacency
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Build the neighbour arena for a mesh with `face_count` faces
    pub fn neighbors(&self, face_count: usize) -> Neighbors {
        let mut offsets = vec![0usize; face_count + 1];
        for &[a, b] in &self.pairs {
            offsets[a + 1] += 1;
            offsets[b + 1] += 1;
        }
        for i in 0..face_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut entries = vec![(0, 0); self.pairs.len() * 2];
        for (pair, &[a, b]) in self.pairs.iter().enumerate() {
            entries[cursor[a]] = (b, pair);
            cursor[a] += 1;
            entries[cursor[b]] = (a, pair);
            cursor[b] += 1;
        }

        Neighbors { offsets, entries }
    }
}

/// Every adjacency edge is walked in opposite directions by its two faces
pub fn is_winding_consistent(faces: &[Face], adjacency: &FaceAdjacency) -> bool {
    adjacency
        .pairs
        .iter()
        .zip(&adjacency.edges)
        .all(|(&[a, b], edge)| {
            let [lo, hi] = edge.vertices();
            traverses(&faces[a], lo, hi) != traverses(&faces[b], lo, hi)
        })
}
