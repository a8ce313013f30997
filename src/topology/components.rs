// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Connected components of the face adjacency graph

use super::adjacency::FaceAdjacency;

/// Disjoint-set forest with path halving and union by rank
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Join two sets, returning false if they were already joined
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    /// Members of each set, sets ordered by their smallest member
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let len = self.parent.len();
        let mut slot = vec![usize::MAX; len];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for x in 0..len {
            let root = self.find(x);
            if slot[root] == usize::MAX {
                slot[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot[root]].push(x);
        }
        groups
    }
}

/// Faces of each edge-connected component
///
/// Every face lands in exactly one component; faces without neighbours form
/// their own. Components are ordered by their smallest face and list faces in
/// ascending order.
pub fn connected_components(face_count: usize, adjacency: &FaceAdjacency) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(face_count);
    for &[a, b] in &adjacency.pairs {
        sets.union(a, b);
    }
    sets.groups()
}
