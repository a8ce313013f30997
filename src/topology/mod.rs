// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology engine - edges, adjacency, components and facets
//!
//! All structures here are flat index arenas built from the face array.
//! Faces that repeat a vertex index are skipped.

mod adjacency;
mod components;
mod edges;
mod facets;

pub use adjacency::{is_winding_consistent, FaceAdjacency, Neighbors};
pub use components::{connected_components, UnionFind};
pub use edges::{
    directed_edges, face_edges, flipped, is_degenerate, sorted_edges, traverses, Edge, EdgeIndex,
    EdgeReport,
};
pub use facets::{describe_facets, facet_groups, Facet};
