// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh construction and queries
//!
//! Only structural problems are errors. Open boundaries, non-manifold edges and
//! unfilled holes are reported through query results instead.

use std::fmt;
use thiserror::Error;

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors raised by the mesh kernel
#[derive(Debug, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    InvalidTopology {
        /// Offending face index
        face: usize,
        /// Out-of-range vertex index
        index: usize,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// Convex hull requested on input that does not span three dimensions
    #[error("convex hull is degenerate: {0}")]
    DegenerateHull(HullDegeneracy),

    /// Strict mass properties requested on an open or non-manifold mesh
    #[error(
        "mesh is not watertight ({boundary_edges} boundary edges, {non_manifold_edges} non-manifold edges)"
    )]
    NotWatertight {
        boundary_edges: usize,
        non_manifold_edges: usize,
    },

    /// A per-face attribute array does not match the face count
    #[error("{attribute} has {actual} entries, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A tolerance that is negative or not finite
    #[error("invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),
}

/// Why a point set has no three-dimensional convex hull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullDegeneracy {
    /// Fewer than four input points
    TooFewPoints(usize),
    /// All points coincide
    Coincident,
    /// All points lie on one line
    Collinear,
    /// All points lie on one plane
    Coplanar,
}

impl fmt::Display for HullDegeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints(n) => write!(f, "need at least 4 points, got {}", n),
            Self::Coincident => write!(f, "all points coincide"),
            Self::Collinear => write!(f, "all points are collinear"),
            Self::Coplanar => write!(f, "all points are coplanar"),
        }
    }
}
