// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Best-effort repair of winding and small holes
//!
//! Vertex merging and face cleanup live on [`crate::Mesh`] itself. This module
//! holds the passes that reason about topology.

pub mod holes;
pub mod normals;

pub use holes::{boundary_loops, fill_loops, BoundaryLoop, HoleReport};
pub use normals::{fix_winding, NormalsReport};
