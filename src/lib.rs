// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcore
//!
//! A triangle mesh kernel: validated vertex and face arrays with cached
//! topology, mass properties, repair passes, convex hulls and rigid-motion
//! invariant identifiers. File formats are thin adapters in [`io`].

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod io;
pub mod repair;
pub mod topology;
pub mod utils;

pub use config::{MeshConfig, ProcessOptions, Tolerances};
pub use error::{HullDegeneracy, MeshError, Result};
pub use geometry::{
    analyze, BoundingBox, CrossSection, Face, GeometryStats, MassProperties, Mesh, MeshData,
    Primitive, ProcessReport, RayMeshIntersector,
};
pub use identity::Identifier;
pub use repair::{BoundaryLoop, HoleReport, NormalsReport};
pub use topology::{Edge, EdgeReport, Facet};
