// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and operations

mod analytics;
mod bbox;
mod bvh;
mod hull;
mod mass;
mod mesh;
mod primitives;
mod ray;
mod sample;
mod section;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use bvh::{BVHNode, BVH};
pub use hull::convex_hull;
pub use mass::MassProperties;
pub use mesh::{Color, Face, Mesh, MeshData, ProcessReport, DEFAULT_COLOR};
pub use primitives::Primitive;
pub use ray::{ray_triangle, RayHit, RayMeshIntersector};
pub use sample::{sample_surface, SurfaceSample};
pub use section::{cross_section, CrossSection};
