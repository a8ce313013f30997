// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coplanar facet grouping

use super::adjacency::FaceAdjacency;
use super::components::UnionFind;
use crate::utils::math;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A maximal group of connected, coplanar faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub faces: Vec<usize>,
    pub area: f64,
    pub normal: Vector3<f64>,
}

/// Join adjacent faces whose normals differ by at most `angle` radians
///
/// Only groups of two or more faces are returned, ordered by their smallest
/// face. Faces with a zero normal never join a facet.
pub fn facet_groups(
    normals: &[Vector3<f64>],
    adjacency: &FaceAdjacency,
    angle: f64,
) -> Vec<Vec<usize>> {
    let threshold = angle.clamp(0.0, std::f64::consts::PI).cos();
    let mut sets = UnionFind::new(normals.len());
    let mut joined = false;

    for &[a, b] in &adjacency.pairs {
        let (na, nb) = (&normals[a], &normals[b]);
        if na.norm_squared() == 0.0 || nb.norm_squared() == 0.0 {
            continue;
        }
        if na.dot(nb) >= threshold {
            joined |= sets.union(a, b);
        }
    }

    if !joined {
        return Vec::new();
    }
    sets.groups().into_iter().filter(|g| g.len() > 1).collect()
}

/// Attach total area and area-weighted normal to facet groups
pub fn describe_facets(
    groups: Vec<Vec<usize>>,
    normals: &[Vector3<f64>],
    areas: &[f64],
) -> Vec<Facet> {
    groups
        .into_iter()
        .map(|faces| {
            let area = faces.iter().map(|&f| areas[f]).sum();
            let weighted: Vector3<f64> = faces.iter().map(|&f| normals[f] * areas[f]).sum();
            let normal = math::unitize(&weighted).unwrap_or_else(|| normals[faces[0]]);
            Facet { faces, area, normal }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_has_six_unit_facets() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let facets = mesh.facets_with_area();

        assert_eq!(facets.len(), 6);
        for facet in &facets {
            assert_eq!(facet.faces.len(), 2);
            assert_relative_eq!(facet.area, 1.0, epsilon = 1e-12);
            assert_relative_eq!(facet.normal.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_has_no_facets() {
        let mesh = Primitive::sphere(1.0, 2).to_mesh();
        assert!(mesh.facets().is_empty());
        // A loose enough angle merges everything
        assert_eq!(mesh.facets_with_tolerance(1.0).len(), 1);
    }
}
