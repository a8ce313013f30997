// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Duplicate detection across many meshes

use super::Identifier;
use crate::geometry::Mesh;
use ahash::AHashMap;
use rayon::prelude::*;
use tracing::info;

/// One kept mesh and the input positions folded into it
#[derive(Debug, Clone)]
pub struct UniqueMesh {
    pub mesh: Mesh,
    /// Input indices in this group, the kept one first
    pub sources: Vec<usize>,
}

impl UniqueMesh {
    /// How many inputs were discarded in favour of this one
    pub fn duplicates(&self) -> usize {
        self.sources.len() - 1
    }
}

/// Group input indices by identifier
///
/// Identifiers are computed in parallel. Groups are ordered by their first
/// member and members keep input order.
pub fn group_duplicates(meshes: &[Mesh]) -> Vec<Vec<usize>> {
    let identifiers: Vec<Identifier> = meshes.par_iter().map(|m| *m.identifier()).collect();

    let mut slots: AHashMap<Identifier, usize> = AHashMap::with_capacity(identifiers.len());
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, identifier) in identifiers.into_iter().enumerate() {
        let slot = *slots.entry(identifier).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

/// Keep the first mesh of every duplicate group and drop the rest
pub fn merge_duplicates(meshes: Vec<Mesh>) -> Vec<UniqueMesh> {
    let total = meshes.len();
    let groups = group_duplicates(&meshes);

    let mut slots: Vec<Option<Mesh>> = meshes.into_iter().map(Some).collect();
    let unique: Vec<UniqueMesh> = groups
        .into_iter()
        .filter_map(|sources| {
            let mesh = slots[sources[0]].take()?;
            Some(UniqueMesh { mesh, sources })
        })
        .collect();

    info!(
        input = total,
        unique = unique.len(),
        discarded = total - unique.len(),
        "merged duplicate meshes"
    );
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Matrix4, Rotation3, Vector3};

    fn moved(mesh: &Mesh, angle: f64, offset: f64) -> Mesh {
        let mut copy = mesh.clone();
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), angle).to_homogeneous();
        copy.transform(&(Matrix4::new_translation(&Vector3::new(offset, 0.0, -offset)) * rotation));
        copy
    }

    fn fixtures() -> Vec<Mesh> {
        let cube = Primitive::cube(Vector3::new(2.0, 1.0, 1.0), false).to_mesh();
        let sphere = Primitive::sphere(1.0, 1).to_mesh();
        vec![
            cube.clone(),
            sphere.clone(),
            moved(&cube, 0.7, 4.0),
            moved(&sphere, 2.1, -9.0),
            moved(&cube, -1.3, 0.5),
            Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh(),
        ]
    }

    #[test]
    fn test_group_duplicates() {
        let groups = group_duplicates(&fixtures());
        assert_eq!(groups, vec![vec![0, 2, 4], vec![1, 3], vec![5]]);
    }

    #[test]
    fn test_merge_duplicates_keeps_first() {
        let meshes = fixtures();
        let first_cube_vertices = meshes[0].vertices().to_vec();

        let unique = merge_duplicates(meshes);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].duplicates(), 2);
        assert_eq!(unique[1].duplicates(), 1);
        assert_eq!(unique[2].duplicates(), 0);
        assert_eq!(unique[0].mesh.vertices(), first_cube_vertices.as_slice());
    }

    #[test]
    fn test_empty_input() {
        assert!(group_duplicates(&[]).is_empty());
        assert!(merge_duplicates(Vec::new()).is_empty());
    }
}
