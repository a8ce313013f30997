// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parallel operations over independent meshes using rayon
//!
//! Every mesh owns its arrays and caches, so work on separate meshes needs no
//! coordination.

use crate::config::ProcessOptions;
use crate::geometry::{MassProperties, Mesh, ProcessReport};
use crate::identity::Identifier;
use rayon::prelude::*;

/// Mass properties of each mesh, in input order
pub fn mass_properties_parallel(meshes: &[Mesh]) -> Vec<MassProperties> {
    meshes.par_iter().map(|m| *m.mass_properties()).collect()
}

/// Identifier of each mesh, in input order
pub fn identifiers_parallel(meshes: &[Mesh]) -> Vec<Identifier> {
    meshes.par_iter().map(|m| *m.identifier()).collect()
}

/// Run the cleanup pipeline on every mesh in place
pub fn process_parallel(meshes: &mut [Mesh], options: &ProcessOptions) -> Vec<ProcessReport> {
    meshes.par_iter_mut().map(|m| m.process(options)).collect()
}

/// Split into connected bodies and measure each one
pub fn split_and_measure(mesh: &Mesh, only_watertight: bool) -> Vec<(Mesh, MassProperties)> {
    mesh.split(only_watertight)
        .into_par_iter()
        .map(|body| {
            let mass = *body.mass_properties();
            (body, mass)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn scattered_cubes() -> Mesh {
        let parts: Vec<Mesh> = (1..=4)
            .map(|i| {
                let size = i as f64;
                let mut cube = Primitive::cube(Vector3::new(size, size, size), false).to_mesh();
                cube.apply_translation(&Vector3::new(10.0 * size, 0.0, 0.0));
                cube
            })
            .collect();
        Mesh::concatenate(&parts)
    }

    #[test]
    fn test_split_and_measure() {
        let measured = split_and_measure(&scattered_cubes(), true);
        assert_eq!(measured.len(), 4);

        let mut volumes: Vec<f64> = measured.iter().map(|(_, m)| m.volume).collect();
        volumes.sort_by(f64::total_cmp);
        for (volume, side) in volumes.iter().zip(1..=4) {
            assert_relative_eq!(*volume, (side * side * side) as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let meshes = scattered_cubes().split(false);
        let masses = mass_properties_parallel(&meshes);
        let ids = identifiers_parallel(&meshes);

        for ((mesh, mass), id) in meshes.iter().zip(&masses).zip(&ids) {
            assert_eq!(mass, mesh.mass_properties());
            assert_eq!(id, mesh.identifier());
        }
    }

    #[test]
    fn test_process_parallel() {
        let mut meshes: Vec<Mesh> = (0..3)
            .map(|_| {
                let mut cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
                cube.unmerge_vertices();
                cube
            })
            .collect();

        let reports = process_parallel(&mut meshes, &ProcessOptions::default());
        assert_eq!(reports.len(), 3);
        for (mesh, report) in meshes.iter().zip(&reports) {
            assert_eq!(report.merged_vertices, 28);
            assert_eq!(mesh.vertex_count(), 8);
            assert!(mesh.is_watertight());
        }
    }
}
