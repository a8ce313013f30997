// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end scenarios on small reference meshes

use approx::assert_relative_eq;
use meshcore::geometry::Primitive;
use meshcore::{Mesh, MeshError, ProcessOptions};
use nalgebra::{Matrix4, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CUBE_VERTICES: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Outward-wound unit cube written out by hand
const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [0, 1, 5],
    [0, 5, 4],
    [1, 2, 6],
    [1, 6, 5],
    [2, 3, 7],
    [2, 7, 6],
    [3, 0, 4],
    [3, 4, 7],
];

fn unit_cube() -> Mesh {
    Mesh::from_arrays(&CUBE_VERTICES, &CUBE_FACES).unwrap()
}

#[test]
fn test_unit_cube_reference_values() {
    let cube = unit_cube();

    assert!(cube.is_watertight());
    assert!(cube.is_winding_consistent());
    assert_relative_eq!(cube.volume(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(cube.center_mass(), Point3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
    assert_relative_eq!(cube.area(), 6.0, epsilon = 1e-12);
    assert_eq!(cube.euler_number(), 2);

    let facets = cube.facets_with_area();
    assert_eq!(facets.len(), 6);
    for facet in &facets {
        assert_eq!(facet.faces.len(), 2);
        assert_relative_eq!(facet.area, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_triangular_hole_is_filled() {
    let mut mesh = Mesh::from_arrays(&CUBE_VERTICES, &CUBE_FACES[..11]).unwrap();
    assert_eq!(mesh.face_count(), 11);
    assert!(!mesh.is_watertight());
    assert!(!mesh.mass_properties().is_reliable);

    let report = mesh.fill_holes();
    assert_eq!(report.filled, 1);
    assert_eq!(mesh.face_count(), 12);
    assert!(mesh.is_watertight());
    assert!(mesh.is_winding_consistent());
    assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_out_of_range_index_fails_construction() {
    let mut faces = CUBE_FACES.to_vec();
    faces[7] = [1, 6, 8];
    match Mesh::from_arrays(&CUBE_VERTICES, &faces) {
        Err(MeshError::InvalidTopology {
            face,
            index,
            vertex_count,
        }) => {
            assert_eq!((face, index, vertex_count), (7, 8, 8));
        }
        other => panic!("expected InvalidTopology, got {:?}", other.map(|m| m.face_count())),
    }
}

#[test]
fn test_triangle_soup_repaired_on_load() {
    // Unwelded, shuffled, with a flipped face and a sliver
    let cube = unit_cube();
    let mut rng = StdRng::seed_from_u64(42);
    let mut triangles: Vec<[Point3<f64>; 3]> = cube.triangles().collect();
    for i in (1..triangles.len()).rev() {
        triangles.swap(i, rng.gen_range(0..=i));
    }
    triangles[3].swap(1, 2);
    let p = Point3::new(0.0, 0.0, 0.0);
    triangles.push([p, p, Point3::new(1.0, 0.0, 0.0)]);

    let vertices: Vec<Point3<f64>> = triangles.iter().flatten().copied().collect();
    let faces = (0..triangles.len()).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
    let mut mesh = Mesh::new(vertices, faces).unwrap();
    assert_eq!(mesh.body_count(), 13);

    let report = mesh.process(&ProcessOptions::full_repair());
    assert_eq!(report.merged_vertices, 39 - 8);
    assert_eq!(report.degenerate_faces, 1);
    assert_eq!(report.normals.map(|n| n.flipped_faces), Some(1));

    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 12);
    assert!(mesh.is_watertight());
    assert!(mesh.is_winding_consistent());
    assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_micrometre_part_repaired_on_load() {
    let mut mesh = unit_cube();
    mesh.transform(&Matrix4::new_scaling(1e-6));
    mesh.unmerge_vertices();

    let report = mesh.process(&ProcessOptions::full_repair());
    assert_eq!(report.degenerate_faces, 0);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 12);
    assert!(mesh.is_watertight());

    let props = mesh.mass_properties();
    assert!(props.is_reliable);
    assert_relative_eq!(props.volume, 1e-18, max_relative = 1e-9);
    assert!(mesh.principal_inertia().iter().all(|&m| m > 0.0));
}

#[test]
fn test_open_sheet_is_left_open_by_repair() {
    let mut mesh = Mesh::from_arrays(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        &[[0, 1, 2], [0, 2, 3]],
    )
    .unwrap();

    let report = mesh.process(&ProcessOptions::full_repair());
    let holes = report.holes.unwrap();
    assert_eq!(holes.filled, 0);
    assert_eq!(holes.unresolved.len(), 1);
    assert_eq!(mesh.face_count(), 2);
    assert!(!mesh.is_watertight());
    assert_relative_eq!(mesh.area(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_split_partitions_faces() {
    let parts: Vec<Mesh> = (0..3)
        .map(|i| {
            let mut part = Primitive::sphere(0.5, 1).to_mesh();
            part.apply_translation(&Vector3::new(2.0 * i as f64, 0.0, 0.0));
            part
        })
        .collect();
    let combined = Mesh::concatenate(&parts);

    let components = combined.split_faces();
    assert_eq!(components.len(), 3);
    let mut seen: Vec<usize> = components.iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..combined.face_count()).collect::<Vec<_>>());

    let bodies = combined.split(true);
    assert_eq!(bodies.len(), 3);
    for body in &bodies {
        assert_eq!(body.face_count(), 80);
        assert!(body.is_watertight());
    }
}

#[test]
fn test_non_manifold_edge_is_reported() {
    // Three triangles fanning off one edge
    let vertices = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.5, 1.0, 0.0],
        [0.5, -1.0, 0.0],
        [0.5, 0.0, 1.0],
    ];
    let mesh = Mesh::from_arrays(&vertices, &[[0, 1, 2], [1, 0, 3], [0, 1, 4]]).unwrap();

    let report = mesh.edge_report();
    assert_eq!(report.non_manifold, 1);
    assert_eq!(report.boundary, 6);
    assert_eq!(report.interior, 0);
    assert!(!mesh.is_watertight());
    assert!(mesh.face_adjacency().is_empty());
    assert_eq!(mesh.body_count(), 3);
    assert!(matches!(
        mesh.mass_properties_strict(),
        Err(MeshError::NotWatertight {
            boundary_edges: 6,
            non_manifold_edges: 1
        })
    ));
}

#[test]
fn test_monte_carlo_volume_agrees() {
    let sphere = Primitive::sphere(1.0, 3).to_mesh();
    let mut rng = StdRng::seed_from_u64(2024);

    let samples: Vec<Point3<f64>> = (0..4000)
        .map(|_| {
            Point3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        })
        .collect();
    let inside = sphere
        .ray()
        .contains_points(&samples)
        .into_iter()
        .filter(|&hit| hit)
        .count();
    let estimate = 8.0 * inside as f64 / samples.len() as f64;

    let volume = sphere.volume();
    assert!(volume > 0.0);
    assert!(
        (estimate - volume).abs() < volume * 0.05,
        "Monte-Carlo estimate {} differs from volume {}",
        estimate,
        volume
    );
}
