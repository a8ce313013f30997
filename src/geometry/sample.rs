// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Area-weighted surface sampling

use super::Mesh;
use nalgebra::Point3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A point on the surface and the face it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub point: Point3<f64>,
    pub face: usize,
}

/// Draw `count` points uniformly over the surface area
///
/// Returns nothing when the mesh has no area.
pub fn sample_surface<R: Rng + ?Sized>(mesh: &Mesh, count: usize, rng: &mut R) -> Vec<SurfaceSample> {
    let Ok(faces) = WeightedIndex::new(mesh.face_areas()) else {
        return Vec::new();
    };

    (0..count)
        .map(|_| {
            let face = faces.sample(rng);
            let [a, b, c] = mesh.faces()[face].map(|i| mesh.vertices()[i]);

            // Fold the unit square onto the triangle
            let (mut u, mut v): (f64, f64) = (rng.gen(), rng.gen());
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }
            SurfaceSample {
                point: a + (b - a) * u + (c - a) * v,
                face,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_lie_on_faces() {
        let mesh = Primitive::cube(Vector3::new(2.0, 1.0, 1.0), false).to_mesh();
        let mut rng = StdRng::seed_from_u64(11);
        let samples = mesh.sample_surface(500, &mut rng);
        assert_eq!(samples.len(), 500);

        for sample in &samples {
            let face = mesh.faces()[sample.face];
            let normal = mesh.face_normals()[sample.face];
            let offset = (sample.point - mesh.vertices()[face[0]]).dot(&normal);
            assert!(offset.abs() < 1e-12);
        }

        // The four 2 x 1 sides carry 8 of the 10 area units
        let on_long_sides = samples
            .iter()
            .filter(|s| mesh.face_normals()[s.face].x == 0.0)
            .count();
        assert!(on_long_sides > 320 && on_long_sides < 480);
    }

    #[test]
    fn test_zero_area_mesh_yields_nothing() {
        let mesh = crate::geometry::Mesh::empty();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(mesh.sample_surface(10, &mut rng).is_empty());
    }
}
