// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid-motion invariant mesh identity
//!
//! An [`Identifier`] is built from quantities that do not change under rotation
//! or translation: volume, surface area, principal moments of inertia and the
//! face count. Values are rounded to a fixed number of significant digits so
//! floating-point noise from the transform does not change the result.

pub mod dedup;

pub use dedup::{group_duplicates, merge_duplicates, UniqueMesh};

use crate::geometry::MassProperties;
use crate::utils::math;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Values smaller than this fraction of their reference are flushed to zero
const FLUSH_RATIO: f64 = 1e-9;

/// Rounded invariant signature of a mesh
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Identifier {
    pub volume: f64,
    pub surface_area: f64,
    /// Ascending
    pub principal_inertia: [f64; 3],
    pub face_count: usize,
}

impl Identifier {
    /// Round the invariants of `mass` to `digits` significant digits
    ///
    /// Noise is flushed to zero against a reference of the same dimension: the
    /// volume against the surface area to the power 1.5, each principal moment
    /// against the largest one. The result is the same in any length unit.
    pub fn new(mass: &MassProperties, face_count: usize, digits: u32) -> Self {
        let round = |value: f64, reference: f64| {
            if value.abs() < reference.abs() * FLUSH_RATIO {
                0.0
            } else {
                math::round_significant(value, digits)
            }
        };

        let principal = mass.principal_inertia();
        let largest = principal
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0f64, |acc, v| acc.max(v.abs()));

        Self {
            volume: round(mass.volume, mass.surface_area.abs().powf(1.5)),
            surface_area: round(mass.surface_area, 0.0),
            principal_inertia: principal.map(|v| round(v, largest)),
            face_count,
        }
    }

    fn values(&self) -> [f64; 5] {
        let [i0, i1, i2] = self.principal_inertia;
        [self.volume, self.surface_area, i0, i1, i2]
    }

    /// Equal face counts and every value within `rtol` of the larger magnitude
    pub fn approx_eq(&self, other: &Self, rtol: f64) -> bool {
        self.face_count == other.face_count
            && self
                .values()
                .iter()
                .zip(other.values())
                .all(|(a, b)| (a - b).abs() <= rtol * a.abs().max(b.abs()))
    }

    /// SHA-256 of the rounded values as a hex string
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.face_count as u64).to_le_bytes());
        for value in self.values() {
            hasher.update(value.to_bits().to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.face_count == other.face_count
            && self
                .values()
                .iter()
                .zip(other.values())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.face_count.hash(state);
        for value in self.values() {
            value.to_bits().hash(state);
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [i0, i1, i2] = self.principal_inertia;
        write!(
            f,
            "volume={} area={} inertia=[{}, {}, {}] faces={}",
            self.volume, self.surface_area, i0, i1, i2, self.face_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Matrix4, Rotation3, Vector3};

    fn rigid_motion() -> Matrix4<f64> {
        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.0).to_homogeneous();
        Matrix4::new_translation(&Vector3::new(12.5, -3.0, 7.25)) * rotation
    }

    #[test]
    fn test_identifier_survives_rigid_motion() {
        let original = Primitive::cube(Vector3::new(1.0, 2.0, 3.0), true).to_mesh();
        let mut moved = original.clone();
        moved.transform(&rigid_motion());

        assert_eq!(original.identifier(), moved.identifier());
        assert_eq!(original.identifier().digest(), moved.identifier().digest());
    }

    #[test]
    fn test_identifier_distinguishes_shapes() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let slab = Primitive::cube(Vector3::new(1.0, 1.0, 1.01), false).to_mesh();
        let sphere = Primitive::sphere(1.0, 2).to_mesh();

        assert_ne!(cube.identifier(), slab.identifier());
        assert_ne!(cube.identifier(), sphere.identifier());
        assert_ne!(cube.identifier().digest(), slab.identifier().digest());
        assert!(cube.identifier().approx_eq(slab.identifier(), 0.05));
        assert!(!cube.identifier().approx_eq(slab.identifier(), 1e-4));
    }

    #[test]
    fn test_rounding_and_flush() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let id = mesh.identifier();
        assert_eq!(id.volume, 1.0);
        assert_eq!(id.surface_area, 6.0);
        assert_eq!(id.principal_inertia, [0.166667; 3]);
        assert_eq!(id.face_count, 12);

        let mut flat = *mesh.mass_properties();
        flat.volume = 1e-12;
        let id = Identifier::new(&flat, 12, 6);
        assert_eq!(id.volume.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_identifier_keeps_inertia_at_small_scale() {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        mesh.transform(&Matrix4::new_scaling(1e-4));
        let id = mesh.identifier();

        assert!(mesh.mass_properties().is_reliable);
        assert_eq!(id.volume, 1e-12);
        assert_eq!(id.surface_area, 6e-8);
        // m L^2 / 6 with m = 1e-12 and L = 1e-4
        for moment in id.principal_inertia {
            assert!((moment - 1e-12 * 1e-8 / 6.0).abs() < 1e-25, "{}", moment);
        }
    }

    #[test]
    fn test_digest_is_hex() {
        let digest = Primitive::icosahedron(1.0).to_mesh().identifier().digest();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
