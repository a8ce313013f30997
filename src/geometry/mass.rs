// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Volume, center of mass and inertia by divergence-theorem tetrahedra
//!
//! Every face forms a tetrahedron with a fixed reference point. Signed volume
//! and the first and second moments of each tetrahedron have closed forms;
//! their sums give the moments of the enclosed solid when the surface is
//! closed and consistently wound.

use crate::geometry::Face;
use crate::topology::is_degenerate;
use crate::utils::math;
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use serde::{Deserialize, Serialize};

/// Mass properties of a triangle mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    /// Signed volume; negative for inward winding
    pub volume: f64,
    pub mass: f64,
    pub density: f64,
    pub surface_area: f64,
    pub center_mass: Point3<f64>,
    /// Inertia tensor about the center of mass, in mesh axes
    pub inertia: Matrix3<f64>,
    /// Closed, consistently wound surface with non-zero volume
    pub is_reliable: bool,
}

impl MassProperties {
    /// Eigenvalues of the inertia tensor, ascending
    pub fn principal_inertia(&self) -> [f64; 3] {
        let eigen = SymmetricEigen::new(self.inertia);
        let mut values = [
            eigen.eigenvalues[0],
            eigen.eigenvalues[1],
            eigen.eigenvalues[2],
        ];
        values.sort_by(f64::total_cmp);
        values
    }
}

/// Raw volume integrals about a reference point
#[derive(Debug, Default)]
struct Moments {
    volume: f64,
    /// Integral of position
    first: Vector3<f64>,
    /// Integrals of x², y², z²
    squares: Vector3<f64>,
    /// Integrals of xy, yz, zx
    products: Vector3<f64>,
}

impl Moments {
    fn add_tetrahedron(&mut self, a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) {
        let det = a.dot(&b.cross(c));
        self.volume += det / 6.0;
        self.first += (a + b + c) * (det / 24.0);

        let f60 = det / 60.0;
        let f120 = det / 120.0;
        for i in 0..3 {
            self.squares[i] += f60
                * (a[i] * a[i]
                    + b[i] * b[i]
                    + c[i] * c[i]
                    + a[i] * b[i]
                    + a[i] * c[i]
                    + b[i] * c[i]);

            let j = (i + 1) % 3;
            self.products[i] += f120
                * (2.0 * (a[i] * a[j] + b[i] * b[j] + c[i] * c[j])
                    + a[i] * b[j]
                    + a[j] * b[i]
                    + a[i] * c[j]
                    + a[j] * c[i]
                    + b[i] * c[j]
                    + b[j] * c[i]);
        }
    }

    /// Inertia tensor about the reference point
    #[rustfmt::skip]
    fn inertia(&self) -> Matrix3<f64> {
        let [xx, yy, zz] = [self.squares.x, self.squares.y, self.squares.z];
        let [xy, yz, zx] = [self.products.x, self.products.y, self.products.z];
        Matrix3::new(
            yy + zz, -xy, -zx,
            -xy, xx + zz, -yz,
            -zx, -yz, xx + yy,
        )
    }
}

/// Compute mass properties of the given faces
///
/// Faces that repeat a vertex are skipped. `zero` is already scaled to the
/// mesh. When the enclosed volume is not above it, the center of mass falls
/// back to the area-weighted surface centroid with zero inertia, and the
/// result is never reliable.
pub fn compute(
    vertices: &[Point3<f64>],
    faces: &[Face],
    areas: &[f64],
    density: f64,
    reliable: bool,
    zero: f64,
) -> MassProperties {
    // Integrate about the bounding box center to limit cancellation far from the origin
    let reference = super::BoundingBox::from_points(faces.iter().flatten().map(|&i| &vertices[i]));
    let reference = if reference.is_empty() {
        Point3::origin()
    } else {
        reference.center()
    };

    let mut moments = Moments::default();
    for face in faces.iter().filter(|f| !is_degenerate(f)) {
        let [a, b, c] = face.map(|i| vertices[i] - reference);
        moments.add_tetrahedron(&a, &b, &c);
    }

    let surface_area: f64 = areas.iter().sum();

    if moments.volume.abs() <= zero {
        return MassProperties {
            volume: moments.volume,
            mass: density * moments.volume,
            density,
            surface_area,
            center_mass: surface_centroid(vertices, faces, areas, surface_area),
            inertia: Matrix3::zeros(),
            is_reliable: false,
        };
    }

    let mass = density * moments.volume;
    let offset = moments.first / moments.volume;
    // Parallel axis shift from the reference point to the center of mass
    let shift = Matrix3::identity() * offset.norm_squared() - offset * offset.transpose();
    let inertia = moments.inertia() * density - shift * mass;

    MassProperties {
        volume: moments.volume,
        mass,
        density,
        surface_area,
        center_mass: reference + offset,
        inertia,
        is_reliable: reliable,
    }
}

fn surface_centroid(
    vertices: &[Point3<f64>],
    faces: &[Face],
    areas: &[f64],
    total_area: f64,
) -> Point3<f64> {
    if total_area > 0.0 {
        let weighted: Vector3<f64> = faces
            .iter()
            .zip(areas)
            .map(|(face, &area)| {
                let [a, b, c] = face.map(|i| &vertices[i]);
                math::triangle_centroid(a, b, c).coords * area
            })
            .sum();
        return Point3::from(weighted / total_area);
    }

    let used: Vec<&Point3<f64>> = faces.iter().flatten().map(|&i| &vertices[i]).collect();
    if used.is_empty() {
        return Point3::origin();
    }
    let sum: Vector3<f64> = used.iter().map(|p| p.coords).sum();
    Point3::from(sum / used.len() as f64)
}
