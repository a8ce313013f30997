// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Signed volume in cubic units
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position [x, y, z]
    pub centroid: [f64; 3],
    /// Center of mass [x, y, z]
    pub center_mass: [f64; 3],
    /// Principal moments of inertia, ascending
    pub principal_inertia: [f64; 3],
    pub vertex_count: usize,
    pub face_count: usize,
    pub edge_count: usize,
    pub boundary_edges: usize,
    pub non_manifold_edges: usize,
    pub body_count: usize,
    pub euler_number: i64,
    pub is_watertight: bool,
    pub is_winding_consistent: bool,
    /// Mass properties can be trusted
    pub is_reliable: bool,
}

impl GeometryStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            center_mass: [0.0; 3],
            principal_inertia: [0.0; 3],
            vertex_count: 0,
            face_count: 0,
            edge_count: 0,
            boundary_edges: 0,
            non_manifold_edges: 0,
            body_count: 0,
            euler_number: 0,
            is_watertight: false,
            is_winding_consistent: true,
            is_reliable: false,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              GEOMETRY ANALYTICS                          ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>14.6}                          ║", self.volume);
        println!("║ Surface Area:    {:>14.6}                          ║", self.surface_area);
        println!(
            "║ Center of Mass:  ({:>9.4}, {:>9.4}, {:>9.4})         ║",
            self.center_mass[0], self.center_mass[1], self.center_mass[2]
        );
        println!(
            "║ Principal I:     ({:>9.4}, {:>9.4}, {:>9.4})         ║",
            self.principal_inertia[0], self.principal_inertia[1], self.principal_inertia[2]
        );
        println!("║                                                          ║");
        println!("║ Bounding Box:                                            ║");
        println!(
            "║   Min: ({:>9.4}, {:>9.4}, {:>9.4})                    ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>9.4}, {:>9.4}, {:>9.4})                    ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!("║ Edges:           {:>10}                              ║", self.edge_count);
        println!("║ Boundary Edges:  {:>10}                              ║", self.boundary_edges);
        println!("║ Non-manifold:    {:>10}                              ║", self.non_manifold_edges);
        println!("║ Bodies:          {:>10}                              ║", self.body_count);
        println!("║ Euler Number:    {:>10}                              ║", self.euler_number);
        println!(
            "║ Watertight:      {:>10}                              ║",
            yes_no(self.is_watertight)
        );
        println!(
            "║ Consistent:      {:>10}                              ║",
            yes_no(self.is_winding_consistent)
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertex_count() == 0 || mesh.face_count() == 0 {
        return GeometryStats {
            vertex_count: mesh.vertex_count(),
            ..GeometryStats::empty()
        };
    }

    let bounds = mesh.bounds();
    let centroid = mesh.centroid();
    let mass = mesh.mass_properties();
    let (boundary_edges, non_manifold_edges) = mesh.edge_index().defect_counts();

    GeometryStats {
        volume: mass.volume,
        surface_area: mass.surface_area,
        bbox: [
            bounds.min.x,
            bounds.min.y,
            bounds.min.z,
            bounds.max.x,
            bounds.max.y,
            bounds.max.z,
        ],
        centroid: [centroid.x, centroid.y, centroid.z],
        center_mass: [mass.center_mass.x, mass.center_mass.y, mass.center_mass.z],
        principal_inertia: mass.principal_inertia(),
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: mesh.edge_index().len(),
        boundary_edges,
        non_manifold_edges,
        body_count: mesh.body_count(),
        euler_number: mesh.euler_number(),
        is_watertight: mesh.is_watertight(),
        is_winding_consistent: mesh.is_winding_consistent(),
        is_reliable: mass.is_reliable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_analyze_cube() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-9);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.face_count, 12);
        assert_eq!(stats.edge_count, 18);
        assert_eq!(stats.euler_number, 2);
        assert_eq!(stats.body_count, 1);
        assert!(stats.is_watertight && stats.is_reliable);

        for axis in 0..3 {
            assert!(stats.center_mass[axis].abs() < 1e-9);
            assert_relative_eq!(stats.bbox[axis], -5.0);
        }
    }

    #[test]
    fn test_analyze_sphere() {
        let mesh = Primitive::sphere(5.0, 3).to_mesh();
        let stats = analyze(&mesh);

        let expected_volume = 4.0 / 3.0 * std::f64::consts::PI * 5.0_f64.powi(3);
        let expected_area = 4.0 * std::f64::consts::PI * 5.0_f64.powi(2);

        assert!(
            (stats.volume - expected_volume).abs() < expected_volume * 0.02,
            "Volume {} not close to expected {}",
            stats.volume,
            expected_volume
        );
        assert!(
            (stats.surface_area - expected_area).abs() < expected_area * 0.02,
            "Surface area {} not close to expected {}",
            stats.surface_area,
            expected_area
        );
        assert_eq!(stats.face_count, 1280);
    }

    #[test]
    fn test_open_mesh_detection() {
        let mut mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        mesh.unmerge_vertices();
        let stats = analyze(&mesh);

        // Unwelded triangle soup has no shared edges
        assert_eq!(stats.vertex_count, 36);
        assert_eq!(stats.boundary_edges, 36);
        assert_eq!(stats.body_count, 12);
        assert!(!stats.is_watertight);
        assert!(!stats.is_reliable);
    }
}
