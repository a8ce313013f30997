// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Round-trip export/import tests

use anyhow::Result;
use meshcore::geometry::Primitive;
use meshcore::io;
use meshcore::{Mesh, ProcessOptions};
use nalgebra::{Matrix4, Rotation3, Vector3};
use tempfile::NamedTempFile;

fn repaired_sphere() -> Mesh {
    let mut mesh = Primitive::sphere(2.5, 2).to_mesh();
    mesh.transform(
        &(Matrix4::new_translation(&Vector3::new(0.1, -7.3, 12.0))
            * Rotation3::from_euler_angles(0.3, -1.1, 2.0).to_homogeneous()),
    );
    mesh.unmerge_vertices();
    mesh.process(&ProcessOptions::full_repair());
    mesh
}

#[test]
fn test_roundtrip_lossless_formats() -> Result<()> {
    let original = repaired_sphere();

    for suffix in [".off", ".obj"] {
        let file = NamedTempFile::with_suffix(suffix)?;
        io::export(&original, file.path())?;
        let reloaded = io::load(file.path())?;

        assert_eq!(reloaded.vertices(), original.vertices(), "{} vertices", suffix);
        assert_eq!(reloaded.faces(), original.faces(), "{} faces", suffix);
        assert_eq!(reloaded.identifier(), original.identifier());
    }

    Ok(())
}

#[test]
fn test_roundtrip_stl_export() -> Result<()> {
    let original = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();

    let file = NamedTempFile::with_suffix(".stl")?;
    io::export(&original, file.path())?;

    let metadata = std::fs::metadata(file.path())?;
    assert_eq!(metadata.len(), 84 + 50 * 12);

    let mut reloaded = io::load(file.path())?;
    assert_eq!(reloaded.face_count(), 12);

    // Unmerged or not on read, welding restores the shared corners
    reloaded.process(&ProcessOptions::default());
    assert_eq!(reloaded.vertex_count(), 8);
    assert!(reloaded.is_watertight());
    assert!(reloaded.is_winding_consistent());
    assert!((reloaded.volume() - 1000.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_stl_is_single_precision() -> Result<()> {
    let mut original = Primitive::icosahedron(1.0).to_mesh();
    original.apply_translation(&Vector3::new(0.1, 0.2, 0.3));

    let file = NamedTempFile::with_suffix(".stl")?;
    io::export(&original, file.path())?;
    let mut reloaded = io::load(file.path())?;
    reloaded.process(&ProcessOptions::default());

    assert_eq!(reloaded.face_count(), original.face_count());
    for (a, b) in reloaded.bounds().min.iter().zip(original.bounds().min.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
    assert!((reloaded.volume() - original.volume()).abs() < 1e-5);

    Ok(())
}

#[test]
fn test_face_colors_survive_off() -> Result<()> {
    let mut original = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    let colors = (0..original.face_count())
        .map(|i| [(i * 20) as u8, 255 - (i * 20) as u8, 7, 255])
        .collect();
    original.set_face_colors(colors)?;

    let file = NamedTempFile::with_suffix(".off")?;
    io::export(&original, file.path())?;
    let reloaded = io::load(file.path())?;

    assert_eq!(reloaded.face_colors(), original.face_colors());
    Ok(())
}

#[test]
fn test_unknown_extension_is_rejected() -> Result<()> {
    let mesh = Primitive::icosahedron(1.0).to_mesh();
    let file = NamedTempFile::with_suffix(".step")?;
    assert!(io::export(&mesh, file.path()).is_err());
    assert!(io::load(file.path()).is_err());
    Ok(())
}
