// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL through `stl_io`
//!
//! STL stores single-precision coordinates, so a save and load round trip is
//! only exact for values representable as `f32`.

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Read binary or ASCII STL
///
/// Exactly equal corners are shared by `stl_io`; near-equal ones are not.
pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Failed to parse STL data")?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let faces = stl.faces.iter().map(|tri| tri.vertices).collect();

    Ok(Mesh::new(vertices, faces)?)
}

/// Write binary STL
pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles()
        .zip(mesh.face_normals())
        .map(|(corners, normal)| StlTriangle {
            normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
            vertices: corners.map(|p| StlVertex::new([p.x as f32, p.y as f32, p.z as f32])),
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter()).context("Failed to write STL data")?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Mesh> {
    let mut file = File::open(path).context("Failed to open STL file")?;
    read(&mut file)
}

pub fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).context("Failed to create STL file")?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;
    use std::io::Cursor;

    #[test]
    fn test_stl_roundtrip_cube() -> Result<()> {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();

        let mut buffer = Cursor::new(Vec::new());
        write(&mesh, &mut buffer)?;
        // 80 byte header, count, 50 bytes per triangle
        assert_eq!(buffer.get_ref().len(), 84 + 50 * 12);

        buffer.set_position(0);
        let loaded = read(&mut buffer)?;
        assert_eq!(loaded.vertex_count(), 8);
        assert_eq!(loaded.face_count(), 12);
        assert!(loaded.is_watertight());
        assert!((loaded.volume() - 1000.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_stl_rejects_garbage() {
        let mut buffer = Cursor::new(b"solid nope\nfacet oops".to_vec());
        assert!(read(&mut buffer).is_err());
    }
}
