// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object File Format
//!
//! Coordinates are written with shortest round-trip formatting, so OFF files
//! written here load back bit for bit. Polygons are fan-triangulated. Face
//! colours may follow the vertex indices as integers in 0..=255 or floats in
//! 0..=1, with or without alpha.

use super::fan;
use crate::geometry::{Color, Mesh, DEFAULT_COLOR};
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn parse_color(fields: &[&str]) -> Result<Option<Color>> {
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != 3 && fields.len() != 4 {
        bail!("expected 3 or 4 colour components, found {}", fields.len());
    }

    let floats = fields.iter().any(|f| f.contains('.'));
    let mut color: Color = [0, 0, 0, 255];
    for (slot, field) in color.iter_mut().zip(fields) {
        *slot = if floats {
            let value: f64 = field.parse()?;
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            let value: u32 = field.parse()?;
            value.min(255) as u8
        };
    }
    Ok(Some(color))
}

/// Read an OFF or COFF document
pub fn read<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .filter(|line| match line {
            Ok((_, l)) => {
                let l = l.trim();
                !l.is_empty() && !l.starts_with('#')
            }
            Err(_) => true,
        });

    let mut next = |what: &str| -> Result<(usize, String)> {
        lines
            .next()
            .ok_or_else(|| anyhow!("unexpected end of file, expected {}", what))?
            .context("Failed to read OFF data")
    };

    let (_, header) = next("header")?;
    if !header.trim().ends_with("OFF") {
        bail!("missing OFF header");
    }

    let (_, counts_line) = next("element counts")?;
    let counts: Vec<usize> = counts_line
        .split_whitespace()
        .take(2)
        .map(|c| c.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .context("invalid OFF element counts")?;
    let [vertex_count, face_count] = counts[..] else {
        bail!("OFF element counts need vertex and face totals");
    };

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let (line_no, line) = next("vertex")?;
        let coords: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(|c| c.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("line {}: invalid vertex", line_no))?;
        let [x, y, z] = coords[..] else {
            bail!("line {}: vertex needs three coordinates", line_no);
        };
        vertices.push(Point3::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(face_count);
    let mut colors: Vec<Color> = Vec::with_capacity(face_count);
    let mut any_color = false;
    for _ in 0..face_count {
        let (line_no, line) = next("face")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (&count, rest) = fields
            .split_first()
            .ok_or_else(|| anyhow!("line {}: empty face", line_no))?;
        let count: usize = count
            .parse()
            .with_context(|| format!("line {}: invalid corner count", line_no))?;
        if rest.len() < count {
            bail!("line {}: face lists fewer than {} corners", line_no, count);
        }

        let polygon: Vec<usize> = rest[..count]
            .iter()
            .map(|i| i.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("line {}: invalid vertex index", line_no))?;
        let color = parse_color(&rest[count..])
            .with_context(|| format!("line {}: invalid face colour", line_no))?;
        any_color |= color.is_some();

        for tri in fan(&polygon) {
            faces.push(tri);
            colors.push(color.unwrap_or(DEFAULT_COLOR));
        }
    }

    let mut mesh = Mesh::new(vertices, faces)?;
    if any_color {
        mesh.set_face_colors(colors)?;
    }
    Ok(mesh)
}

/// Write an OFF document, with RGBA face colours when the mesh has them
pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.vertex_count(), mesh.face_count())?;
    for p in mesh.vertices() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    let colors = mesh.face_colors();
    for (i, [a, b, c]) in mesh.faces().iter().enumerate() {
        match colors.map(|colors| colors[i]) {
            Some([r, g, bl, al]) => writeln!(writer, "3 {} {} {} {} {} {} {}", a, b, c, r, g, bl, al)?,
            None => writeln!(writer, "3 {} {} {}", a, b, c)?,
        }
    }
    Ok(())
}

pub fn load(path: &Path) -> Result<Mesh> {
    let file = File::open(path).context("Failed to open OFF file")?;
    read(BufReader::new(file))
}

pub fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).context("Failed to create OFF file")?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Matrix4, Vector3};

    #[test]
    fn test_off_roundtrip_is_exact() -> Result<()> {
        let mut mesh = Primitive::sphere(1.0, 2).to_mesh();
        mesh.transform(&Matrix4::new_rotation(Vector3::new(0.1, 0.2, 0.3)));

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer)?;
        let loaded = read(buffer.as_slice())?;

        assert_eq!(loaded.vertices(), mesh.vertices());
        assert_eq!(loaded.faces(), mesh.faces());
        assert!(loaded.face_colors().is_none());
        Ok(())
    }

    #[test]
    fn test_off_colors_roundtrip() -> Result<()> {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let colors: Vec<Color> = (0..12).map(|i| [i * 20, 0, 255 - i * 20, 200]).collect();
        mesh.set_face_colors(colors.clone())?;

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer)?;
        let loaded = read(buffer.as_slice())?;
        assert_eq!(loaded.face_colors(), Some(colors.as_slice()));
        Ok(())
    }

    #[test]
    fn test_off_polygons_and_comments() -> Result<()> {
        let text = "\
OFF
# unit square and a lone triangle
5 2 0
0 0 0
1 0 0
1 1 0
0 1 0
2 2 2
4 0 1 2 3 1.0 0.0 0.0
3 1 4 2
";
        let mesh = read(text.as_bytes())?;
        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3], [1, 4, 2]]);
        assert_eq!(mesh.face_color(0), [255, 0, 0, 255]);
        assert_eq!(mesh.face_color(1), [255, 0, 0, 255]);
        assert_eq!(mesh.face_color(2), DEFAULT_COLOR);
        Ok(())
    }

    #[test]
    fn test_off_errors() {
        assert!(read("PLY\n".as_bytes()).is_err());
        assert!(read("OFF\n3 1 0\n0 0 0\n1 0 0\n".as_bytes()).is_err());
        // Out-of-range index is rejected by the mesh store
        assert!(read("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n".as_bytes()).is_err());
    }
}
