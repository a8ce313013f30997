// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ, geometry only
//!
//! Reads `v` and `f` statements and ignores everything else. Face corners may
//! be written as `v`, `v/vt`, `v//vn` or `v/vt/vn`; negative indices count
//! back from the latest vertex.

use super::fan;
use crate::geometry::Mesh;
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn parse_corner(token: &str, vertex_count: usize) -> Result<usize> {
    let position = token.split('/').next().unwrap_or(token);
    let index: i64 = position
        .parse()
        .with_context(|| format!("invalid face corner '{}'", token))?;

    let resolved = match index {
        0 => bail!("face corner index 0 is not valid in OBJ"),
        i if i > 0 => i - 1,
        i => vertex_count as i64 + i,
    };
    usize::try_from(resolved).map_err(|_| anyhow!("face corner '{}' is out of range", token))
}

pub fn read<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read OBJ data")?;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let coords: Vec<f64> = tokens
                    .take(3)
                    .map(|c| c.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .with_context(|| format!("line {}: invalid vertex", line_no + 1))?;
                let [x, y, z] = coords[..] else {
                    bail!("line {}: vertex needs three coordinates", line_no + 1);
                };
                vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let polygon: Vec<usize> = tokens
                    .map(|token| parse_corner(token, vertices.len()))
                    .collect::<Result<_>>()
                    .with_context(|| format!("line {}: invalid face", line_no + 1))?;
                if polygon.len() < 3 {
                    bail!("line {}: face needs at least three corners", line_no + 1);
                }
                faces.extend(fan(&polygon));
            }
            _ => {}
        }
    }

    Ok(Mesh::new(vertices, faces)?)
}

pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "# meshcore")?;
    for p in mesh.vertices() {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.faces() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

pub fn load(path: &Path) -> Result<Mesh> {
    let file = File::open(path).context("Failed to open OBJ file")?;
    read(BufReader::new(file))
}

pub fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).context("Failed to create OBJ file")?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}
