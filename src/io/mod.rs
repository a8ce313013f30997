// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - loading and exporting mesh files
//!
//! Loaders hand raw arrays to [`Mesh::new`], which validates indices. No
//! cleanup happens here; run [`Mesh::process`] afterwards if needed.

pub mod obj;
pub mod off;
pub mod stl;

use crate::geometry::Mesh;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::debug;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Binary STL, single precision
    Stl,
    /// Wavefront OBJ
    Obj,
    /// Object File Format, with optional face colours
    Off,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "obj" => Some(Format::Obj),
            "off" => Some(Format::Off),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Whether a save and load reproduces the arrays exactly
    pub fn is_lossless(&self) -> bool {
        !matches!(self, Format::Stl)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| {
        anyhow!(
            "Unsupported mesh format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
        )
    })
}

/// Load a mesh, choosing the format from the file extension
pub fn load(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let mesh = match detect(path)? {
        Format::Stl => stl::load(path),
        Format::Obj => obj::load(path),
        Format::Off => off::load(path),
    }
    .with_context(|| format!("Failed to load mesh: {}", path.display()))?;

    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Write a mesh, choosing the format from the file extension
pub fn export(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let written = match detect(path)? {
        Format::Stl => stl::save(mesh, path),
        Format::Obj => obj::save(mesh, path),
        Format::Off => off::save(mesh, path),
    };
    written.with_context(|| format!("Failed to export mesh: {}", path.display()))?;

    debug!(path = %path.display(), faces = mesh.face_count(), "exported mesh");
    Ok(())
}

/// Split a polygon into a triangle fan around its first corner
pub(crate) fn fan(polygon: &[usize]) -> impl Iterator<Item = [usize; 3]> + '_ {
    polygon
        .windows(2)
        .skip(1)
        .map(move |pair| [polygon[0], pair[0], pair[1]])
}
