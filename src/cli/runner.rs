// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Command execution for the `meshcore` binary

use crate::config::{MeshConfig, ProcessOptions};
use crate::geometry::{analyze, GeometryStats, Mesh, ProcessReport};
use crate::identity::{group_duplicates, Identifier};
use crate::io::{self, Format};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use walkdir::WalkDir;

/// A mesh read from disk with timing
pub struct LoadResult {
    pub mesh: Mesh,
    pub duration: Duration,
}

/// Files grouped by identifier
pub struct DedupResult {
    /// Groups in first-seen order, members in path order
    pub groups: Vec<Vec<PathBuf>>,
    /// Files that failed to load, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl DedupResult {
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }
}

/// Runner for executing mesh commands
pub struct Runner {
    config: MeshConfig,
    show_progress: bool,
}

impl Runner {
    pub fn new(config: MeshConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Load a mesh with the configured tolerances, without cleanup
    pub fn load(&self, path: &Path) -> Result<LoadResult> {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }

        let start = Instant::now();
        let mesh = io::load(path)?.with_tolerances(self.config.tolerances);
        Ok(LoadResult {
            mesh,
            duration: start.elapsed(),
        })
    }

    /// Load and run the configured cleanup pipeline
    pub fn load_processed(&self, path: &Path) -> Result<(Mesh, ProcessReport)> {
        let mut mesh = self.load(path)?.mesh;
        let report = mesh.process(&self.config.process);
        Ok((mesh, report))
    }

    pub fn info(&self, path: &Path) -> Result<(GeometryStats, Duration)> {
        let start = Instant::now();
        let (mesh, _) = self.load_processed(path)?;
        let stats = analyze(&mesh);
        Ok((stats, start.elapsed()))
    }

    /// Clean up a mesh and write the result
    pub fn repair(
        &self,
        input: &Path,
        output: &Path,
        fix_normals: bool,
        fill_holes: bool,
    ) -> Result<ProcessReport> {
        let mut mesh = self.load(input)?.mesh;
        let options = ProcessOptions {
            fix_normals: fix_normals || self.config.process.fix_normals,
            fill_holes: fill_holes || self.config.process.fill_holes,
            ..self.config.process
        };
        let report = mesh.process(&options);
        io::export(&mesh, output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            faces = mesh.face_count(),
            "repaired mesh"
        );
        Ok(report)
    }

    /// Write each connected body to `<out_dir>/<stem>_<n>.<ext>`
    pub fn split(&self, input: &Path, out_dir: &Path, all: bool) -> Result<Vec<PathBuf>> {
        let (mesh, _) = self.load_processed(input)?;
        let bodies = mesh.split(!all);

        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("body");
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("off");

        let mut written = Vec::with_capacity(bodies.len());
        for (i, body) in bodies.iter().enumerate() {
            let path = out_dir.join(format!("{}_{}.{}", stem, i, ext));
            io::export(body, &path)?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn hull(&self, input: &Path, output: &Path) -> Result<Mesh> {
        let mesh = self.load(input)?.mesh;
        let hull = mesh.convex_hull().context("Failed to compute convex hull")?;
        io::export(&hull, output)?;
        Ok(hull)
    }

    pub fn identify(&self, input: &Path) -> Result<Identifier> {
        let (mesh, _) = self.load_processed(input)?;
        Ok(*mesh.identifier())
    }

    /// Mesh files under `dir`, sorted by path
    pub fn discover(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Format::from_path(path).is_some())
            .collect();
        files.sort();
        files
    }

    /// Load every mesh under `dir` in parallel and group equal identifiers
    pub fn dedup(&self, dir: &Path) -> Result<DedupResult> {
        if !dir.is_dir() {
            bail!("Not a directory: {}", dir.display());
        }
        let files = Self::discover(dir);

        let progress = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let loaded: Vec<(PathBuf, Result<Mesh>)> = files
            .into_par_iter()
            .map(|path| {
                let mesh = self.load_processed(&path).map(|(mesh, _)| mesh);
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                (path, mesh)
            })
            .collect();
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let mut paths = Vec::new();
        let mut meshes = Vec::new();
        let mut failures = Vec::new();
        for (path, mesh) in loaded {
            match mesh {
                Ok(mesh) => {
                    paths.push(path);
                    meshes.push(mesh);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable mesh");
                    failures.push((path, format!("{:#}", e)));
                }
            }
        }

        let groups = group_duplicates(&meshes)
            .into_iter()
            .map(|group| group.into_iter().map(|i| paths[i].clone()).collect())
            .collect();
        Ok(DedupResult { groups, failures })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(MeshConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Matrix4, Vector3};
    use tempfile::tempdir;

    #[test]
    fn test_repair_writes_clean_mesh() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("soup.off");
        let output = dir.path().join("clean.obj");

        let mut soup = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        soup.unmerge_vertices();
        io::export(&soup, &input)?;

        let report = Runner::default().repair(&input, &output, true, true)?;
        assert_eq!(report.merged_vertices, 28);

        let repaired = io::load(&output)?;
        assert_eq!(repaired.vertex_count(), 8);
        assert!(repaired.is_watertight());
        Ok(())
    }

    #[test]
    fn test_split_writes_bodies() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("pair.off");
        let mut left = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let mut right = left.clone();
        right.apply_translation(&Vector3::new(5.0, 0.0, 0.0));
        left.append(&right);
        io::export(&left, &input)?;

        let written = Runner::default().split(&input, &dir.path().join("bodies"), false)?;
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("pair_0.off"));
        for path in &written {
            assert_eq!(io::load(path)?.face_count(), 12);
        }
        Ok(())
    }

    #[test]
    fn test_dedup_directory() -> Result<()> {
        let dir = tempdir()?;
        let cube = Primitive::cube(Vector3::new(1.0, 2.0, 3.0), false).to_mesh();
        let mut turned = cube.clone();
        turned.transform(&Matrix4::new_rotation(Vector3::new(0.0, 0.0, 0.9)));

        io::export(&cube, dir.path().join("a.obj"))?;
        io::export(&turned, dir.path().join("b.off"))?;
        io::export(&Primitive::sphere(1.0, 1).to_mesh(), dir.path().join("c.obj"))?;
        std::fs::write(dir.path().join("notes.txt"), "not a mesh")?;
        std::fs::write(dir.path().join("broken.obj"), "f 1 2 3\n")?;

        let result = Runner::default().dedup(dir.path())?;
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups[0].len(), 2);
        assert!(result.groups[0][0].ends_with("a.obj"));
        assert_eq!(result.duplicate_count(), 1);
        assert_eq!(result.failures.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_input() {
        assert!(Runner::default().load(Path::new("/nonexistent/mesh.obj")).is_err());
    }
}
