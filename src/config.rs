// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Processing configuration

use crate::error::MeshError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "meshcore.toml";

/// Numeric tolerances used by mesh queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Grid size for vertex merging
    pub merge: f64,
    /// Relative zero: areas at or below `zero * diagonal^2` and volumes at or
    /// below `zero * diagonal^3` count as zero, where `diagonal` is the mesh's
    /// bounding box diagonal
    pub zero: f64,
    /// Maximum angle in radians between normals of faces in one facet
    pub facet_angle: f64,
    /// Significant digits kept in mesh identifiers
    pub identifier_digits: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            merge: 1e-8,
            zero: 1e-12,
            facet_angle: 1e-3,
            identifier_digits: 6,
        }
    }
}

impl Tolerances {
    /// Reject negative or non-finite values
    pub fn validate(&self) -> crate::Result<()> {
        for value in [self.merge, self.zero, self.facet_angle] {
            if !value.is_finite() || value < 0.0 {
                return Err(MeshError::InvalidTolerance(value));
            }
        }
        if self.identifier_digits == 0 || self.identifier_digits > 15 {
            return Err(MeshError::InvalidTolerance(self.identifier_digits as f64));
        }
        Ok(())
    }
}

/// Steps applied by [`crate::Mesh::process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    pub merge_vertices: bool,
    pub remove_duplicate_faces: bool,
    pub remove_degenerate_faces: bool,
    pub remove_unreferenced_vertices: bool,
    pub fix_normals: bool,
    pub fill_holes: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            merge_vertices: true,
            remove_duplicate_faces: true,
            remove_degenerate_faces: true,
            remove_unreferenced_vertices: true,
            fix_normals: false,
            fill_holes: false,
        }
    }
}

impl ProcessOptions {
    /// Every step enabled, including winding repair and hole filling
    pub fn full_repair() -> Self {
        Self {
            fix_normals: true,
            fill_holes: true,
            ..Self::default()
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub tolerances: Tolerances,
    pub process: ProcessOptions,
}

impl MeshConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: MeshConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.tolerances.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Apply `MESHCORE_*` environment variable overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(merge) = env_parse("MESHCORE_MERGE_TOLERANCE")? {
            self.tolerances.merge = merge;
        }
        if let Some(zero) = env_parse("MESHCORE_ZERO_TOLERANCE")? {
            self.tolerances.zero = zero;
        }
        if let Some(angle) = env_parse("MESHCORE_FACET_ANGLE")? {
            self.tolerances.facet_angle = angle;
        }
        if let Some(digits) = env_parse("MESHCORE_IDENTIFIER_DIGITS")? {
            self.tolerances.identifier_digits = digits;
        }
        if let Some(fix) = env_parse("MESHCORE_FIX_NORMALS")? {
            self.process.fix_normals = fix;
        }
        if let Some(fill) = env_parse("MESHCORE_FILL_HOLES")? {
            self.process.fill_holes = fill;
        }

        self.tolerances.validate()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
